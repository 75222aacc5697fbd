//! services/client/src/adapters/clipboard.rs
//!
//! Implements the `Clipboard` port by piping text into the platform's
//! clipboard command.

use async_trait::async_trait;
use flash_core::ports::{Clipboard, PortError, PortResult};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// A program that reads clipboard contents from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ClipboardCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Tries each command in order and uses the first one that is installed.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    commands: Vec<ClipboardCommand>,
}

impl CommandClipboard {
    pub fn with_commands(commands: Vec<ClipboardCommand>) -> Self {
        Self { commands }
    }
}

impl Default for CommandClipboard {
    /// macOS, Wayland, X11 (two tools), then Windows.
    fn default() -> Self {
        Self::with_commands(vec![
            ClipboardCommand::new("pbcopy", &[]),
            ClipboardCommand::new("wl-copy", &[]),
            ClipboardCommand::new("xclip", &["-selection", "clipboard"]),
            ClipboardCommand::new("xsel", &["--clipboard", "--input"]),
            ClipboardCommand::new("clip", &[]),
        ])
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn write_text(&self, text: &str) -> PortResult<()> {
        for command in &self.commands {
            let spawned = Command::new(&command.program)
                .args(&command.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            let mut child = match spawned {
                Ok(child) => child,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(program = %command.program, "clipboard command not installed");
                    continue;
                }
                Err(e) => return Err(PortError::Unexpected(e.to_string())),
            };

            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(text.as_bytes())
                    .await
                    .map_err(|e| PortError::Unexpected(e.to_string()))?;
            }

            let status = child
                .wait()
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            return if status.success() {
                Ok(())
            } else {
                Err(PortError::Unexpected(format!(
                    "{} exited with {}",
                    command.program, status
                )))
            };
        }

        Err(PortError::Unexpected(
            "no clipboard command is available".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fails_when_no_command_is_installed() {
        let clipboard = CommandClipboard::with_commands(vec![ClipboardCommand::new(
            "flash-no-such-clipboard-tool",
            &[],
        )]);
        assert!(clipboard.write_text("text").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn skips_missing_commands_and_uses_the_next_one() {
        let clipboard = CommandClipboard::with_commands(vec![
            ClipboardCommand::new("flash-no-such-clipboard-tool", &[]),
            ClipboardCommand::new("cat", &[]),
        ]);
        clipboard.write_text("What is 2+2? Four.").await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_reported() {
        let clipboard = CommandClipboard::with_commands(vec![ClipboardCommand::new(
            "sh",
            &["-c", "cat >/dev/null; exit 3"],
        )]);
        let err = clipboard.write_text("text").await.unwrap_err();
        assert!(err.to_string().contains("sh exited"));
    }
}
