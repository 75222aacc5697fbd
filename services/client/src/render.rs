//! services/client/src/render.rs
//!
//! Turns a `ViewState` snapshot into the text the `flash` command prints.

use flash_core::{DisplayItem, FlashcardSlot, Notice, Severity, ViewState};
use std::fmt::Write;

const NO_ITEMS: &str = "Nothing to show yet. Submit some text to get started.";
const NO_FLASHCARDS: &str = "No flashcards yet. Add a summary to create a flashcard!";

pub fn render(view: &ViewState) -> String {
    let mut out = String::new();
    let _ = write_view(&mut out, view);
    out
}

fn write_view(out: &mut String, view: &ViewState) -> std::fmt::Result {
    writeln!(out, "Study Summaries")?;
    writeln!(out, "===============")?;

    if view.submitting {
        writeln!(out, "Submitting...")?;
    }
    if let Some(notice) = &view.error {
        write_notice(out, notice)?;
    }

    writeln!(out)?;
    if view.items.is_empty() {
        writeln!(out, "{}", NO_ITEMS)?;
    }
    for (index, item) in view.items.iter().enumerate() {
        let marker = if view.copied_index == Some(index) {
            "  (Copied)"
        } else {
            ""
        };
        match item {
            DisplayItem::Qa(pair) => {
                writeln!(out, "[{}] Q: {}{}", index, pair.question, marker)?;
                if !pair.answer.is_empty() {
                    writeln!(out, "    A: {}", pair.answer)?;
                }
            }
            DisplayItem::Summary(summary) => {
                let mut lines = summary.text.lines();
                writeln!(out, "[{}] {}{}", index, lines.next().unwrap_or_default(), marker)?;
                for line in lines {
                    writeln!(out, "    {}", line)?;
                }
            }
        }
    }

    if view.show_flashcards {
        writeln!(out)?;
        writeln!(out, "Flashcards ({})", view.flashcards.len())?;
        writeln!(out, "----------")?;
        if view.flashcards.is_empty() {
            writeln!(out, "{}", NO_FLASHCARDS)?;
        }
        for card in &view.flashcards {
            match card {
                FlashcardSlot::Saved(card) => writeln!(out, "* {}  [{}]", card.summary, card.id)?,
                FlashcardSlot::Pending { summary, .. } => {
                    writeln!(out, "* {}  [saving...]", summary)?
                }
            }
        }
    }
    Ok(())
}

fn write_notice(out: &mut String, notice: &Notice) -> std::fmt::Result {
    let label = match notice.severity {
        Severity::Warning => "Warning",
        Severity::Error => "Error",
        Severity::Alert => "ALERT",
    };
    write!(out, "{}: {}", label, notice.message)?;
    if notice.retryable {
        write!(out, " (try again)")?;
    }
    writeln!(out)
}
