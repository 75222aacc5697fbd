//! crates/flash_core/src/controller.rs
//!
//! The client-side state controller. It owns everything the study screen shows,
//! and bridges user actions to the text generator and the record store.
//!
//! Every operation takes `&self`: view state sits behind a mutex that is never
//! held across an `.await`, so a renderer can take snapshots while a submission
//! is still in flight.

use crate::domain::{Flashcard, QAPair, Summary};
use crate::ports::{Clipboard, PortError, PortResult, RecordStore, TextGenerationService};
use crate::qa::{build_study_prompt, parse_qa_pairs};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// How long a copied item keeps its "Copied" marker.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1500);

//=========================================================================================
// View Types
//=========================================================================================

/// One entry of the main list: a freshly parsed pair, or a stored summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayItem {
    Qa(QAPair),
    Summary(Summary),
}

impl DisplayItem {
    /// The text that copy and promote act on.
    pub fn text(&self) -> String {
        match self {
            DisplayItem::Qa(pair) => pair.to_text(),
            DisplayItem::Summary(summary) => summary.text.clone(),
        }
    }
}

/// A flashcard as the client sees it. `Pending` cards were added locally and
/// are waiting for the store to confirm them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashcardSlot {
    Pending { token: u64, summary: String },
    Saved(Flashcard),
}

impl FlashcardSlot {
    pub fn summary(&self) -> &str {
        match self {
            FlashcardSlot::Pending { summary, .. } => summary,
            FlashcardSlot::Saved(card) => &card.summary,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            FlashcardSlot::Pending { .. } => None,
            FlashcardSlot::Saved(card) => Some(card.id),
        }
    }

    fn pending_token(&self) -> Option<u64> {
        match self {
            FlashcardSlot::Pending { token, .. } => Some(*token),
            FlashcardSlot::Saved(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Bad user input. Nothing was sent anywhere.
    Warning,
    Error,
    /// Must interrupt the user (the clipboard failed, so they cannot paste).
    Alert,
}

/// A user-facing message. Every failure the controller sees ends up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub retryable: bool,
}

/// A point-in-time copy of everything the renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub input: String,
    pub items: Vec<DisplayItem>,
    pub flashcards: Vec<FlashcardSlot>,
    pub submitting: bool,
    pub copied_index: Option<usize>,
    pub error: Option<Notice>,
    pub show_flashcards: bool,
}

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub summary: Summary,
    pub pairs: Vec<QAPair>,
}

//=========================================================================================
// Errors and Timeouts
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Please provide valid text to summarize.")]
    Validation,
    #[error("A submission is already in progress.")]
    AlreadySubmitting,
    #[error("No item at position {0}.")]
    UnknownItem(usize),
    #[error("Failed to fetch summary: {0}")]
    Generation(PortError),
    #[error("Invalid response.")]
    EmptyResponse,
    #[error("Storage request failed: {0}")]
    Persistence(PortError),
    #[error("Could not copy text to clipboard: {0}")]
    Clipboard(PortError),
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl ControllerError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ControllerError::Timeout { .. } => true,
            ControllerError::Generation(e)
            | ControllerError::Persistence(e)
            | ControllerError::Clipboard(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn notice(&self) -> Notice {
        let severity = match self {
            ControllerError::Validation
            | ControllerError::AlreadySubmitting
            | ControllerError::UnknownItem(_) => Severity::Warning,
            ControllerError::Clipboard(_) => Severity::Alert,
            _ => Severity::Error,
        };
        Notice {
            severity,
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

/// Upper bounds on outbound calls. The generator is the slow one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub generation: Duration,
    pub store: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            generation: Duration::from_secs(30),
            store: Duration::from_secs(10),
        }
    }
}

async fn bounded<T>(
    operation: &'static str,
    after: Duration,
    call: impl Future<Output = PortResult<T>>,
) -> Result<PortResult<T>, ControllerError> {
    timeout(after, call)
        .await
        .map_err(|_| ControllerError::Timeout { operation, after })
}

fn settle<T>(outcome: Result<PortResult<T>, ControllerError>) -> Result<T, ControllerError> {
    outcome?.map_err(ControllerError::Persistence)
}

/// Holds the submitting flag for the lifetime of one submission.
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

//=========================================================================================
// The Controller
//=========================================================================================

#[derive(Default)]
struct LocalState {
    input: String,
    items: Vec<DisplayItem>,
    flashcards: Vec<FlashcardSlot>,
    copied: Option<(usize, Instant)>,
    error: Option<Notice>,
    show_flashcards: bool,
}

pub struct StudyController {
    store: Arc<dyn RecordStore>,
    generator: Arc<dyn TextGenerationService>,
    clipboard: Arc<dyn Clipboard>,
    timeouts: Timeouts,
    state: Mutex<LocalState>,
    submitting: AtomicBool,
    next_token: AtomicU64,
}

impl StudyController {
    pub fn new(
        store: Arc<dyn RecordStore>,
        generator: Arc<dyn TextGenerationService>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            store,
            generator,
            clipboard,
            timeouts: Timeouts::default(),
            state: Mutex::new(LocalState::default()),
            submitting: AtomicBool::new(false),
            next_token: AtomicU64::new(0),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `err` as the current notice and logs it.
    fn fail(&self, err: ControllerError) -> ControllerError {
        let notice = err.notice();
        match notice.severity {
            Severity::Warning => warn!(error = %err, "rejected user action"),
            Severity::Error | Severity::Alert => {
                error!(error = %err, retryable = notice.retryable, "operation failed")
            }
        }
        self.state().error = Some(notice);
        err
    }

    // --- Plain view state ---

    pub fn set_input(&self, text: impl Into<String>) {
        self.state().input = text.into();
    }

    /// Flips the flashcard panel and returns whether it is now visible.
    pub fn toggle_flashcards(&self) -> bool {
        let mut state = self.state();
        state.show_flashcards = !state.show_flashcards;
        state.show_flashcards
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// The index last copied, for `COPY_FEEDBACK` after the copy.
    pub fn copied_index(&self) -> Option<usize> {
        copied_index(&self.state())
    }

    pub fn snapshot(&self) -> ViewState {
        let state = self.state();
        ViewState {
            input: state.input.clone(),
            items: state.items.clone(),
            flashcards: state.flashcards.clone(),
            submitting: self.is_submitting(),
            copied_index: copied_index(&state),
            error: state.error.clone(),
            show_flashcards: state.show_flashcards,
        }
    }

    // --- Operations ---

    /// Sends the current input to the generator, stores the reply as a summary
    /// and shows the parsed pairs.
    ///
    /// The display list only changes once the summary is stored, so any failure
    /// leaves it as it was.
    pub async fn submit(&self) -> Result<SubmitOutcome, ControllerError> {
        let input = self.state().input.clone();
        if input.trim().is_empty() {
            return Err(self.fail(ControllerError::Validation));
        }

        let _guard = match SubmitGuard::acquire(&self.submitting) {
            Some(guard) => guard,
            None => {
                warn!("submission ignored while another is in flight");
                return Err(ControllerError::AlreadySubmitting);
            }
        };
        self.state().error = None;

        match self.run_submission(&input).await {
            Ok(outcome) => {
                let mut state = self.state();
                state.items = outcome.pairs.iter().cloned().map(DisplayItem::Qa).collect();
                state.copied = None;
                Ok(outcome)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn run_submission(&self, input: &str) -> Result<SubmitOutcome, ControllerError> {
        let prompt = build_study_prompt(input);
        let reply = bounded(
            "text generation",
            self.timeouts.generation,
            self.generator.generate_text(&prompt),
        )
        .await?
        .map_err(ControllerError::Generation)?;

        let text = reply.trim();
        if text.is_empty() {
            return Err(ControllerError::EmptyResponse);
        }
        let pairs = parse_qa_pairs(text);

        let summary = settle(
            bounded(
                "saving summary",
                self.timeouts.store,
                self.store.create_summary(text),
            )
            .await,
        )?;
        info!(summary_id = %summary.id, pairs = pairs.len(), "submission stored");

        Ok(SubmitOutcome { summary, pairs })
    }

    /// Replaces the display list with every stored summary, and the flashcard
    /// list with every stored flashcard.
    pub async fn load(&self) -> Result<(), ControllerError> {
        let (summaries, flashcards) = futures::future::join(
            bounded(
                "listing summaries",
                self.timeouts.store,
                self.store.list_summaries(),
            ),
            bounded(
                "listing flashcards",
                self.timeouts.store,
                self.store.list_flashcards(),
            ),
        )
        .await;

        match (settle(summaries), settle(flashcards)) {
            (Ok(summaries), Ok(flashcards)) => {
                info!(
                    summaries = summaries.len(),
                    flashcards = flashcards.len(),
                    "loaded stored records"
                );
                let mut state = self.state();
                state.items = summaries.into_iter().map(DisplayItem::Summary).collect();
                // Cards still being saved stay on top until their own call settles.
                let pending: Vec<FlashcardSlot> = state
                    .flashcards
                    .drain(..)
                    .filter(|slot| slot.pending_token().is_some())
                    .collect();
                state.flashcards = pending
                    .into_iter()
                    .chain(flashcards.into_iter().map(FlashcardSlot::Saved))
                    .collect();
                state.copied = None;
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => Err(self.fail(e)),
        }
    }

    /// Promotes the text of the display item at `index`.
    pub async fn promote_item(&self, index: usize) -> Result<Flashcard, ControllerError> {
        let text = self.state().items.get(index).map(DisplayItem::text);
        match text {
            Some(text) => self.promote_to_flashcard(&text).await,
            None => Err(self.fail(ControllerError::UnknownItem(index))),
        }
    }

    /// Shows a new flashcard at the top of the list straight away, then stores
    /// it. The pending card becomes the stored one on success and is removed
    /// again on failure. A `load` that already listed the stored card wins over
    /// the pending one, so the card is never shown twice.
    pub async fn promote_to_flashcard(&self, text: &str) -> Result<Flashcard, ControllerError> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.state().flashcards.insert(
            0,
            FlashcardSlot::Pending {
                token,
                summary: text.to_string(),
            },
        );

        let outcome = settle(
            bounded(
                "saving flashcard",
                self.timeouts.store,
                self.store.create_flashcard(text),
            )
            .await,
        );

        let mut state = self.state();
        let slot = state
            .flashcards
            .iter()
            .position(|slot| slot.pending_token() == Some(token));
        match outcome {
            Ok(card) => {
                let listed = state
                    .flashcards
                    .iter()
                    .any(|slot| slot.id() == Some(card.id));
                match (slot, listed) {
                    (Some(at), false) => state.flashcards[at] = FlashcardSlot::Saved(card.clone()),
                    (Some(at), true) => {
                        state.flashcards.remove(at);
                    }
                    (None, false) => state.flashcards.insert(0, FlashcardSlot::Saved(card.clone())),
                    (None, true) => {}
                }
                info!(flashcard_id = %card.id, "flashcard stored");
                Ok(card)
            }
            Err(e) => {
                if let Some(at) = slot {
                    state.flashcards.remove(at);
                }
                drop(state);
                Err(self.fail(e))
            }
        }
    }

    /// Removes a flashcard locally, then from the store. A store failure puts
    /// the card back where it was; a store that no longer has it counts as done.
    pub async fn delete_flashcard(&self, id: Uuid) -> Result<(), ControllerError> {
        let removed = {
            let mut state = self.state();
            let position = state.flashcards.iter().position(|slot| slot.id() == Some(id));
            position.map(|at| (at, state.flashcards.remove(at)))
        };

        let outcome = settle(
            bounded(
                "deleting flashcard",
                self.timeouts.store,
                self.store.delete_flashcard(id),
            )
            .await,
        );

        match outcome {
            Ok(()) => Ok(()),
            Err(ControllerError::Persistence(PortError::NotFound(_))) => {
                warn!(flashcard_id = %id, "flashcard was already gone from the store");
                Ok(())
            }
            Err(e) => {
                if let Some((at, slot)) = removed {
                    let mut state = self.state();
                    let at = at.min(state.flashcards.len());
                    state.flashcards.insert(at, slot);
                }
                Err(self.fail(e))
            }
        }
    }

    pub async fn copy_to_clipboard(&self, text: &str, index: usize) -> Result<(), ControllerError> {
        match self.clipboard.write_text(text).await {
            Ok(()) => {
                self.state().copied = Some((index, Instant::now()));
                Ok(())
            }
            Err(e) => Err(self.fail(ControllerError::Clipboard(e))),
        }
    }

    /// Copies the text of the displayed item at `index`.
    pub async fn copy_item(&self, index: usize) -> Result<(), ControllerError> {
        let text = self.state().items.get(index).map(DisplayItem::text);
        match text {
            Some(text) => self.copy_to_clipboard(&text, index).await,
            None => Err(self.fail(ControllerError::UnknownItem(index))),
        }
    }
}

fn copied_index(state: &LocalState) -> Option<usize> {
    state
        .copied
        .filter(|(_, at)| at.elapsed() < COPY_FEEDBACK)
        .map(|(index, _)| index)
}
