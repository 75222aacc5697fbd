//! Behaviour of `StudyController` against in-memory and scripted ports.

use async_trait::async_trait;
use flash_core::{
    Clipboard, ControllerError, DisplayItem, Flashcard, FlashcardSlot, InMemoryStore, PortError,
    PortResult, RecordStore, Severity, StudyController, Summary, TextGenerationService, Timeouts,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

//=========================================================================================
// Test Doubles
//=========================================================================================

struct ScriptedGenerator {
    reply: PortResult<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            gate: None,
            delay: None,
        }
    }

    fn failing(err: PortError) -> Self {
        Self {
            reply: Err(err),
            ..Self::replying("")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerationService for ScriptedGenerator {
    async fn generate_text(&self, prompt: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

/// Wraps `InMemoryStore` with switches that make individual calls fail, and an
/// optional gate that holds `create_flashcard` before or after it writes.
#[derive(Default)]
struct SwitchableStore {
    inner: InMemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    flashcard_gate: Mutex<Option<Arc<Notify>>>,
    gate_after_write: AtomicBool,
}

impl SwitchableStore {
    fn check(flag: &AtomicBool) -> PortResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(PortError::Unexpected("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for SwitchableStore {
    async fn create_summary(&self, text: &str) -> PortResult<Summary> {
        Self::check(&self.fail_writes)?;
        self.inner.create_summary(text).await
    }

    async fn list_summaries(&self) -> PortResult<Vec<Summary>> {
        Self::check(&self.fail_reads)?;
        self.inner.list_summaries().await
    }

    async fn create_flashcard(&self, summary: &str) -> PortResult<Flashcard> {
        Self::check(&self.fail_writes)?;
        let gate = self.flashcard_gate.lock().unwrap().clone();
        let after_write = self.gate_after_write.load(Ordering::SeqCst);
        if let (Some(gate), false) = (&gate, after_write) {
            gate.notified().await;
        }
        let card = self.inner.create_flashcard(summary).await?;
        if let (Some(gate), true) = (&gate, after_write) {
            gate.notified().await;
        }
        Ok(card)
    }

    async fn list_flashcards(&self) -> PortResult<Vec<Flashcard>> {
        Self::check(&self.fail_reads)?;
        self.inner.list_flashcards().await
    }

    async fn delete_flashcard(&self, id: Uuid) -> PortResult<()> {
        Self::check(&self.fail_deletes)?;
        self.inner.delete_flashcard(id).await
    }
}

#[derive(Default)]
struct RecordingClipboard {
    copied: Mutex<Vec<String>>,
    broken: bool,
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> PortResult<()> {
        if self.broken {
            return Err(PortError::Unexpected("no clipboard available".to_string()));
        }
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct Harness {
    controller: Arc<StudyController>,
    store: Arc<SwitchableStore>,
    generator: Arc<ScriptedGenerator>,
    clipboard: Arc<RecordingClipboard>,
}

fn harness_with(generator: ScriptedGenerator, clipboard: RecordingClipboard) -> Harness {
    let store = Arc::new(SwitchableStore::default());
    let generator = Arc::new(generator);
    let clipboard = Arc::new(clipboard);
    let controller = Arc::new(StudyController::new(
        store.clone(),
        generator.clone(),
        clipboard.clone(),
    ));
    Harness {
        controller,
        store,
        generator,
        clipboard,
    }
}

fn harness(reply: &str) -> Harness {
    harness_with(ScriptedGenerator::replying(reply), RecordingClipboard::default())
}

//=========================================================================================
// Submit
//=========================================================================================

#[tokio::test]
async fn blank_input_is_rejected_without_network_calls() {
    let h = harness("Q? A");
    h.controller.set_input("   \n\t ");

    let err = h.controller.submit().await.unwrap_err();

    assert!(matches!(err, ControllerError::Validation));
    assert_eq!(h.generator.calls(), 0);
    assert!(h.store.inner.list_summaries().await.unwrap().is_empty());
    let view = h.controller.snapshot();
    assert_eq!(view.error.unwrap().severity, Severity::Warning);
    assert!(!view.submitting);
}

#[tokio::test]
async fn capital_of_france_yields_one_pair_and_a_stored_summary() {
    let h = harness("What is the capital of France?Paris.");
    h.controller.set_input("Paris is the capital of France.");

    let outcome = h.controller.submit().await.unwrap();

    assert_eq!(outcome.pairs.len(), 1);
    assert_eq!(outcome.pairs[0].question, "What is the capital of France?");
    assert_eq!(outcome.pairs[0].answer, "Paris.");

    let stored = h.store.inner.list_summaries().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, "What is the capital of France?Paris.");
    assert_eq!(stored[0].id, outcome.summary.id);

    let view = h.controller.snapshot();
    assert_eq!(view.items, vec![DisplayItem::Qa(outcome.pairs[0].clone())]);
    assert!(view.error.is_none());
    assert!(!view.submitting);

    let prompts = h.generator.prompts.lock().unwrap();
    assert!(prompts[0].ends_with("Paris is the capital of France."));
}

#[tokio::test]
async fn generator_failure_keeps_previous_items() {
    let h = harness_with(
        ScriptedGenerator::failing(PortError::Unexpected("HTTP 503".to_string())),
        RecordingClipboard::default(),
    );
    h.store.inner.create_summary("Old? Item").await.unwrap();
    h.controller.load().await.unwrap();
    let before = h.controller.snapshot().items;

    h.controller.set_input("Some notes");
    let err = h.controller.submit().await.unwrap_err();

    assert!(matches!(err, ControllerError::Generation(_)));
    let view = h.controller.snapshot();
    assert_eq!(view.items, before);
    assert!(!view.submitting);
    let notice = view.error.unwrap();
    assert_eq!(notice.severity, Severity::Error);
    assert!(notice.message.contains("HTTP 503"));
    assert_eq!(h.store.inner.list_summaries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_reply_is_an_invalid_response() {
    let h = harness("  \n ");
    h.controller.set_input("Some notes");

    let err = h.controller.submit().await.unwrap_err();

    assert!(matches!(err, ControllerError::EmptyResponse));
    assert_eq!(h.controller.snapshot().error.unwrap().message, "Invalid response.");
    assert!(h.store.inner.list_summaries().await.unwrap().is_empty());
}

#[tokio::test]
async fn storage_failure_leaves_display_untouched() {
    let h = harness("Q1? A1\nQ2? A2");
    h.store.fail_writes.store(true, Ordering::SeqCst);
    h.controller.set_input("Some notes");

    let err = h.controller.submit().await.unwrap_err();

    assert!(matches!(err, ControllerError::Persistence(_)));
    let view = h.controller.snapshot();
    assert!(view.items.is_empty());
    assert!(!view.submitting);
    assert!(view.error.is_some());
}

#[tokio::test(start_paused = true)]
async fn slow_generator_times_out_as_retryable() {
    let mut generator = ScriptedGenerator::replying("Q? A");
    generator.delay = Some(Duration::from_secs(120));
    let h = harness_with(generator, RecordingClipboard::default());
    let controller = StudyController::new(h.store.clone(), h.generator.clone(), h.clipboard.clone())
        .with_timeouts(Timeouts {
            generation: Duration::from_secs(5),
            store: Duration::from_secs(1),
        });
    controller.set_input("Some notes");

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, ControllerError::Timeout { .. }));
    assert!(err.is_retryable());
    let view = controller.snapshot();
    assert!(view.error.unwrap().retryable);
    assert!(!view.submitting);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_rejected() {
    let gate = Arc::new(Notify::new());
    let mut generator = ScriptedGenerator::replying("Q? A");
    generator.gate = Some(gate.clone());
    let h = harness_with(generator, RecordingClipboard::default());
    h.controller.set_input("Some notes");

    let first = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.submit().await }
    });
    while !h.controller.is_submitting() {
        tokio::task::yield_now().await;
    }

    let second = h.controller.submit().await;
    assert!(matches!(second, Err(ControllerError::AlreadySubmitting)));

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert!(!h.controller.is_submitting());
    assert_eq!(h.generator.calls(), 1);
}

//=========================================================================================
// Load
//=========================================================================================

#[tokio::test]
async fn load_replaces_items_and_flashcards() {
    let h = harness("unused");
    let summary = h.store.inner.create_summary("Stored? Yes").await.unwrap();
    let card = h.store.inner.create_flashcard("Card text").await.unwrap();

    h.controller.load().await.unwrap();

    let view = h.controller.snapshot();
    assert_eq!(view.items, vec![DisplayItem::Summary(summary)]);
    assert_eq!(view.flashcards, vec![FlashcardSlot::Saved(card)]);
}

#[tokio::test]
async fn load_failure_is_surfaced_like_any_other_error() {
    let h = harness("unused");
    h.store.fail_reads.store(true, Ordering::SeqCst);

    let err = h.controller.load().await.unwrap_err();

    assert!(matches!(err, ControllerError::Persistence(_)));
    let notice = h.controller.snapshot().error.unwrap();
    assert_eq!(notice.severity, Severity::Error);
}

//=========================================================================================
// Flashcards
//=========================================================================================

#[tokio::test]
async fn promoted_flashcard_is_prepended_and_confirmed() {
    let h = harness("unused");
    h.store.inner.create_flashcard("older").await.unwrap();
    h.controller.load().await.unwrap();

    let card = h.controller.promote_to_flashcard("newer").await.unwrap();

    let view = h.controller.snapshot();
    assert_eq!(view.flashcards.len(), 2);
    assert_eq!(view.flashcards[0], FlashcardSlot::Saved(card.clone()));
    assert_eq!(view.flashcards[0].id(), Some(card.id));
    assert_eq!(view.flashcards[1].summary(), "older");
}

#[tokio::test]
async fn failed_promotion_is_rolled_back() {
    let h = harness("unused");
    h.store.fail_writes.store(true, Ordering::SeqCst);

    let err = h.controller.promote_to_flashcard("lost").await.unwrap_err();

    assert!(matches!(err, ControllerError::Persistence(_)));
    let view = h.controller.snapshot();
    assert!(view.flashcards.is_empty());
    assert!(view.error.is_some());
}

/// Starts a promotion held at the store's flashcard gate.
fn gated_promotion(
    h: &Harness,
    after_write: bool,
) -> (Arc<Notify>, tokio::task::JoinHandle<Result<Flashcard, ControllerError>>) {
    let gate = Arc::new(Notify::new());
    *h.store.flashcard_gate.lock().unwrap() = Some(gate.clone());
    h.store.gate_after_write.store(after_write, Ordering::SeqCst);
    let promotion = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.promote_to_flashcard("card").await }
    });
    (gate, promotion)
}

#[tokio::test]
async fn load_during_promotion_keeps_the_pending_card() {
    let h = harness("unused");
    let (gate, promotion) = gated_promotion(&h, false);
    while h.controller.snapshot().flashcards.is_empty() {
        tokio::task::yield_now().await;
    }

    h.controller.load().await.unwrap();
    assert!(matches!(
        h.controller.snapshot().flashcards.as_slice(),
        [FlashcardSlot::Pending { .. }]
    ));

    gate.notify_one();
    let card = promotion.await.unwrap().unwrap();
    assert_eq!(
        h.controller.snapshot().flashcards,
        vec![FlashcardSlot::Saved(card.clone())]
    );
    assert_eq!(h.store.inner.list_flashcards().await.unwrap(), vec![card]);
}

#[tokio::test]
async fn load_that_already_lists_the_promoted_card_does_not_duplicate_it() {
    let h = harness("unused");
    let (gate, promotion) = gated_promotion(&h, true);
    while h.store.inner.list_flashcards().await.unwrap().is_empty() {
        tokio::task::yield_now().await;
    }

    h.controller.load().await.unwrap();
    gate.notify_one();
    let card = promotion.await.unwrap().unwrap();

    assert_eq!(
        h.controller.snapshot().flashcards,
        vec![FlashcardSlot::Saved(card)]
    );
}

#[tokio::test]
async fn promote_item_copies_the_item_text() {
    let h = harness("What is 2+2? Four.");
    h.controller.set_input("Arithmetic");
    h.controller.submit().await.unwrap();

    let card = h.controller.promote_item(0).await.unwrap();

    assert_eq!(card.summary, "What is 2+2? Four.");
    assert!(matches!(
        h.controller.promote_item(7).await,
        Err(ControllerError::UnknownItem(7))
    ));
}

#[tokio::test]
async fn deleted_flashcard_disappears_locally_and_remotely() {
    let h = harness("unused");
    let card = h.store.inner.create_flashcard("bye").await.unwrap();
    h.controller.load().await.unwrap();

    h.controller.delete_flashcard(card.id).await.unwrap();

    assert!(h.controller.snapshot().flashcards.is_empty());
    assert!(h.store.inner.list_flashcards().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_missing_flashcard_is_treated_as_done() {
    let h = harness("unused");
    let card = h.store.inner.create_flashcard("twice").await.unwrap();
    h.controller.load().await.unwrap();
    h.store.inner.delete_flashcard(card.id).await.unwrap();

    h.controller.delete_flashcard(card.id).await.unwrap();

    let view = h.controller.snapshot();
    assert!(view.flashcards.is_empty());
    assert!(view.error.is_none());
}

#[tokio::test]
async fn failed_delete_restores_the_card_in_place() {
    let h = harness("unused");
    for text in ["a", "b", "c"] {
        h.store.inner.create_flashcard(text).await.unwrap();
    }
    h.controller.load().await.unwrap();
    let middle = h.controller.snapshot().flashcards[1].id().unwrap();
    h.store.fail_deletes.store(true, Ordering::SeqCst);

    let err = h.controller.delete_flashcard(middle).await.unwrap_err();

    assert!(matches!(err, ControllerError::Persistence(_)));
    let view = h.controller.snapshot();
    let order: Vec<&str> = view.flashcards.iter().map(FlashcardSlot::summary).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
    assert!(view.error.is_some());
}

#[tokio::test]
async fn concurrent_deletes_remove_only_their_targets() {
    let h = harness("unused");
    let first = h.store.inner.create_flashcard("one").await.unwrap();
    let second = h.store.inner.create_flashcard("two").await.unwrap();
    let third = h.store.inner.create_flashcard("three").await.unwrap();
    h.controller.load().await.unwrap();

    let (a, b) = tokio::join!(
        h.controller.delete_flashcard(first.id),
        h.controller.delete_flashcard(third.id)
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(
        h.controller.snapshot().flashcards,
        vec![FlashcardSlot::Saved(second.clone())]
    );
    assert_eq!(h.store.inner.list_flashcards().await.unwrap(), vec![second]);
}

//=========================================================================================
// Clipboard and panel
//=========================================================================================

#[tokio::test(start_paused = true)]
async fn copied_marker_clears_after_feedback_delay() {
    let h = harness("unused");

    h.controller.copy_to_clipboard("Q? A", 3).await.unwrap();

    assert_eq!(h.clipboard.copied.lock().unwrap().as_slice(), ["Q? A"]);
    assert_eq!(h.controller.copied_index(), Some(3));
    tokio::time::advance(Duration::from_millis(1400)).await;
    assert_eq!(h.controller.snapshot().copied_index, Some(3));
    tokio::time::advance(Duration::from_millis(200)).await;
    assert_eq!(h.controller.copied_index(), None);
}

#[tokio::test]
async fn copy_item_copies_the_displayed_text() {
    let h = harness("What is the capital of France?Paris.\nWhy? Because.");
    h.controller.set_input("Geography");
    h.controller.submit().await.unwrap();

    h.controller.copy_item(1).await.unwrap();

    assert_eq!(h.clipboard.copied.lock().unwrap().as_slice(), ["Why? Because."]);
    assert_eq!(h.controller.copied_index(), Some(1));
    assert!(matches!(
        h.controller.copy_item(5).await,
        Err(ControllerError::UnknownItem(5))
    ));
}

#[tokio::test]
async fn clipboard_failure_raises_an_alert() {
    let h = harness_with(
        ScriptedGenerator::replying("unused"),
        RecordingClipboard {
            broken: true,
            ..Default::default()
        },
    );

    let err = h.controller.copy_to_clipboard("text", 0).await.unwrap_err();

    assert!(matches!(err, ControllerError::Clipboard(_)));
    let view = h.controller.snapshot();
    assert_eq!(view.error.unwrap().severity, Severity::Alert);
    assert_eq!(view.copied_index, None);
}

#[tokio::test]
async fn flashcard_panel_toggles() {
    let h = harness("unused");
    assert!(!h.controller.snapshot().show_flashcards);
    assert!(h.controller.toggle_flashcards());
    assert!(!h.controller.toggle_flashcards());
}
