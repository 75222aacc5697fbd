pub mod controller;
pub mod domain;
pub mod memory;
pub mod ports;
pub mod qa;

pub use controller::{
    ControllerError, DisplayItem, FlashcardSlot, Notice, Severity, StudyController, SubmitOutcome,
    Timeouts, ViewState,
};
pub use domain::{Flashcard, QAPair, Summary};
pub use memory::InMemoryStore;
pub use ports::{Clipboard, PortError, PortResult, RecordStore, TextGenerationService};
