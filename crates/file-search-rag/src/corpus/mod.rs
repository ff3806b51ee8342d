//! Store lifecycle and the local document mirror

pub mod intake;
pub mod orchestrator;

pub use intake::{mime_for, text_upload, FileIntake, PreparedUpload};
pub use orchestrator::{CorpusOrchestrator, SessionPhase};
