pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod recorder;

pub use commands::{Command, CommandStack, HistorySink, HistoryStatus, Payload};
pub use config::EditorConfig;
pub use engine::{EditRequest, MutationEngine, MutationOutcome};
pub use error::EditorError;
