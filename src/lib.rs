//! Core library for a daily time-tracking notebook.
//!
//! The engine owns the task state machine (at most one task running across
//! all dates), the store holds every record as JSON under flat keys, and the
//! interchange module renders and re-parses the plain-text export format.
//! No UI lives here; an embedding surface drives the engine and the ticker.

pub mod domain;
pub mod engine;
pub mod error;
pub mod interchange;
pub mod stats;
pub mod store;
pub mod ticker;
pub mod timefmt;

pub use engine::TimeTracker;
pub use error::{EngineError, StoreError};
pub use interchange::{export_text, import_text, ImportOptions, ImportSummary};
pub use store::{FileStore, KvStore, MemoryStore, Repository};
pub use ticker::DisplayTicker;
