//! Plain-text interchange: the export renderer and the import scanner.
//!
//! The two halves are coupled by the round-trip rule: any document the
//! serializer produces must feed back through the parser and reconstruct
//! the same titles, categories, statuses and dates.

pub mod import;
pub mod parser;
pub mod serializer;

pub use import::{import_text, ImportOptions, ImportSummary};
pub use parser::{RawRecord, Scanner, Section};
pub use serializer::export_text;
