//! Usage collection.
//!
//! A [`ToolCollector`] counts launches of official tools and remembers the last one that raised
//! an error. [`ToolCollector::did_finish`] reports both once, best-effort: nothing it does can
//! fail the caller.

pub mod collector;
pub mod error;
pub mod marker;
pub mod report;
pub mod settings;
pub mod tools;

pub use collector::ToolCollector;
pub use error::UsageError;
pub use settings::{CollectorSettings, Dispatch};
pub use tools::{TOOLS, is_official};
