//! Data models for the client
//!
//! Wire types mirror the backend's JSON; UI-facing types are what the
//! services hand back to controllers and views.

mod collection;
mod content;
mod document;
mod prompt;
mod search;
pub mod serde_ext;
mod task;
mod tutorial;

pub use collection::*;
pub use content::*;
pub use document::*;
pub use prompt::*;
pub use search::*;
pub use task::*;
pub use tutorial::*;
