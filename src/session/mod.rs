//! Session management and protocol operations.

mod core;
pub mod events;
mod navigation;
mod upload;

pub use self::core::Session;
pub use events::{EventHandler, EventKind, SessionEvent};
