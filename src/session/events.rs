//! Typed notifications fanned out after session calls.
//!
//! Handlers are awaited in subscription order before the triggering call
//! returns, so an observer of [`EventKind::ChangeDirectory`] has finished its
//! work before the caller issues anything in the new directory. A failing
//! handler is logged and skipped; it never fails the session call.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Session;
use crate::error::Result;
use crate::fs::{NavigationResult, UploadOutcome};

/// Session operations that publish events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ChangeDirectory,
    Upload,
}

/// Payload of a published event.
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent<'a> {
    /// A change-directory call completed and the cursor moved.
    ChangeDirectory {
        requested: &'a str,
        result: &'a NavigationResult,
    },
    /// The server answered an upload, successfully or not.
    Upload {
        local_path: &'a Path,
        outcome: &'a UploadOutcome,
    },
}

impl SessionEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::ChangeDirectory { .. } => EventKind::ChangeDirectory,
            SessionEvent::Upload { .. } => EventKind::Upload,
        }
    }
}

/// Observer of session events.
///
/// The handler receives the session so it can issue calls of its own
/// (e.g. list the directory that just became current).
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, session: &Session, event: &SessionEvent<'_>) -> Result<()>;
}

/// Registered handlers, in subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    handlers: Mutex<Vec<(EventKind, Arc<dyn EventHandler>)>>,
}

impl Subscribers {
    pub(crate) fn add(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        self.handlers.lock().push((kind, handler));
    }

    /// Snapshot of the handlers for `kind`, so none is called under the lock.
    pub(crate) fn for_kind(&self, kind: EventKind) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, h)| Arc::clone(h))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.lock().len()
    }
}
