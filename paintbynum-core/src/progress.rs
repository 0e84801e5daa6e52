//! Progress reporting and cancellation for in-flight `process` calls.
//!
//! An explicit, closed set of event kinds delivered through a plain callback
//! parameter, plus a cheaply clonable cancellation flag a caller can flip
//! from another thread between pipeline stages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A progress or status notification emitted at stage boundaries.
///
/// Status strings are human-readable only; callers must not parse them for
/// control flow.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Status { message: String },
    Progress { percent: u8 },
}

impl ProgressEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn progress(percent: u8) -> Self {
        Self::Progress {
            percent: percent.min(100),
        }
    }
}

/// Callback invoked with progress events. Boxed as `dyn FnMut` so callers can
/// pass a closure, a channel sender, or a no-op.
pub type ProgressCallback<'a> = dyn FnMut(ProgressEvent) + 'a;

/// Cooperative cancellation flag, checked only at stage boundaries; the
/// pipeline never suspends mid-stage.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
