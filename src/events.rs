//! Compilation lifecycle events.
//!
//! Listeners observe batch progress without participating in it: every event
//! is fired synchronously on the thread doing the work, and a misbehaving
//! listener (panic included) is logged and dropped for that event rather
//! than taking the compilation down with it.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum CompilationEvent {
    /// A batch of `total` files is about to be compiled.
    BatchStarted { total: usize },
    /// One source file entered the pipeline.
    FileStarted { source: PathBuf },
    /// One source file made it all the way through.
    FileSucceeded {
        source: PathBuf,
        output: Option<PathBuf>,
        duration: Duration,
    },
    /// One source file failed; the batch continues.
    FileFailed { source: PathBuf, message: String },
    /// The whole batch finished, successes and failures both counted.
    BatchCompleted {
        total: usize,
        succeeded: usize,
        failed: usize,
        duration: Duration,
    },
}

pub trait CompilationListener: Send + Sync {
    fn on_event(&self, event: &CompilationEvent);
}

impl<F> CompilationListener for F
where
    F: Fn(&CompilationEvent) + Send + Sync,
{
    fn on_event(&self, event: &CompilationEvent) {
        self(event)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISPATCH
// ═══════════════════════════════════════════════════════════════════════════════

/// Fan-out to registered listeners. Shared across worker threads in
/// parallel mode, so dispatch takes `&self`.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Box<dyn CompilationListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn CompilationListener>) {
        self.listeners.push(listener);
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener. A panicking listener is caught
    /// and logged; remaining listeners still receive the event.
    pub fn fire(&self, event: &CompilationEvent) {
        for listener in &self.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
            if outcome.is_err() {
                warn!(?event, "compilation listener panicked; ignoring");
            }
        }
    }
}
