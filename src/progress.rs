//! Progress reporting for chat builds.
//!
//! Building a large chat can take a while. A [`ProgressReporter`] is told
//! when the build starts, after every message, and when it finishes. The
//! stock [`IntervalProgressReporter`] turns those checkpoints into periodic
//! [`Progress`] snapshots pushed to a callback.
//!
//! Reporters run synchronously on the building thread and must not block.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use chatdemux::progress::{IntervalProgressReporter, ProgressCallback, ProgressReporter};
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let sink = Arc::clone(&seen);
//! let callback: ProgressCallback = Arc::new(move |progress| {
//!     sink.store(progress.messages_processed, Ordering::SeqCst);
//! });
//!
//! let mut reporter = IntervalProgressReporter::new(Duration::from_secs(60), callback);
//! reporter.start();
//! reporter.finish();
//! assert_eq!(seen.load(Ordering::SeqCst), 0);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::message::Message;

/// A snapshot of a running build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Messages classified so far.
    pub messages_processed: usize,

    /// Time since the build started.
    pub elapsed: Duration,

    /// `true` for the final snapshot of a build.
    pub finished: bool,
}

impl Progress {
    /// Returns the average throughput so far, in messages per second.
    ///
    /// Returns `None` before any time has elapsed.
    pub fn messages_per_second(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| self.messages_processed as f64 / secs)
    }
}

/// Callback type for receiving progress updates.
///
/// # Example
///
/// ```rust
/// use chatdemux::progress::{Progress, ProgressCallback};
/// use std::sync::Arc;
///
/// let callback: ProgressCallback = Arc::new(|progress| {
///     println!("{} messages", progress.messages_processed);
/// });
/// callback(Progress::default());
/// ```
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Checkpoints of a chat build.
pub trait ProgressReporter {
    /// Called once before the first record is read.
    fn start(&mut self);

    /// Called after each message is appended to the chat.
    fn message_finished(&mut self, message: &Message);

    /// Called once after the last message.
    fn finish(&mut self);
}

/// Reports at most once per interval, plus at start and finish.
pub struct IntervalProgressReporter {
    interval: Duration,
    callback: ProgressCallback,
    started_at: Option<Instant>,
    last_report: Option<Instant>,
    messages_processed: usize,
}

impl IntervalProgressReporter {
    pub fn new(interval: Duration, callback: ProgressCallback) -> Self {
        Self {
            interval,
            callback,
            started_at: None,
            last_report: None,
            messages_processed: 0,
        }
    }

    /// Reports through [`log_progress`].
    pub fn logging(interval: Duration) -> Self {
        Self::new(interval, log_progress())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn report(&mut self, now: Instant, finished: bool) {
        let elapsed = self
            .started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        self.last_report = Some(now);
        (self.callback)(Progress {
            messages_processed: self.messages_processed,
            elapsed,
            finished,
        });
    }
}

impl ProgressReporter for IntervalProgressReporter {
    fn start(&mut self) {
        let now = Instant::now();
        self.started_at = Some(now);
        self.messages_processed = 0;
        self.report(now, false);
    }

    fn message_finished(&mut self, _message: &Message) {
        self.messages_processed += 1;
        let now = Instant::now();
        let due = self
            .last_report
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.report(now, false);
        }
    }

    fn finish(&mut self) {
        self.report(Instant::now(), true);
    }
}

impl std::fmt::Debug for IntervalProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalProgressReporter")
            .field("interval", &self.interval)
            .field("messages_processed", &self.messages_processed)
            .finish_non_exhaustive()
    }
}

/// Creates a no-op progress callback.
///
/// # Example
///
/// ```rust
/// use chatdemux::progress::no_progress;
///
/// let callback = no_progress();
/// callback(chatdemux::progress::Progress::default()); // Does nothing
/// ```
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that emits `tracing` events.
pub fn log_progress() -> ProgressCallback {
    Arc::new(|progress| {
        if progress.finished {
            tracing::info!(
                messages = progress.messages_processed,
                elapsed_ms = progress.elapsed.as_millis() as u64,
                "chat build finished"
            );
        } else {
            tracing::info!(messages = progress.messages_processed, "messages processed");
        }
    })
}
