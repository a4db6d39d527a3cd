//! # LogWriter: lifecycle events through `tracing`
//!
//! A minimal subscriber that renders every [`Event`] as a `tracing` record.
//! Attach it to get a readable trail of a task without writing a subscriber.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  task="kmeans" seq=0 kmeans started
//! INFO  task="kmeans" seq=1 iteration 1: 12 clusters moved
//! DEBUG task="kmeans" seq=2 progress=0.25
//! INFO  task="kmeans" seq=3 paused
//! INFO  task="kmeans" seq=4 resumed
//! INFO  task="kmeans" seq=9 outcome=success kmeans finished: success
//! WARN  task="kmeans" seq=9 outcome=error kmeans finished: error (no convergence)
//! ```

use crate::core::Outcome;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn task(e: &Event) -> &str {
    e.task.as_deref().unwrap_or("unknown")
}

fn message(e: &Event) -> &str {
    e.message.as_deref().unwrap_or_default()
}

impl Subscribe for LogWriter {
    fn on_begun(&self, e: &Event) {
        tracing::info!(task = task(e), seq = e.seq, "{}", message(e));
    }

    fn on_message(&self, e: &Event) {
        tracing::info!(task = task(e), seq = e.seq, "{}", message(e));
    }

    fn on_progress(&self, e: &Event) {
        tracing::debug!(
            task = task(e),
            seq = e.seq,
            progress = e.progress.unwrap_or_default(),
            "progress"
        );
    }

    fn on_paused(&self, e: &Event) {
        tracing::info!(task = task(e), seq = e.seq, "paused");
    }

    fn on_resumed(&self, e: &Event) {
        tracing::info!(task = task(e), seq = e.seq, "resumed");
    }

    fn on_ended(&self, e: &Event) {
        let outcome = e.outcome.unwrap_or_default();
        match outcome {
            Outcome::Error => {
                tracing::warn!(task = task(e), seq = e.seq, outcome = %outcome, "{}", message(e));
            }
            _ => {
                tracing::info!(task = task(e), seq = e.seq, outcome = %outcome, "{}", message(e));
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
