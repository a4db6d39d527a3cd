//! # Per-task configuration.
//!
//! Provides [`TaskConfig`] settings applied when a [`Task`](crate::Task) is built.
//!
//! ## Sentinel values
//! - `pause_poll = 0s` → clamped to 1ms (a paused checkpoint always re-checks its flags)
//! - `thread_name_prefix = ""` → spawned threads are named after the task only

use std::time::Duration;

/// Configuration for one task instance.
///
/// ## Field semantics
/// - `pause_poll`: how often a paused checkpoint wakes on its own to re-check flags
/// - `progress_begin` / `progress_end`: initial progress endpoints (`0 <= begin <= end`)
/// - `log_unexpected`: log unexpected failures (foreign errors, panics) at `error!`
/// - `thread_name_prefix`: prefix for threads created by [`Task::spawn`](crate::Task::spawn)
///
/// ## Notes
/// All fields are public. Endpoints given here go through the same validation as
/// [`Task::set_progress_endpoints`](crate::Task::set_progress_endpoints); invalid
/// values fall back to the defaults with a warning.
#[derive(Clone, Debug)]
pub struct TaskConfig {
    /// Periodic wake interval while the task is paused inside a checkpoint.
    pub pause_poll: Duration,

    /// Progress reported for a raw fraction of `0.0`.
    pub progress_begin: f64,

    /// Progress reported for a raw fraction of `1.0`.
    pub progress_end: f64,

    /// Emit diagnostic logs for unexpected failures.
    ///
    /// Deliberate failures and cancellations are never logged as errors.
    pub log_unexpected: bool,

    /// Prefix for the names of threads started by `Task::spawn`.
    pub thread_name_prefix: String,
}

impl TaskConfig {
    /// Returns the pause poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn pause_poll_clamped(&self) -> Duration {
        self.pause_poll.max(Duration::from_millis(1))
    }

    /// Builds the thread name used by `Task::spawn` for a task called `task`.
    #[inline]
    pub fn thread_name(&self, task: &str) -> String {
        if self.thread_name_prefix.is_empty() {
            task.to_string()
        } else {
            format!("{}-{}", self.thread_name_prefix, task)
        }
    }
}

impl Default for TaskConfig {
    /// Default configuration:
    ///
    /// - `pause_poll = 1s`
    /// - `progress_begin = 0.0`, `progress_end = 1.0`
    /// - `log_unexpected = true`
    /// - `thread_name_prefix = "task"`
    fn default() -> Self {
        Self {
            pause_poll: Duration::from_secs(1),
            progress_begin: 0.0,
            progress_end: 1.0,
            log_unexpected: true,
            thread_name_prefix: "task".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_poll_clamped() {
        let cfg = TaskConfig {
            pause_poll: Duration::ZERO,
            ..TaskConfig::default()
        };
        assert_eq!(cfg.pause_poll_clamped(), Duration::from_millis(1));
        assert_eq!(
            TaskConfig::default().pause_poll_clamped(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_thread_name() {
        let mut cfg = TaskConfig::default();
        assert_eq!(cfg.thread_name("kmeans"), "task-kmeans");
        cfg.thread_name_prefix.clear();
        assert_eq!(cfg.thread_name("kmeans"), "kmeans");
    }
}
