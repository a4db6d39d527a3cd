//! End-to-end checks through the crate's public surface.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskgate::{
    Context, Event, EventKind, LogWriter, Outcome, Subscribe, Task, TaskConfig, TaskError,
    UsageError, WaitError, Work, WorkFn,
};

/// Mean of a sample, failing deliberately on empty input.
struct Mean(Vec<f64>);

impl Work for Mean {
    type Output = f64;

    fn name(&self) -> &str {
        "mean"
    }

    fn run(&self, ctx: &Context) -> Result<f64, TaskError> {
        if self.0.is_empty() {
            return Err(TaskError::fail("empty sample"));
        }
        let mut sum = 0.0;
        for (i, x) in self.0.iter().enumerate() {
            sum += x;
            ctx.post_progress((i + 1) as f64 / self.0.len() as f64)?;
        }
        Ok(sum / self.0.len() as f64)
    }
}

#[derive(Default)]
struct Counting {
    seen: AtomicUsize,
    kinds: Mutex<Vec<EventKind>>,
}

impl Subscribe for Counting {
    fn on_event(&self, event: &Event) {
        self.seen.fetch_add(1, Ordering::SeqCst);
        self.kinds.lock().unwrap().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn custom_work_reports_progress_and_value() -> anyhow::Result<()> {
    init_tracing();
    let task = Task::new(Mean(vec![2.0, 4.0, 6.0, 8.0]));
    let counting = Arc::new(Counting::default());
    task.subscribe(counting.clone());
    task.subscribe(Arc::new(LogWriter::new()));

    assert_eq!(task.name(), "mean");
    assert_eq!(task.run()?, Outcome::Success);
    assert_eq!(task.wait()?, 5.0);
    assert_eq!(task.progress(), 1.0);

    let kinds = counting.kinds.lock().unwrap().clone();
    assert_eq!(kinds.first(), Some(&EventKind::TaskBegun));
    assert_eq!(kinds.last(), Some(&EventKind::TaskEnded));
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::TaskProgress).count(),
        4
    );
    Ok(())
}

#[test]
fn deliberate_failure_surfaces_as_execution_error() {
    init_tracing();
    let task = Task::new(Mean(Vec::new()));
    assert_eq!(task.run(), Ok(Outcome::Error));

    let err = task.wait().unwrap_err();
    assert_eq!(err.as_label(), "wait_execution_failed");
    assert_eq!(task.error_message().as_deref(), Some("empty sample"));
}

#[test]
fn unsubscribed_listener_sees_nothing() {
    let task = Task::new(WorkFn::new("quiet", |ctx: &Context| {
        ctx.post_message("hello")?;
        Ok::<_, TaskError>(())
    }));
    let counting = Arc::new(Counting::default());
    let id = task.subscribe(counting.clone());
    assert!(task.unsubscribe(id));
    assert!(!task.unsubscribe(id));

    task.run().unwrap();
    assert_eq!(counting.seen.load(Ordering::SeqCst), 0);
}

#[test]
fn configured_endpoints_apply_from_the_start() {
    let config = TaskConfig {
        progress_begin: 0.5,
        progress_end: 0.75,
        ..TaskConfig::default()
    };
    let task = Task::with_config(
        WorkFn::new("half", |ctx: &Context| {
            ctx.post_progress(1.0)?;
            Ok::<_, TaskError>(())
        }),
        config,
    );

    assert_eq!(task.begin_progress(), 0.5);
    task.run().unwrap();
    assert_eq!(task.progress(), 0.75);
}

#[test]
fn reused_instance_runs_again_after_reset() {
    let task = Task::new(Mean(vec![1.0]));
    task.run().unwrap();
    assert_eq!(task.run(), Err(UsageError::NotReset));

    task.reset().unwrap();
    let handle = task.spawn().unwrap();
    assert_eq!(task.wait_timeout(Duration::from_secs(5)).unwrap(), 1.0);
    assert_eq!(handle.join().unwrap(), Ok(Outcome::Success));
}

#[tokio::test]
async fn async_wait_reports_cancellation() {
    let task = Task::new(WorkFn::new("long", |ctx: &Context| {
        ctx.sleep(Duration::from_secs(30))?;
        Ok::<_, TaskError>(())
    }));
    task.request_cancel(true);
    let handle = task.spawn().unwrap();

    let res = task.wait_async_timeout(Duration::from_secs(5)).await;
    assert!(matches!(res, Err(WaitError::Canceled)));
    assert_eq!(handle.join().unwrap(), Ok(Outcome::Cancelled));
}
