//! # Example: Pause, resume and cancel a running task
//!
//! Runs a slow counter on its own thread, pauses it, resumes it, then cancels it,
//! logging every lifecycle event through [`LogWriter`].
//!
//! ```text
//! RUST_LOG=debug cargo run --example pausable
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskgate::{Context, LogWriter, Task, TaskError, WaitError, WorkFn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let task = Task::new(WorkFn::new("counter", |ctx: &Context| {
        let total = 200u32;
        for i in 1..=total {
            ctx.sleep(Duration::from_millis(10))?;
            if i % 20 == 0 {
                ctx.post_message(format!("counted to {i}"))?;
            }
            ctx.post_progress(f64::from(i) / f64::from(total))?;
        }
        Ok::<_, TaskError>(total)
    }));
    task.subscribe(Arc::new(LogWriter::new()));

    let handle = task.spawn()?;

    std::thread::sleep(Duration::from_millis(300));
    task.request_pause();
    println!("[main] paused at {:.0}%", task.progress() * 100.0);

    std::thread::sleep(Duration::from_millis(300));
    task.resume();

    match task.wait_timeout(Duration::from_millis(400)) {
        Err(WaitError::Timeout { .. }) => {
            println!("[main] still running after 400ms, cancelling");
            task.request_cancel(false);
        }
        other => println!("[main] finished early: {other:?}"),
    }

    let outcome = handle.join().map_err(|_| anyhow::anyhow!("task thread panicked"))??;
    println!("[main] outcome: {outcome}");
    Ok(())
}
