//! Renders run durations for the completion message.

use std::time::Duration;

/// Formats `d` with the coarsest applicable units.
///
/// - `>= 1h`: `"{h} hours, {m} minutes, and {s} seconds"`
/// - `>= 1m`: `"{m} minutes, {s} seconds, and {ms} msec"`
/// - `>= 1s`: `"{s} seconds, {ms} msec"`
/// - otherwise: `"{ms} msec"`
pub(crate) fn describe(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let millis = d.subsec_millis();

    if hours > 0 {
        format!("{hours} hours, {minutes} minutes, and {seconds} seconds")
    } else if minutes > 0 {
        format!("{minutes} minutes, {seconds} seconds, and {millis} msec")
    } else if seconds > 0 {
        format!("{seconds} seconds, {millis} msec")
    } else {
        format!("{millis} msec")
    }
}
