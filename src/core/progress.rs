//! # Progress endpoints.
//!
//! Work reports raw fractions of its own range; [`ProgressRange`] maps them into
//! the `[begin, end]` slice a parent assigned to this task, so nested tasks can
//! report proportionally into an overall progress.
//!
//! ```text
//! raw:    0.0 ──────── 0.5 ──────── 1.0
//!          │            │            │
//! mapped: 0.2 ──────── 0.5 ──────── 0.8      (begin = 0.2, end = 0.8)
//! ```

use crate::error::UsageError;

/// Validated `[begin, end]` endpoints with `0 <= begin <= end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProgressRange {
    begin: f64,
    end: f64,
}

impl ProgressRange {
    pub(crate) fn new(begin: f64, end: f64) -> Result<Self, UsageError> {
        // NaN fails every comparison, so check the accepted shape positively.
        if begin >= 0.0 && end >= 0.0 && begin <= end && end.is_finite() {
            Ok(Self { begin, end })
        } else {
            Err(UsageError::InvalidEndpoints { begin, end })
        }
    }

    #[inline]
    pub(crate) fn begin(&self) -> f64 {
        self.begin
    }

    #[inline]
    pub(crate) fn end(&self) -> f64 {
        self.end
    }

    /// Maps a raw fraction (clamped to `[0, 1]`) into the range.
    pub(crate) fn scale(&self, raw: f64) -> f64 {
        let raw = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
        if raw == 0.0 {
            return self.begin;
        }
        if raw == 1.0 {
            return self.end;
        }
        self.begin + raw * (self.end - self.begin)
    }
}

impl Default for ProgressRange {
    fn default() -> Self {
        Self {
            begin: 0.0,
            end: 1.0,
        }
    }
}
