//! Result pipeline combinators
//!
//! Write operations are chains over the crate's `Result`: validation steps,
//! one mutation step, then a reload step, bound with `and_then`. The first
//! `Err` short-circuits everything after it, so a failed validation means no
//! mutation ever runs. This module adds the two pieces `std` does not carry:
//! a success-path side-effect combinator and a validation guard.

use crate::error::{ApiError, Result};

/// Side-effect combinator for `Result` chains
pub trait Tap<T> {
    /// Invoke `f` with the carried value on the success path, for its side
    /// effect only (audit snapshots, counters). The result itself — value or
    /// error — passes through unchanged.
    fn tap<F: FnOnce(&T)>(self, f: F) -> Self;
}

impl<T> Tap<T> for Result<T> {
    fn tap<F: FnOnce(&T)>(self, f: F) -> Self {
        if let Ok(value) = &self {
            f(value);
        }
        self
    }
}

/// Validation guard: `Ok(())` when the condition holds, the given error
/// otherwise. The error closure only runs on failure.
#[inline]
pub fn ensure(condition: bool, error: impl FnOnce() -> ApiError) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(error())
    }
}
