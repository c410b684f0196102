//! Pipeline executor
//!
//! The single entry point every write operation runs through. It owns the
//! storage session for the duration of the chain: the session commits only
//! when the chain returns `Ok`, and is dropped (aborted) on an `Err`, a
//! commit failure, or a panic. Panics never propagate past this boundary;
//! they are logged with full detail and downgraded to a generic internal
//! error.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{error, info, warn};

use crate::error::{ApiError, Result};
use crate::store::{Session, Store};

/// Run one request's pipeline against a fresh storage session.
///
/// `description` names the operation in logs only; it never reaches the
/// caller-facing error.
pub fn execute<'e, T>(
    store: &'e Store,
    description: &str,
    step: impl FnOnce(&mut Session<'e>) -> Result<T>,
) -> Result<T> {
    let mut session = match store.session() {
        Ok(s) => s,
        Err(e) => {
            error!("{}: could not open a storage session: {}", description, e);
            return Err(e.into());
        }
    };

    let outcome = catch_unwind(AssertUnwindSafe(|| step(&mut session)));
    match outcome {
        Ok(Ok(value)) => match session.commit() {
            Ok(()) => {
                info!("{}: ok", description);
                Ok(value)
            }
            Err(e) => {
                error!("{}: commit failed: {}", description, e);
                Err(e.into())
            }
        },
        Ok(Err(e)) => {
            // Dropping the session aborts the transaction.
            warn!("{}: {}", description, e);
            Err(e)
        }
        Err(panic) => {
            error!("{}: unexpected fault: {}", description, panic_detail(panic.as_ref()));
            Err(ApiError::internal("An unexpected error occurred."))
        }
    }
}

fn panic_detail(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
