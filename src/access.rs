//! Access decision glue
//!
//! Composes the origin gate, rule resolution, and the has-flag check in the
//! order every request goes through them: a denied origin stops everything,
//! then the caller's effective capability mask for the target resource must
//! cover the requested action.

use std::net::IpAddr;

use crate::caps::is_permitted;
use crate::error::{ApiError, Result};
use crate::origin;
use crate::rules::{denied_names, resolve, Resource, Role, RuleSet};

/// An already-authenticated caller, as the transport layer hands it over.
/// Role lookup happens upstream; this crate only consumes the result.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub remote: IpAddr,
    pub role: Option<Role>,
    pub is_admin: bool,
}

/// Decide whether `caller` may perform `action` on `resource`.
///
/// `allowed_ranges` is the current allow-list configuration, read fresh by
/// the caller per request.
pub fn authorize(
    rules: &RuleSet,
    resource: Resource,
    action: u64,
    caller: &Caller,
    allowed_ranges: Option<&str>,
) -> Result<()> {
    origin::evaluate(caller.remote, allowed_ranges)?;

    let mask = resolve(rules.rule(resource), caller.role, caller.is_admin);
    if is_permitted(mask, action) {
        Ok(())
    } else {
        Err(ApiError::unauthorized(format!(
            "Not permitted to {} this resource.",
            denied_names(mask, action).join(", ")
        )))
    }
}
