//! Network-origin gate
//!
//! Matches a caller's address against a comma-separated allow-list of
//! `address/prefix` ranges. The list is parsed fresh on every evaluation so
//! configuration can rotate without a restart. An unset or empty list denies
//! all traffic.

use std::net::IpAddr;

use tracing::debug;

use crate::error::{ApiError, Result};

/// A contiguous block of addresses within one family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrRange {
    network: IpAddr,
    prefix: u8,
}

impl AddrRange {
    /// Parse `address/prefix`. Both families, compact or fully-expanded
    /// textual forms. Returns `None` on any syntax or range problem.
    pub fn parse(entry: &str) -> Option<AddrRange> {
        let (addr, len) = entry.split_once('/')?;
        let network: IpAddr = addr.trim().parse().ok()?;
        let prefix: u8 = len.trim().parse().ok()?;
        let bits = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix > bits {
            return None;
        }
        Some(AddrRange { network, prefix })
    }

    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Whether `addr` falls inside this range. A family mismatch never
    /// matches; a prefix of 0 matches the whole address space.
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.network, addr) {
            (IpAddr::V4(net), IpAddr::V4(a)) => prefix_eq(&net.octets(), &a.octets(), self.prefix),
            (IpAddr::V6(net), IpAddr::V6(a)) => prefix_eq(&net.octets(), &a.octets(), self.prefix),
            _ => false,
        }
    }
}

/// Compare the leading `prefix` bits of two equal-length byte sequences
fn prefix_eq(a: &[u8], b: &[u8], prefix: u8) -> bool {
    let whole = (prefix / 8) as usize;
    if a[..whole] != b[..whole] {
        return false;
    }
    let rest = prefix % 8;
    if rest == 0 {
        return true;
    }
    let mask = 0xffu8 << (8 - rest);
    (a[whole] & mask) == (b[whole] & mask)
}

/// Parse a comma-separated allow-list. Entries that fail to parse are
/// dropped individually; one bad entry never invalidates the rest.
pub fn parse_ranges(config: &str) -> Vec<AddrRange> {
    config
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .filter_map(|e| {
            let range = AddrRange::parse(e);
            if range.is_none() {
                debug!("skipping unparsable allow-list entry: {}", e);
            }
            range
        })
        .collect()
}

/// Evaluate a remote address against the configured allow-list.
///
/// Fail-closed: a missing, empty, or entirely unparsable list denies every
/// address.
pub fn evaluate(remote: IpAddr, ranges: Option<&str>) -> Result<()> {
    let denied = || ApiError::unauthorized(format!("{} is not allowed to access this resource.", remote));

    let config = match ranges {
        Some(c) if !c.trim().is_empty() => c,
        _ => return Err(denied()),
    };

    if parse_ranges(config).iter().any(|r| r.contains(remote)) {
        Ok(())
    } else {
        Err(denied())
    }
}
