//! Capability bit constants

// Capability bit constants
pub const READ: u64 = 1;
pub const CREATE: u64 = 1 << 1;
pub const UPDATE: u64 = 1 << 2;
pub const DELETE: u64 = 1 << 3;

// Named combinations
pub const READ_UPDATE: u64 = READ | UPDATE;
pub const ALL: u64 = READ | CREATE | UPDATE | DELETE;
pub const NONE: u64 = 0;

// Capability name mappings
const CAPS: &[(&str, u64)] = &[
    ("read", READ),
    ("create", CREATE),
    ("update", UPDATE),
    ("delete", DELETE),
];

/// Check if a capability mask permits every bit of the requested action
#[inline]
pub fn is_permitted(mask: u64, requested: u64) -> bool {
    (mask & requested) == requested
}

/// Convert a capability mask to a list of capability names
pub fn caps_to_names(mask: u64) -> Vec<&'static str> {
    CAPS.iter()
        .filter(|(_, b)| mask & b == *b)
        .map(|(n, _)| *n)
        .collect()
}

/// Convert a list of capability names to a mask
pub fn names_to_caps(names: &[&str]) -> u64 {
    names
        .iter()
        .filter_map(|n| CAPS.iter().find(|(k, _)| k == n).map(|(_, v)| v))
        .fold(0, |a, b| a | b)
}
