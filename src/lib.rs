//! Unitgate - authorization and execution core for a directory API
//!
//! Decides whether a caller (network origin + unit role) may perform an
//! action on a resource, and provides the pipeline primitive every write
//! operation is built from: validate, mutate, reload, short-circuiting into
//! a status-coded error.

pub mod access;
pub mod caps;
pub mod config;
pub mod directory;
pub mod error;
pub mod exec;
pub mod origin;
pub mod pipeline;
pub mod rules;
pub mod store;

pub use access::{authorize, Caller};
pub use caps::{caps_to_names, is_permitted, names_to_caps, ALL, CREATE, DELETE, READ, READ_UPDATE, UPDATE};
pub use config::Settings;
pub use directory::{Membership, MembershipRequest, Person, Unit};
pub use error::{ApiError, Result, Status};
pub use exec::execute;
pub use origin::{evaluate, parse_ranges, AddrRange};
pub use pipeline::{ensure, Tap};
pub use rules::{resolve, AccessRule, Resource, Role, RuleSet};
pub use store::{Session, Store, StoreError};
