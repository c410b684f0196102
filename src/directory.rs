//! Directory write operations
//!
//! Every mutation is a pipeline run through the executor: validate the
//! request, check referential integrity, mutate, then reload the canonical
//! record. Validation failures short-circuit before any storage call; a
//! uniqueness race lost at the storage layer surfaces as `Conflict`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, Result, Status};
use crate::exec::execute;
use crate::pipeline::{ensure, Tap};
use crate::rules::Role;
use crate::store::{Session, Store};

/// An organizational unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: u64,
    pub name: String,
}

/// A person known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
}

/// A person's role within a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub unit_id: u64,
    pub person_id: u64,
    pub role: Role,
}

/// Request shape for membership mutations
#[derive(Debug, Clone, Deserialize)]
pub struct MembershipRequest {
    pub unit_id: u64,
    pub person_id: u64,
    pub role: Role,
}

// === Units ===

/// Create a unit. Duplicate names are rejected by the store.
pub fn create_unit(store: &Store, name: &str) -> Result<Unit> {
    execute(store, "create unit", |s| {
        ensure(!name.trim().is_empty(), || ApiError::bad_request("Unit name is missing."))?;
        let id = s.create_unit(name.trim())?;
        load_unit(s, id)
    })
}

/// Rename a unit
pub fn rename_unit(store: &Store, unit_id: u64, name: &str) -> Result<Unit> {
    execute(store, "rename unit", |s| {
        ensure(unit_id != 0, || ApiError::bad_request("Unit id is missing."))?;
        ensure(!name.trim().is_empty(), || ApiError::bad_request("Unit name is missing."))?;
        load_unit(s, unit_id)?;
        s.rename_unit(unit_id, name.trim())?;
        load_unit(s, unit_id)
    })
}

/// Delete a unit and its memberships, returning the record as it stood
pub fn delete_unit(store: &Store, unit_id: u64) -> Result<Unit> {
    execute(store, "delete unit", |s| {
        ensure(unit_id != 0, || ApiError::bad_request("Unit id is missing."))?;
        let members = s.list_members(unit_id)?.len();
        load_unit(s, unit_id)
            .tap(|u| debug!("deleting unit {} '{}' with {} membership(s)", u.id, u.name, members))
            .and_then(|u| {
                s.delete_unit(u.id)?;
                Ok(u)
            })
    })
}

// === People ===

/// Register a person
pub fn create_person(store: &Store, name: &str) -> Result<Person> {
    execute(store, "create person", |s| {
        ensure(!name.trim().is_empty(), || ApiError::bad_request("Person name is missing."))?;
        let id = s.create_person(name.trim())?;
        load_person(s, id)
    })
}

// === Memberships ===

/// Create a membership. The pre-insert vacancy check is not atomic with the
/// insert across concurrent requests; the store constraint is the final
/// arbiter either way.
pub fn create_membership(store: &Store, req: &MembershipRequest) -> Result<Membership> {
    execute(store, "create membership", |s| {
        validate_membership_ids(req.unit_id, req.person_id)?;
        load_unit(s, req.unit_id)?;
        load_person(s, req.person_id)?;
        ensure(s.membership(req.unit_id, req.person_id)?.is_none(), || {
            ApiError::conflict("A membership for this person in this unit already exists.")
        })?;
        s.insert_membership(req.unit_id, req.person_id, req.role.code())?;
        load_membership(s, req.unit_id, req.person_id)
    })
}

/// Replace the role held by a membership
pub fn update_membership(store: &Store, req: &MembershipRequest) -> Result<Membership> {
    execute(store, "update membership", |s| {
        validate_membership_ids(req.unit_id, req.person_id)?;
        let updated = s.update_membership(req.unit_id, req.person_id, req.role.code())?;
        ensure(updated, || ApiError::not_found("The membership was not found."))?;
        load_membership(s, req.unit_id, req.person_id)
    })
}

/// Remove a membership, returning the record as it stood
pub fn delete_membership(store: &Store, unit_id: u64, person_id: u64) -> Result<Membership> {
    execute(store, "delete membership", |s| {
        validate_membership_ids(unit_id, person_id)?;
        load_membership(s, unit_id, person_id)
            .tap(|m| debug!("removing membership unit={} person={} role={}", m.unit_id, m.person_id, m.role.name()))
            .and_then(|m| {
                s.remove_membership(m.unit_id, m.person_id)?;
                Ok(m)
            })
    })
}

/// List a unit's memberships (pass-through read, no pipeline)
pub fn members_of(store: &Store, unit_id: u64) -> Result<Vec<Membership>> {
    let mut s = store.session().map_err(ApiError::from)?;
    let rows = s.list_members(unit_id)?;
    Ok(rows
        .into_iter()
        .filter_map(|(person_id, code)| {
            Role::from_code(code).map(|role| Membership { unit_id, person_id, role })
        })
        .collect())
}

// === Validation and reload steps ===

/// Collects every id problem before failing, so the caller sees all of them
fn validate_membership_ids(unit_id: u64, person_id: u64) -> Result<()> {
    let mut problems = Vec::new();
    if unit_id == 0 {
        problems.push("Unit id is missing.".to_string());
    }
    if person_id == 0 {
        problems.push("Person id is missing.".to_string());
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ApiError::with_messages(Status::BadRequest, problems))
    }
}

fn load_unit(s: &mut Session, id: u64) -> Result<Unit> {
    s.unit(id)?
        .map(|name| Unit { id, name })
        .ok_or_else(|| ApiError::not_found(format!("Unit {} was not found.", id)))
}

fn load_person(s: &mut Session, id: u64) -> Result<Person> {
    s.person(id)?
        .map(|name| Person { id, name })
        .ok_or_else(|| ApiError::not_found(format!("Person {} was not found.", id)))
}

fn load_membership(s: &mut Session, unit_id: u64, person_id: u64) -> Result<Membership> {
    let code = s
        .membership(unit_id, person_id)?
        .ok_or_else(|| ApiError::not_found("The membership was not found."))?;
    let role = Role::from_code(code)
        .ok_or_else(|| ApiError::internal("A stored role code is not recognized."))?;
    Ok(Membership { unit_id, person_id, role })
}
