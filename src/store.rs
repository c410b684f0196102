//! Directory store backed by LMDB
//!
//! The store is the collaborator every write pipeline runs against. A
//! `Session` wraps one write transaction; the executor commits it on success
//! and drops (aborts) it on every other path. Uniqueness violations surface
//! as `StoreError::Duplicate` so callers can translate them to `Conflict`
//! instead of an internal fault.
//!
//! Storage layout:
//! - `units`:      unit id (be bytes) -> name
//! - `unit_names`: name -> unit id (the uniqueness constraint)
//! - `people`:     person id (be bytes) -> name
//! - `members`:    key(unit, person) -> role code, with a reverse index
//!   `key(person, unit)` kept in sync
//! - `meta`:       id allocation counters

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use heed::types::{Bytes, Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::error;

use crate::error::ApiError;

// Database type aliases
type Db = Database<Bytes, U64<byteorder::BigEndian>>;
type DbStr = Database<Bytes, Str>;
type DbNames = Database<Str, U64<byteorder::BigEndian>>;
type DbMeta = Database<Str, Str>;

/// Error type for store operations
#[derive(Debug, Clone)]
pub enum StoreError {
    /// A uniqueness constraint was violated; translates to `Conflict`
    Duplicate(String),
    /// Any other storage fault; translates to `Internal`
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Duplicate(m) => write!(f, "duplicate: {}", m),
            StoreError::Backend(m) => write!(f, "backend: {}", m),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<heed::Error> for StoreError {
    fn from(e: heed::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(m) => ApiError::conflict(m),
            StoreError::Backend(m) => {
                error!("storage fault: {}", m);
                ApiError::internal("An unexpected storage error occurred.")
            }
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Create a 16-byte key from two u64 values
#[inline]
pub(crate) fn key(a: u64, b: u64) -> [u8; 16] {
    let a = a.to_be_bytes();
    let b = b.to_be_bytes();
    [a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7],
     b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]
}

/// Bidirectional index: fwd[a,b] and rev[b,a] stay in sync
struct BiIndex {
    fwd: Db,
    rev: Db,
}

impl BiIndex {
    #[inline]
    fn find(&self, tx: &RoTxn, a: u64, b: u64) -> StoreResult<Option<u64>> {
        Ok(self.fwd.get(tx, &key(a, b))?)
    }

    #[inline]
    fn put(&self, tx: &mut RwTxn, a: u64, b: u64, v: u64) -> StoreResult<()> {
        self.fwd.put(tx, &key(a, b), &v)?;
        self.rev.put(tx, &key(b, a), &v)?;
        Ok(())
    }

    #[inline]
    fn del(&self, tx: &mut RwTxn, a: u64, b: u64) -> StoreResult<bool> {
        let r = self.fwd.delete(tx, &key(a, b))?;
        self.rev.delete(tx, &key(b, a))?;
        Ok(r)
    }

    fn list_fwd(&self, tx: &RoTxn, a: u64) -> StoreResult<Vec<(u64, u64)>> {
        Self::list_pfx(tx, &self.fwd, a)
    }

    fn list_rev(&self, tx: &RoTxn, b: u64) -> StoreResult<Vec<(u64, u64)>> {
        Self::list_pfx(tx, &self.rev, b)
    }

    fn list_pfx(tx: &RoTxn, db: &Db, pfx: u64) -> StoreResult<Vec<(u64, u64)>> {
        let mut r = Vec::new();
        for item in db.prefix_iter(tx, &pfx.to_be_bytes())? {
            let (k, v) = item?;
            if k.len() == 16 {
                r.push((u64::from_be_bytes(k[8..16].try_into().unwrap()), v));
            }
        }
        Ok(r)
    }
}

/// All database handles
struct Tables {
    units: DbStr,
    unit_names: DbNames,
    people: DbStr,
    members: BiIndex,
    meta: DbMeta,
}

/// Handle to an open directory store
pub struct Store {
    env: Env,
    tables: Tables,
    calls: AtomicU64,
}

impl Store {
    /// Open (or create) the store at `path`
    pub fn open(path: &str) -> StoreResult<Store> {
        std::fs::create_dir_all(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(1 << 30)
                .max_dbs(6)
                .open(Path::new(path))?
        };
        let mut tx = env.write_txn()?;
        let tables = Tables {
            units: env.create_database(&mut tx, Some("units"))?,
            unit_names: env.create_database(&mut tx, Some("unit_names"))?,
            people: env.create_database(&mut tx, Some("people"))?,
            members: BiIndex {
                fwd: env.create_database(&mut tx, Some("members"))?,
                rev: env.create_database(&mut tx, Some("members_rev"))?,
            },
            meta: env.create_database(&mut tx, Some("meta"))?,
        };
        tx.commit()?;
        Ok(Store { env, tables, calls: AtomicU64::new(0) })
    }

    /// Begin a session. One write transaction; commit or drop decides its fate.
    pub fn session(&self) -> StoreResult<Session<'_>> {
        Ok(Session {
            txn: self.env.write_txn()?,
            tables: &self.tables,
            calls: &self.calls,
        })
    }

    /// Total storage calls performed through this handle's sessions
    /// (test instrumentation)
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

/// One request's storage session
pub struct Session<'a> {
    txn: RwTxn<'a>,
    tables: &'a Tables,
    calls: &'a AtomicU64,
}

impl<'a> Session<'a> {
    #[inline]
    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn commit(self) -> StoreResult<()> {
        self.txn.commit()?;
        Ok(())
    }

    fn next_id(&mut self, counter: &str) -> StoreResult<u64> {
        let id = self.tables.meta
            .get(&self.txn, counter)?
            .and_then(|s| s.parse().ok())
            .unwrap_or(1u64);
        self.tables.meta.put(&mut self.txn, counter, &(id + 1).to_string())?;
        Ok(id)
    }

    // === Units ===

    /// Create a unit. Names are unique; a taken name is a `Duplicate`.
    pub fn create_unit(&mut self, name: &str) -> StoreResult<u64> {
        self.tick();
        if self.tables.unit_names.get(&self.txn, name)?.is_some() {
            return Err(StoreError::Duplicate(format!("A unit named '{}' already exists.", name)));
        }
        let id = self.next_id("next_unit_id")?;
        self.tables.units.put(&mut self.txn, &id.to_be_bytes(), name)?;
        self.tables.unit_names.put(&mut self.txn, name, &id)?;
        Ok(id)
    }

    /// Get a unit's name
    pub fn unit(&mut self, id: u64) -> StoreResult<Option<String>> {
        self.tick();
        Ok(self.tables.units.get(&self.txn, &id.to_be_bytes())?.map(|s| s.to_string()))
    }

    /// Rename a unit. The new name must not belong to another unit.
    pub fn rename_unit(&mut self, id: u64, new_name: &str) -> StoreResult<()> {
        self.tick();
        if let Some(holder) = self.tables.unit_names.get(&self.txn, new_name)? {
            if holder != id {
                return Err(StoreError::Duplicate(format!("A unit named '{}' already exists.", new_name)));
            }
        }
        let old = self.tables.units.get(&self.txn, &id.to_be_bytes())?.map(|s| s.to_string());
        if let Some(old) = old {
            self.tables.unit_names.delete(&mut self.txn, &old)?;
        }
        self.tables.units.put(&mut self.txn, &id.to_be_bytes(), new_name)?;
        self.tables.unit_names.put(&mut self.txn, new_name, &id)?;
        Ok(())
    }

    /// Delete a unit and every membership row that references it
    pub fn delete_unit(&mut self, id: u64) -> StoreResult<bool> {
        self.tick();
        let name = self.tables.units.get(&self.txn, &id.to_be_bytes())?.map(|s| s.to_string());
        if let Some(name) = name {
            self.tables.unit_names.delete(&mut self.txn, &name)?;
        }
        for (person, _) in self.tables.members.list_fwd(&self.txn, id)? {
            self.tables.members.del(&mut self.txn, id, person)?;
        }
        Ok(self.tables.units.delete(&mut self.txn, &id.to_be_bytes())?)
    }

    // === People ===

    pub fn create_person(&mut self, name: &str) -> StoreResult<u64> {
        self.tick();
        let id = self.next_id("next_person_id")?;
        self.tables.people.put(&mut self.txn, &id.to_be_bytes(), name)?;
        Ok(id)
    }

    /// Get a person's name
    pub fn person(&mut self, id: u64) -> StoreResult<Option<String>> {
        self.tick();
        Ok(self.tables.people.get(&self.txn, &id.to_be_bytes())?.map(|s| s.to_string()))
    }

    // === Memberships ===

    /// Insert a membership. At most one per (unit, person) pair.
    pub fn insert_membership(&mut self, unit: u64, person: u64, role_code: u64) -> StoreResult<()> {
        self.tick();
        if self.tables.members.find(&self.txn, unit, person)?.is_some() {
            return Err(StoreError::Duplicate("A membership for this person in this unit already exists.".into()));
        }
        self.tables.members.put(&mut self.txn, unit, person, role_code)
    }

    /// Get the role code for a membership
    pub fn membership(&mut self, unit: u64, person: u64) -> StoreResult<Option<u64>> {
        self.tick();
        self.tables.members.find(&self.txn, unit, person)
    }

    /// Replace a membership's role code. False if no such membership.
    pub fn update_membership(&mut self, unit: u64, person: u64, role_code: u64) -> StoreResult<bool> {
        self.tick();
        if self.tables.members.find(&self.txn, unit, person)?.is_none() {
            return Ok(false);
        }
        self.tables.members.put(&mut self.txn, unit, person, role_code)?;
        Ok(true)
    }

    /// Remove a membership. False if no such membership.
    pub fn remove_membership(&mut self, unit: u64, person: u64) -> StoreResult<bool> {
        self.tick();
        self.tables.members.del(&mut self.txn, unit, person)
    }

    /// List (person id, role code) pairs for a unit
    pub fn list_members(&mut self, unit: u64) -> StoreResult<Vec<(u64, u64)>> {
        self.tick();
        self.tables.members.list_fwd(&self.txn, unit)
    }

    /// List (unit id, role code) pairs for a person
    pub fn list_units_for(&mut self, person: u64) -> StoreResult<Vec<(u64, u64)>> {
        self.tick();
        self.tables.members.list_rev(&self.txn, person)
    }
}
