use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::policy::{Mutation, TablePolicy};
use crate::traits::{RowId, RowStore};

type KeyFn<R> = Box<dyn Fn(&R) -> String + Send + Sync>;

struct UniqueKey<R> {
    name: String,
    key: KeyFn<R>,
}

struct TableState<R> {
    rows: BTreeMap<RowId, R>,
    next_id: RowId,
    /// (constraint index, key) -> owning row.
    unique_index: HashMap<(usize, String), RowId>,
}

/// In-memory table with storage-level mutation policy and unique keys.
///
/// Intended for tests and embedding. Rows are held in a `BTreeMap` behind a
/// `RwLock`; reads clone rows out, so callers never hold references into the
/// table.
pub struct InMemoryTable<R> {
    name: String,
    policy: TablePolicy,
    unique: Vec<UniqueKey<R>>,
    inner: RwLock<TableState<R>>,
}

impl<R: Clone + Send + Sync> InMemoryTable<R> {
    pub fn new(name: impl Into<String>, policy: TablePolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            unique: Vec::new(),
            inner: RwLock::new(TableState {
                rows: BTreeMap::new(),
                next_id: 1,
                unique_index: HashMap::new(),
            }),
        }
    }

    /// An insert-only table.
    pub fn append_only(name: impl Into<String>) -> Self {
        Self::new(name, TablePolicy::AppendOnly)
    }

    pub fn mutable(name: impl Into<String>) -> Self {
        Self::new(name, TablePolicy::Mutable)
    }

    /// Add a unique constraint over a key derived from each row.
    pub fn with_unique(
        mut self,
        constraint: impl Into<String>,
        key: impl Fn(&R) -> String + Send + Sync + 'static,
    ) -> Self {
        self.unique.push(UniqueKey {
            name: constraint.into(),
            key: Box::new(key),
        });
        self
    }

    /// Insert a row built from its assigned id.
    ///
    /// The id is allocated and the unique constraints checked under the same
    /// write lock, so the insert is atomic: on a constraint violation nothing
    /// is written and the id is not consumed.
    pub fn insert_with<F>(&self, build: F) -> StoreResult<(RowId, R)>
    where
        F: FnOnce(RowId) -> R,
    {
        let mut state = self.write_state()?;
        let id = state.next_id;
        let row = build(id);

        let keys = self.unique_keys(&row);
        for (index, key) in &keys {
            if state.unique_index.contains_key(&(*index, key.clone())) {
                return Err(StoreError::UniqueViolation {
                    table: self.name.clone(),
                    constraint: self.unique[*index].name.clone(),
                    key: key.clone(),
                });
            }
        }

        for (index, key) in keys {
            state.unique_index.insert((index, key), id);
        }
        state.rows.insert(id, row.clone());
        state.next_id += 1;
        Ok((id, row))
    }

    /// Rows matching a predicate, in id order.
    pub fn find(&self, predicate: impl Fn(&R) -> bool) -> StoreResult<Vec<(RowId, R)>> {
        let state = self.read_state()?;
        Ok(state
            .rows
            .iter()
            .filter(|(_, row)| predicate(row))
            .map(|(id, row)| (*id, row.clone()))
            .collect())
    }

    /// Look up a row through a unique constraint.
    pub fn find_unique(&self, constraint: &str, key: &str) -> StoreResult<Option<(RowId, R)>> {
        let Some(index) = self.unique.iter().position(|u| u.name == constraint) else {
            return Ok(None);
        };
        let state = self.read_state()?;
        Ok(state
            .unique_index
            .get(&(index, key.to_string()))
            .and_then(|id| state.rows.get(id).map(|row| (*id, row.clone()))))
    }

    fn unique_keys(&self, row: &R) -> Vec<(usize, String)> {
        self.unique
            .iter()
            .enumerate()
            .map(|(index, constraint)| (index, (constraint.key)(row)))
            .collect()
    }

    /// Storage-level guard for in-place mutations.
    fn guard(&self, mutation: Mutation, row: RowId) -> StoreResult<()> {
        if self.policy.permits(mutation) {
            return Ok(());
        }
        tracing::error!(
            target: "security",
            table = %self.name,
            operation = %mutation,
            row,
            "rejected mutation of append-only table"
        );
        Err(StoreError::ImmutabilityViolation {
            table: self.name.clone(),
            operation: mutation,
            row,
        })
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, TableState<R>>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned {
            table: self.name.clone(),
        })
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, TableState<R>>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned {
            table: self.name.clone(),
        })
    }
}

impl<R: Clone + Send + Sync> RowStore<R> for InMemoryTable<R> {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> TablePolicy {
        self.policy
    }

    fn insert(&self, row: R) -> StoreResult<RowId> {
        self.insert_with(|_| row).map(|(id, _)| id)
    }

    fn get(&self, id: RowId) -> StoreResult<Option<R>> {
        let state = self.read_state()?;
        Ok(state.rows.get(&id).cloned())
    }

    fn scan(&self) -> StoreResult<Vec<(RowId, R)>> {
        let state = self.read_state()?;
        Ok(state
            .rows
            .iter()
            .map(|(id, row)| (*id, row.clone()))
            .collect())
    }

    fn count(&self) -> StoreResult<u64> {
        let state = self.read_state()?;
        Ok(state.rows.len() as u64)
    }

    fn update(&self, id: RowId, row: R) -> StoreResult<()> {
        self.guard(Mutation::Update, id)?;

        let mut state = self.write_state()?;
        let Some(existing) = state.rows.get(&id) else {
            return Err(StoreError::RowNotFound {
                table: self.name.clone(),
                row: id,
            });
        };

        let old_keys = self.unique_keys(existing);
        let new_keys = self.unique_keys(&row);
        for (index, key) in &new_keys {
            if let Some(owner) = state.unique_index.get(&(*index, key.clone())) {
                if *owner != id {
                    return Err(StoreError::UniqueViolation {
                        table: self.name.clone(),
                        constraint: self.unique[*index].name.clone(),
                        key: key.clone(),
                    });
                }
            }
        }

        for key in old_keys {
            state.unique_index.remove(&key);
        }
        for key in new_keys {
            state.unique_index.insert(key, id);
        }
        state.rows.insert(id, row);
        Ok(())
    }

    fn delete(&self, id: RowId) -> StoreResult<bool> {
        self.guard(Mutation::Delete, id)?;

        let mut state = self.write_state()?;
        let Some(removed) = state.rows.remove(&id) else {
            return Ok(false);
        };
        for key in self.unique_keys(&removed) {
            state.unique_index.remove(&key);
        }
        Ok(true)
    }
}

impl<R> std::fmt::Debug for InMemoryTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self.inner.read().map(|s| s.rows.len()).unwrap_or(0);
        f.debug_struct("InMemoryTable")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("rows", &rows)
            .finish()
    }
}
