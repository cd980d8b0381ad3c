use crate::error::StoreResult;
use crate::policy::TablePolicy;

/// Server-assigned row identifier, allocated in insertion order.
pub type RowId = u64;

/// A table of rows behind the storage boundary.
///
/// This is the surface a direct database session would see, including
/// `update` and `delete`. Implementations must satisfy these invariants:
/// - Tables with [`TablePolicy::AppendOnly`] reject `update` and `delete`
///   unconditionally with `ImmutabilityViolation`, leaving the row untouched,
///   whether or not the row exists.
/// - Row ids increase strictly with each insert and are never reused.
/// - An insert is visible to all subsequent reads.
/// - All errors are propagated, never silently ignored.
pub trait RowStore<R>: Send + Sync {
    /// Name of the table, used in errors and security logs.
    fn table_name(&self) -> &str;

    /// Mutation policy enforced by this table.
    fn policy(&self) -> TablePolicy;

    /// Insert a row and return its assigned id.
    fn insert(&self, row: R) -> StoreResult<RowId>;

    /// Read a row by id. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: RowId) -> StoreResult<Option<R>>;

    /// All rows in id order.
    fn scan(&self) -> StoreResult<Vec<(RowId, R)>>;

    /// Number of rows in the table.
    fn count(&self) -> StoreResult<u64>;

    /// Replace a row in place.
    fn update(&self, id: RowId, row: R) -> StoreResult<()>;

    /// Delete a row by id. Returns `true` if the row existed.
    fn delete(&self, id: RowId) -> StoreResult<bool>;

    /// Read multiple rows in a batch.
    ///
    /// Default implementation calls `get()` for each id. Backends may
    /// override for better performance (e.g., a single `IN (...)` query).
    fn get_batch(&self, ids: &[RowId]) -> StoreResult<Vec<Option<R>>> {
        ids.iter().map(|id| self.get(*id)).collect()
    }
}
