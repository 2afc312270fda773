//! Movie catalog - the persisted, deduplicated set of matched releases.
//!
//! Entries are keyed by the release's source identity; the canonical
//! (IMDb) id is the public identity used for listing and is intentionally
//! not unique across rows.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

/// Trait for catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Check whether a release source identity is already catalogued.
    fn exists(&self, source_id: &str) -> Result<bool, CatalogError>;

    /// Insert or replace an entry, keyed on its source id.
    ///
    /// Returns false (and writes nothing) when a field required for dedup
    /// or display is missing. Never errors: a rejected write is an expected
    /// per-item outcome, not a store failure.
    fn upsert(&self, entry: &CatalogEntry) -> bool;

    /// List entries of a kind, newest first, excluding entries without a
    /// canonical id. Supports pagination and an optional search term.
    fn list(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Count listable entries of a kind.
    fn count(&self, kind: CatalogKind) -> Result<u64, CatalogError>;

    /// The n most recently added listable entries of a kind.
    fn recent(&self, kind: CatalogKind, n: u32) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Delete entries older than the given number of days.
    ///
    /// Returns the number of deleted entries.
    fn prune_older_than(&self, days: u32) -> Result<usize, CatalogError>;
}
