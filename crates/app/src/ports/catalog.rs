//! Alias catalog port — source of the alias table.

use std::future::Future;

use domobridge_domain::alias::AliasTable;

/// Loads the alias table from its backing source.
///
/// Loading fails soft: a missing or corrupt source yields an **empty**
/// table (with a warning logged by the adapter), never an error — the
/// resolver must stay usable with zero aliases. Callers load a fresh
/// table per resolution so catalog edits apply without a restart.
pub trait AliasCatalog {
    /// Build the table from the current catalog contents.
    fn load(&self) -> impl Future<Output = AliasTable> + Send;
}

impl<T: AliasCatalog + Send + Sync> AliasCatalog for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = AliasTable> + Send {
        (**self).load()
    }
}
