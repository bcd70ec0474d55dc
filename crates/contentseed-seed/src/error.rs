//! Seeding errors.

use thiserror::Error;

use contentseed_core::{ConfigError, ContextError, ImportError, StoreError};

/// Anything that aborts a seeding run.
///
/// Lookups that only decide whether to seed never produce this; they treat a
/// failure as "not present".
#[derive(Debug, Error)]
pub enum SeedError {
    /// The elevated context could not be built.
    #[error("Failed to build seeding context: {0}")]
    Context(#[from] ContextError),

    /// The bundled tree could not be imported at all.
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// A storage call failed.
    #[error("Storage call failed: {0}")]
    Store(#[from] StoreError),

    /// The configuration cannot be seeded with.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
