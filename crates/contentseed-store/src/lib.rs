//! Content storage for contentseed.
//!
//! Provides [`MemoryContentStore`], an in-process [`ContentStore`] that keeps one
//! tree per (repository, branch) and enforces access control against the
//! caller's [`SeedContext`], plus [`RoleFlag`], a switchable
//! [`ClusterRoleProvider`].
//!
//! # Example
//!
//! ```rust
//! use contentseed_core::{
//!     ContentPath, ContentStore, ContextFactory, ElevatingContextFactory, FolderSpec,
//!     SeedConfig,
//! };
//! use contentseed_store::MemoryContentStore;
//!
//! let config = SeedConfig::default();
//! let ctx = ElevatingContextFactory::new()
//!     .build(config.context_request())
//!     .unwrap();
//!
//! let store = MemoryContentStore::new();
//! store
//!     .create(&ctx, FolderSpec::new("docs", "Docs", ContentPath::root()).into())
//!     .unwrap();
//!
//! let docs = ContentPath::parse("/docs").unwrap();
//! assert!(store.get_by_path(&ctx, &docs).unwrap().is_some());
//! ```

mod memory;
mod role;

pub use memory::MemoryContentStore;
pub use role::RoleFlag;

// Re-export core types for convenience
pub use contentseed_core::{
    ClusterRoleProvider, Content, ContentId, ContentPath, ContentStore, SeedContext, StoreError,
};
