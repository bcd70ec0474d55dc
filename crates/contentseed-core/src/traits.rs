//! Collaborators the seeder drives.

use std::sync::Arc;

use crate::content::{Content, ContentId, CreateContent};
use crate::context::SeedContext;
use crate::error::{ImportError, StoreError};
use crate::import::{ImportParams, ImportResult};
use crate::path::ContentPath;

/// Tells whether this node is the cluster's master.
pub trait ClusterRoleProvider {
    /// `true` on exactly one node of a healthy cluster.
    fn is_master(&self) -> bool;
}

/// Hierarchical content storage.
pub trait ContentStore {
    /// Look up content by path; `Ok(None)` when nothing is stored there.
    fn get_by_path(&self, ctx: &SeedContext, path: &ContentPath)
        -> Result<Option<Content>, StoreError>;

    /// Look up content by id.
    fn get_by_id(&self, ctx: &SeedContext, id: &ContentId) -> Result<Option<Content>, StoreError>;

    /// Direct children of a path, ordered by name.
    fn children(&self, ctx: &SeedContext, path: &ContentPath) -> Result<Vec<Content>, StoreError>;

    /// Create one node.
    fn create(&self, ctx: &SeedContext, params: CreateContent) -> Result<Content, StoreError>;

    /// Replace the stored node with the same id by `content`.
    ///
    /// Only display name, data, permissions and inheritance are taken from
    /// `content`; id, path and audit fields are owned by the store.
    fn update(&self, ctx: &SeedContext, content: Content) -> Result<Content, StoreError>;

    /// Push a node's permissions down to every descendant that inherits.
    fn apply_permissions(&self, ctx: &SeedContext, id: &ContentId) -> Result<(), StoreError>;
}

/// Bulk import of a bundled tree into storage.
pub trait Importer {
    /// Import `params.source` below `params.target`.
    fn import_nodes(
        &self,
        ctx: &SeedContext,
        params: &ImportParams,
    ) -> Result<ImportResult, ImportError>;
}

impl<T: ClusterRoleProvider + ?Sized> ClusterRoleProvider for Arc<T> {
    fn is_master(&self) -> bool {
        (**self).is_master()
    }
}

impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    fn get_by_path(
        &self,
        ctx: &SeedContext,
        path: &ContentPath,
    ) -> Result<Option<Content>, StoreError> {
        (**self).get_by_path(ctx, path)
    }

    fn get_by_id(&self, ctx: &SeedContext, id: &ContentId) -> Result<Option<Content>, StoreError> {
        (**self).get_by_id(ctx, id)
    }

    fn children(&self, ctx: &SeedContext, path: &ContentPath) -> Result<Vec<Content>, StoreError> {
        (**self).children(ctx, path)
    }

    fn create(&self, ctx: &SeedContext, params: CreateContent) -> Result<Content, StoreError> {
        (**self).create(ctx, params)
    }

    fn update(&self, ctx: &SeedContext, content: Content) -> Result<Content, StoreError> {
        (**self).update(ctx, content)
    }

    fn apply_permissions(&self, ctx: &SeedContext, id: &ContentId) -> Result<(), StoreError> {
        (**self).apply_permissions(ctx, id)
    }
}

impl<T: Importer + ?Sized> Importer for Arc<T> {
    fn import_nodes(
        &self,
        ctx: &SeedContext,
        params: &ImportParams,
    ) -> Result<ImportResult, ImportError> {
        (**self).import_nodes(ctx, params)
    }
}
