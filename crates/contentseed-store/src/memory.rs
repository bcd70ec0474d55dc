//! In-process content store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use compact_str::CompactString;
use dashmap::DashMap;
use tracing::debug;

use contentseed_core::{
    AccessControlList, Branch, Content, ContentId, ContentPath, ContentStore, CreateContent,
    Permission, RepositoryId, SeedContext, StoreError,
};

/// (repository, branch) pair a context addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BranchKey {
    repository: RepositoryId,
    branch: Branch,
}

impl BranchKey {
    fn of(ctx: &SeedContext) -> Self {
        Self {
            repository: ctx.repository.clone(),
            branch: ctx.branch.clone(),
        }
    }
}

/// Nodes of one branch, ordered by path so that every parent precedes its
/// descendants and each subtree is contiguous.
#[derive(Debug, Default)]
struct BranchState {
    by_path: BTreeMap<ContentPath, Content>,
    by_id: HashMap<ContentId, ContentPath>,
}

impl BranchState {
    fn get_by_id(&self, id: &ContentId) -> Option<&Content> {
        self.by_id.get(id).and_then(|path| self.by_path.get(path))
    }

    /// Effective ACL governing writes below `path` (empty at the root).
    fn acl_of(&self, path: &ContentPath) -> AccessControlList {
        self.by_path
            .get(path)
            .map(|content| content.permissions.clone())
            .unwrap_or_default()
    }

    fn subtree_paths(&self, root: &ContentPath) -> Vec<ContentPath> {
        self.by_path
            .range(root.clone()..)
            .skip(1)
            .take_while(|(path, _)| path.is_descendant_of(root))
            .map(|(path, _)| path.clone())
            .collect()
    }
}

/// A [`ContentStore`] held in memory, one tree per (repository, branch).
///
/// Access control is enforced against the context's principals:
/// administrators pass every check, everyone else needs `READ` to see a node,
/// `CREATE` on the parent to add a child, `MODIFY` to update and
/// `WRITE_PERMISSIONS` to change or apply permissions. Writing below the root
/// requires an administrator.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    branches: DashMap<BranchKey, BranchState>,
    next_id: AtomicU64,
    operations: AtomicU64,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls served so far, reads included.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }

    /// Number of nodes stored in the context's branch.
    pub fn len(&self, ctx: &SeedContext) -> usize {
        self.branches
            .get(&BranchKey::of(ctx))
            .map(|state| state.by_path.len())
            .unwrap_or(0)
    }

    /// Check if the context's branch holds no nodes.
    pub fn is_empty(&self, ctx: &SeedContext) -> bool {
        self.len(ctx) == 0
    }

    /// Every node of the context's branch in path order, bypassing access
    /// control. Does not count as a store operation.
    pub fn snapshot(&self, ctx: &SeedContext) -> Vec<Content> {
        self.branches
            .get(&BranchKey::of(ctx))
            .map(|state| state.by_path.values().cloned().collect())
            .unwrap_or_default()
    }

    fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }

    /// Next sequential id not already taken in `state`, which may hold ids
    /// supplied by callers.
    fn generate_id(&self, state: &BranchState) -> ContentId {
        loop {
            let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let id = ContentId(CompactString::new(format!("{n:016x}")));
            if !state.by_id.contains_key(&id) {
                return id;
            }
        }
    }
}

fn can_read(ctx: &SeedContext, content: &Content) -> bool {
    ctx.auth.is_administrator() || content.permissions.is_allowed(ctx.principals(), Permission::Read)
}

fn require(
    ctx: &SeedContext,
    acl: &AccessControlList,
    path: &ContentPath,
    permission: Permission,
) -> Result<(), StoreError> {
    if ctx.auth.is_administrator() || acl.is_allowed(ctx.principals(), permission) {
        Ok(())
    } else {
        Err(StoreError::AccessDenied {
            path: path.clone(),
            permission: permission.as_str(),
        })
    }
}

impl ContentStore for MemoryContentStore {
    fn get_by_path(
        &self,
        ctx: &SeedContext,
        path: &ContentPath,
    ) -> Result<Option<Content>, StoreError> {
        self.record_operation();
        Ok(self.branches.get(&BranchKey::of(ctx)).and_then(|state| {
            state
                .by_path
                .get(path)
                .filter(|content| can_read(ctx, content))
                .cloned()
        }))
    }

    fn get_by_id(&self, ctx: &SeedContext, id: &ContentId) -> Result<Option<Content>, StoreError> {
        self.record_operation();
        Ok(self.branches.get(&BranchKey::of(ctx)).and_then(|state| {
            state
                .get_by_id(id)
                .filter(|content| can_read(ctx, content))
                .cloned()
        }))
    }

    fn children(&self, ctx: &SeedContext, path: &ContentPath) -> Result<Vec<Content>, StoreError> {
        self.record_operation();
        let Some(state) = self.branches.get(&BranchKey::of(ctx)) else {
            return Ok(Vec::new());
        };

        let depth = path.depth() + 1;
        Ok(state
            .subtree_paths(path)
            .iter()
            .filter(|child| child.depth() == depth)
            .filter_map(|child| state.by_path.get(child))
            .filter(|content| can_read(ctx, content))
            .cloned()
            .collect())
    }

    fn create(&self, ctx: &SeedContext, params: CreateContent) -> Result<Content, StoreError> {
        self.record_operation();
        let path = params.path()?;
        let mut state = self.branches.entry(BranchKey::of(ctx)).or_default();

        if state.by_path.contains_key(&path) {
            return Err(StoreError::AlreadyExists { path });
        }

        let parent = params.parent.clone();
        if !parent.is_root() && !state.by_path.contains_key(&parent) {
            return Err(StoreError::ParentNotFound { path });
        }

        let parent_acl = state.acl_of(&parent);
        require(ctx, &parent_acl, &parent, Permission::Create)?;

        let id = match params.id.clone() {
            Some(id) if state.by_id.contains_key(&id) => {
                return Err(StoreError::IdInUse { id });
            }
            Some(id) => id,
            None => self.generate_id(&state),
        };

        let now = Utc::now();
        let permissions = if params.inherit_permissions {
            parent_acl
        } else {
            params.permissions.clone()
        };

        let content = Content {
            id,
            name: CompactString::new(&params.name),
            display_name: params.display_name().to_string(),
            path: path.clone(),
            content_type: params.content_type,
            data: params.data,
            permissions,
            inherit_permissions: params.inherit_permissions,
            owner: params.owner,
            creator: ctx.auth.user.clone(),
            created_at: now,
            modified_at: now,
        };

        debug!(path = %path, id = %content.id, "created content");
        state.by_id.insert(content.id.clone(), path.clone());
        state.by_path.insert(path, content.clone());

        Ok(content)
    }

    fn update(&self, ctx: &SeedContext, content: Content) -> Result<Content, StoreError> {
        self.record_operation();
        let mut state = self
            .branches
            .get_mut(&BranchKey::of(ctx))
            .ok_or_else(|| StoreError::NotFound {
                id: content.id.clone(),
            })?;

        let path = state
            .by_id
            .get(&content.id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                id: content.id.clone(),
            })?;

        let stored = state
            .by_path
            .get_mut(&path)
            .ok_or_else(|| StoreError::backend(format!("Index out of sync for {path}")))?;

        require(ctx, &stored.permissions, &path, Permission::Modify)?;
        let permissions_changed = stored.permissions != content.permissions
            || stored.inherit_permissions != content.inherit_permissions;
        if permissions_changed {
            require(ctx, &stored.permissions, &path, Permission::WritePermissions)?;
        }

        stored.display_name = content.display_name;
        stored.data = content.data;
        stored.permissions = content.permissions;
        stored.inherit_permissions = content.inherit_permissions;
        stored.modified_at = Utc::now();

        debug!(path = %path, permissions_changed, "updated content");
        Ok(stored.clone())
    }

    fn apply_permissions(&self, ctx: &SeedContext, id: &ContentId) -> Result<(), StoreError> {
        self.record_operation();
        let mut state = self
            .branches
            .get_mut(&BranchKey::of(ctx))
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;

        let root = state
            .get_by_id(id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        let root_path = root.path.clone();
        require(ctx, &root.permissions, &root_path, Permission::WritePermissions)?;

        let mut updated = 0usize;
        let now = Utc::now();
        for path in state.subtree_paths(&root_path) {
            let Some(parent) = path.parent() else {
                continue;
            };
            let parent_acl = state.acl_of(&parent);
            if let Some(node) = state.by_path.get_mut(&path) {
                if node.inherit_permissions && node.permissions != parent_acl {
                    node.permissions = parent_acl;
                    node.modified_at = now;
                    updated += 1;
                }
            }
        }

        debug!(path = %root_path, updated, "applied permissions");
        Ok(())
    }
}
