//! Synthetic large folder hierarchy.

use serde::Serialize;
use tracing::{debug, info};

use contentseed_core::{ConfigError, ContentStore, FolderSpec, SeedConfig, SeedContext};

use crate::error::SeedError;
use crate::seeder::has_content;

/// What [`generate_large_tree`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LargeTreeOutcome {
    /// Something already existed at the large-tree path.
    AlreadyPresent,
    /// The tree was created.
    Created { nodes: u64 },
}

impl LargeTreeOutcome {
    /// Number of nodes created.
    pub fn nodes_created(&self) -> u64 {
        match self {
            LargeTreeOutcome::AlreadyPresent => 0,
            LargeTreeOutcome::Created { nodes } => *nodes,
        }
    }
}

/// Create the large tree unless its root already exists.
///
/// The root gets the configured permissions and does not inherit; each of the
/// `large_tree_children` children and their `large_tree_grandchildren`
/// children inherit from their parent.
///
/// Nodes created before a failure are kept. A later run sees the root and
/// skips, so a tree interrupted part-way stays incomplete.
pub fn generate_large_tree<S: ContentStore>(
    store: &S,
    ctx: &SeedContext,
    config: &SeedConfig,
) -> Result<LargeTreeOutcome, SeedError> {
    let root_path = &config.large_tree_path;
    if has_content(store, ctx, root_path) {
        debug!(path = %root_path, "large tree already present");
        return Ok(LargeTreeOutcome::AlreadyPresent);
    }

    let (Some(parent), Some(name)) = (root_path.parent(), root_path.name()) else {
        return Err(ConfigError::Invalid {
            message: "Large tree path cannot be the root".to_string(),
        }
        .into());
    };

    let root = store.create(
        ctx,
        FolderSpec::new(name, config.large_tree_display_name.clone(), parent)
            .with_permissions(config.permissions.clone())
            .into(),
    )?;
    let mut created: u64 = 1;

    for i in 1..=config.large_tree_children {
        let child = store.create(
            ctx,
            FolderSpec::new(
                format!("large-tree-node-{i}"),
                format!("Large tree node {i}"),
                root.path.clone(),
            )
            .into(),
        )?;
        created += 1;

        for j in 1..=config.large_tree_grandchildren {
            store.create(
                ctx,
                FolderSpec::new(
                    format!("large-tree-node-{i}-{j}"),
                    format!("Large tree node {i}-{j}"),
                    child.path.clone(),
                )
                .into(),
            )?;
            created += 1;
        }
    }

    info!(path = %root.path, nodes = created, "created large tree");
    Ok(LargeTreeOutcome::Created { nodes: created })
}
