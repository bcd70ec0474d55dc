//! The seeding procedure.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use contentseed_core::{
    BundledResource, ClusterRoleProvider, ContentPath, ContentStore, ContextFactory,
    ImportParams, ImportResult, Importer, SeedConfig, SeedContext,
};

use crate::error::SeedError;
use crate::large_tree::{generate_large_tree, LargeTreeOutcome};
use crate::progress::SeedEvent;
use crate::report::log_import;

/// Result of a seeding run that wrote content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// What the bundled import produced.
    pub import: ImportResult,
    /// What happened to the large tree.
    pub large_tree: LargeTreeOutcome,
    /// Whether the site was found and its permissions applied.
    pub permissions_applied: bool,
}

/// What [`Seeder::activate`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// This node is not the master; no storage call was made.
    NotMaster,
    /// The site already existed; nothing was written.
    AlreadySeeded,
    /// Content was seeded.
    Seeded(SeedReport),
}

impl SeedOutcome {
    /// The report of a run that wrote content.
    pub fn report(&self) -> Option<&SeedReport> {
        match self {
            SeedOutcome::Seeded(report) => Some(report),
            _ => None,
        }
    }
}

/// Check whether content exists at `path`.
///
/// A failed lookup counts as "absent": this check only decides whether to
/// seed, and seeding surfaces real storage problems itself.
pub(crate) fn has_content<S: ContentStore>(store: &S, ctx: &SeedContext, path: &ContentPath) -> bool {
    match store.get_by_path(ctx, path) {
        Ok(found) => found.is_some(),
        Err(err) => {
            warn!(path = %path, error = %err, "content lookup failed, treating as absent");
            false
        }
    }
}

/// Seeds demo content once per cluster.
///
/// Only the master node seeds. The run is skipped when the site path already
/// holds content; otherwise the bundled tree is imported, the large tree is
/// generated and the site's permissions are reset and pushed down.
pub struct Seeder<R, F, S, I> {
    role: R,
    contexts: F,
    store: S,
    importer: I,
    config: SeedConfig,
    events: broadcast::Sender<SeedEvent>,
}

impl<R, F, S, I> Seeder<R, F, S, I>
where
    R: ClusterRoleProvider,
    F: ContextFactory,
    S: ContentStore,
    I: Importer,
{
    /// Create a seeder over its collaborators.
    pub fn new(role: R, contexts: F, store: S, importer: I, config: SeedConfig) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            role,
            contexts,
            store,
            importer,
            config,
            events,
        }
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<SeedEvent> {
        self.events.subscribe()
    }

    /// The configuration this seeder runs with.
    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// The store this seeder writes to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Seed if this node is the master.
    ///
    /// Builds the elevated context from the configuration and runs
    /// [`Seeder::seed`] with it. Errors from building the context and from
    /// seeding propagate to the caller.
    pub fn activate(&self) -> Result<SeedOutcome, SeedError> {
        if !self.role.is_master() {
            debug!("not the cluster master, skipping content seeding");
            self.emit(SeedEvent::NotMaster);
            return Ok(SeedOutcome::NotMaster);
        }

        let ctx = self.contexts.build(self.config.context_request())?;
        self.seed(&ctx)
    }

    /// Run the seeding procedure with `ctx`.
    pub fn seed(&self, ctx: &SeedContext) -> Result<SeedOutcome, SeedError> {
        let site_path = &self.config.site_path;
        if has_content(&self.store, ctx, site_path) {
            info!(path = %site_path, "content already seeded");
            self.emit(SeedEvent::AlreadySeeded {
                path: site_path.clone(),
            });
            return Ok(SeedOutcome::AlreadySeeded);
        }

        let import = self.import(ctx)?;
        let large_tree = generate_large_tree(&self.store, ctx, &self.config)?;
        match large_tree {
            LargeTreeOutcome::AlreadyPresent => self.emit(SeedEvent::LargeTreeSkipped {
                path: self.config.large_tree_path.clone(),
            }),
            LargeTreeOutcome::Created { nodes } => self.emit(SeedEvent::LargeTreeCreated {
                path: self.config.large_tree_path.clone(),
                nodes,
            }),
        }

        let permissions_applied = self.apply_site_permissions(ctx)?;

        self.emit(SeedEvent::Finished);
        Ok(SeedOutcome::Seeded(SeedReport {
            import,
            large_tree,
            permissions_applied,
        }))
    }

    fn import(&self, ctx: &SeedContext) -> Result<ImportResult, SeedError> {
        let source = BundledResource::resolve(&self.config.bundle_dir, &self.config.import_resource);
        let params = ImportParams::new(source, self.config.import_target.clone())
            .include_node_ids(true)
            .dry_run(false);

        let result = self.importer.import_nodes(ctx, &params)?;
        log_import(&result);

        self.emit(SeedEvent::Imported {
            nodes: result.added_nodes.len(),
            binaries: result.binaries.len(),
            errors: result.errors.len(),
        });
        Ok(result)
    }

    /// Reset the site's permissions and push them to its descendants.
    ///
    /// Returns `false` when there is no site to update.
    fn apply_site_permissions(&self, ctx: &SeedContext) -> Result<bool, SeedError> {
        let site_path = &self.config.site_path;
        let Some(site) = self.store.get_by_path(ctx, site_path)? else {
            debug!(path = %site_path, "no site content, skipping permissions");
            return Ok(false);
        };

        let updated = self
            .store
            .update(ctx, site.with_permissions(&self.config.permissions))?;
        self.store.apply_permissions(ctx, &updated.id)?;

        info!(path = %site_path, "applied site permissions");
        self.emit(SeedEvent::PermissionsApplied {
            path: site_path.clone(),
        });
        Ok(true)
    }

    fn emit(&self, event: SeedEvent) {
        // No subscriber is fine.
        let _ = self.events.send(event);
    }
}
