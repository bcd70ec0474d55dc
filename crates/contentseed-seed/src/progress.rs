//! Seeding progress events.

use contentseed_core::ContentPath;

/// Milestones published while a seeder runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedEvent {
    /// This node is not the cluster master; nothing was done.
    NotMaster,
    /// The site already exists; nothing was done.
    AlreadySeeded { path: ContentPath },
    /// The bundled tree was imported.
    Imported {
        nodes: usize,
        binaries: usize,
        errors: usize,
    },
    /// The large tree already existed.
    LargeTreeSkipped { path: ContentPath },
    /// The large tree was generated.
    LargeTreeCreated { path: ContentPath, nodes: u64 },
    /// Permissions were set on the site and pushed to its descendants.
    PermissionsApplied { path: ContentPath },
    /// The seeding run completed.
    Finished,
}

impl SeedEvent {
    /// Check if this event ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SeedEvent::NotMaster | SeedEvent::AlreadySeeded { .. } | SeedEvent::Finished
        )
    }
}
