//! Cluster role providers.

use std::sync::atomic::{AtomicBool, Ordering};

use contentseed_core::ClusterRoleProvider;

/// Role flag that can be flipped at runtime, e.g. by a membership listener.
#[derive(Debug)]
pub struct RoleFlag {
    master: AtomicBool,
}

impl RoleFlag {
    /// A node that is the cluster master.
    pub fn master() -> Self {
        Self::new(true)
    }

    /// A node that is not the cluster master.
    pub fn replica() -> Self {
        Self::new(false)
    }

    /// Create a role flag.
    pub fn new(master: bool) -> Self {
        Self {
            master: AtomicBool::new(master),
        }
    }

    /// Change the reported role.
    pub fn set_master(&self, master: bool) {
        self.master.store(master, Ordering::SeqCst);
    }
}

impl ClusterRoleProvider for RoleFlag {
    fn is_master(&self) -> bool {
        self.master.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_flag() {
        let role = RoleFlag::replica();
        assert!(!role.is_master());
        role.set_master(true);
        assert!(role.is_master());
        assert!(RoleFlag::master().is_master());
    }
}
