//! Principals, permissions and access-control lists.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity a permission can be granted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrincipalKey {
    /// The unauthenticated user.
    Anonymous,
    /// A role, e.g. `system.everyone`.
    Role(String),
    /// A user in an id-provider store.
    User { store: String, name: String },
}

const EVERYONE: &str = "system.everyone";
const AUTHENTICATED: &str = "system.authenticated";
const CONTENT_MANAGER_ADMIN: &str = "cms.admin";
const SYSTEM_ADMIN: &str = "system.admin";

impl PrincipalKey {
    /// Role held by every principal.
    pub fn everyone() -> Self {
        Self::Role(EVERYONE.to_string())
    }

    /// Role held by every logged-in user.
    pub fn authenticated() -> Self {
        Self::Role(AUTHENTICATED.to_string())
    }

    /// Content-manager administrator role.
    pub fn content_manager_admin() -> Self {
        Self::Role(CONTENT_MANAGER_ADMIN.to_string())
    }

    /// System administrator role.
    pub fn system_admin() -> Self {
        Self::Role(SYSTEM_ADMIN.to_string())
    }

    /// Check if this principal bypasses access-control checks.
    pub fn is_administrator(&self) -> bool {
        matches!(self, Self::Role(name) if name == CONTENT_MANAGER_ADMIN || name == SYSTEM_ADMIN)
    }
}

impl fmt::Display for PrincipalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("user:system:anonymous"),
            Self::Role(name) => write!(f, "role:{name}"),
            Self::User { store, name } => write!(f, "user:{store}:{name}"),
        }
    }
}

impl FromStr for PrincipalKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "user:system:anonymous" || s == "anonymous" {
            return Ok(Self::Anonymous);
        }
        if let Some(name) = s.strip_prefix("role:") {
            if name.is_empty() {
                return Err(format!("Empty role name in principal key: {s}"));
            }
            return Ok(Self::Role(name.to_string()));
        }
        if let Some(rest) = s.strip_prefix("user:") {
            if let Some((store, name)) = rest.split_once(':') {
                if !store.is_empty() && !name.is_empty() {
                    return Ok(Self::User {
                        store: store.to_string(),
                        name: name.to_string(),
                    });
                }
            }
        }
        Err(format!("Invalid principal key: {s}"))
    }
}

impl TryFrom<String> for PrincipalKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrincipalKey> for String {
    fn from(key: PrincipalKey) -> Self {
        key.to_string()
    }
}

/// A single grantable permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Read,
    Create,
    Modify,
    Delete,
    Publish,
    ReadPermissions,
    WritePermissions,
}

impl Permission {
    /// Every permission, in display order.
    pub const ALL: [Permission; 7] = [
        Permission::Read,
        Permission::Create,
        Permission::Modify,
        Permission::Delete,
        Permission::Publish,
        Permission::ReadPermissions,
        Permission::WritePermissions,
    ];

    /// Upper-case name of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Create => "CREATE",
            Self::Modify => "MODIFY",
            Self::Delete => "DELETE",
            Self::Publish => "PUBLISH",
            Self::ReadPermissions => "READ_PERMISSIONS",
            Self::WritePermissions => "WRITE_PERMISSIONS",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (principal, allowed permissions) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlEntry {
    /// Principal the entry applies to.
    pub principal: PrincipalKey,
    /// Permissions granted to the principal.
    pub allow: BTreeSet<Permission>,
}

impl AccessControlEntry {
    /// Grant the given permissions.
    pub fn allow(principal: PrincipalKey, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            principal,
            allow: permissions.into_iter().collect(),
        }
    }

    /// Grant every permission.
    pub fn allow_all(principal: PrincipalKey) -> Self {
        Self::allow(principal, Permission::ALL)
    }

    /// Check if the entry grants a permission.
    pub fn is_allowed(&self, permission: Permission) -> bool {
        self.allow.contains(&permission)
    }
}

/// Ordered list of access-control entries, at most one per principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessControlList {
    entries: Vec<AccessControlEntry>,
}

impl AccessControlList {
    /// Create an empty list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a list from entries. A later entry for the same principal replaces
    /// an earlier one.
    pub fn of(entries: impl IntoIterator<Item = AccessControlEntry>) -> Self {
        let mut acl = Self::empty();
        for entry in entries {
            acl.set(entry);
        }
        acl
    }

    /// The four-entry permission set applied to the seeded content.
    ///
    /// Anonymous and everyone may read; authenticated users and content
    /// administrators get full access.
    pub fn demo_defaults() -> Self {
        Self::of([
            AccessControlEntry::allow(PrincipalKey::Anonymous, [Permission::Read]),
            AccessControlEntry::allow(PrincipalKey::everyone(), [Permission::Read]),
            AccessControlEntry::allow_all(PrincipalKey::authenticated()),
            AccessControlEntry::allow_all(PrincipalKey::content_manager_admin()),
        ])
    }

    /// Insert or replace the entry for a principal.
    pub fn set(&mut self, entry: AccessControlEntry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.principal == entry.principal)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Look up the entry for a principal.
    pub fn get(&self, principal: &PrincipalKey) -> Option<&AccessControlEntry> {
        self.entries.iter().find(|e| &e.principal == principal)
    }

    /// Check whether any of `principals` is granted `permission`.
    pub fn is_allowed(&self, principals: &[PrincipalKey], permission: Permission) -> bool {
        principals.iter().any(|principal| {
            self.get(principal)
                .is_some_and(|entry| entry.is_allowed(permission))
        })
    }

    /// Iterate over the entries in order.
    pub fn entries(&self) -> impl Iterator<Item = &AccessControlEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_defaults() {
        let acl = AccessControlList::demo_defaults();
        assert_eq!(acl.len(), 4);
        assert!(acl.is_allowed(&[PrincipalKey::Anonymous], Permission::Read));
        assert!(!acl.is_allowed(&[PrincipalKey::Anonymous], Permission::Modify));
        assert!(acl.is_allowed(&[PrincipalKey::everyone()], Permission::Read));
        assert!(acl.is_allowed(&[PrincipalKey::authenticated()], Permission::WritePermissions));
        assert!(acl.is_allowed(&[PrincipalKey::content_manager_admin()], Permission::Delete));
    }

    #[test]
    fn test_set_replaces_entry() {
        let mut acl = AccessControlList::of([AccessControlEntry::allow(
            PrincipalKey::everyone(),
            [Permission::Read],
        )]);
        acl.set(AccessControlEntry::allow_all(PrincipalKey::everyone()));
        assert_eq!(acl.len(), 1);
        assert!(acl.is_allowed(&[PrincipalKey::everyone()], Permission::Publish));
    }

    #[test]
    fn test_principal_key_round_trip() {
        for raw in ["user:system:anonymous", "role:cms.admin", "user:ldap:alice"] {
            let key: PrincipalKey = raw.parse().unwrap();
            assert_eq!(key.to_string(), raw);
        }
        assert!("group:x".parse::<PrincipalKey>().is_err());
        assert!("role:".parse::<PrincipalKey>().is_err());
    }

    #[test]
    fn test_administrators() {
        assert!(PrincipalKey::content_manager_admin().is_administrator());
        assert!(PrincipalKey::system_admin().is_administrator());
        assert!(!PrincipalKey::authenticated().is_administrator());
        assert!(!PrincipalKey::Anonymous.is_administrator());
    }
}
