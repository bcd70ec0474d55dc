//! Execution contexts for storage calls.
//!
//! Every storage and import call receives its [`SeedContext`] explicitly; there
//! is no ambient or thread-local context.

use std::collections::BTreeSet;
use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::acl::PrincipalKey;
use crate::error::ContextError;

/// Named storage lineage, e.g. `draft` or `master`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Branch(pub CompactString);

impl Branch {
    /// Create a branch from a name.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self(name.into())
    }

    /// The draft branch, where unpublished content lives.
    pub fn draft() -> Self {
        Self::new("draft")
    }

    /// Get the branch name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a storage repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(pub CompactString);

impl RepositoryId {
    /// Create a repository id.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// The repository holding site content.
    pub fn content() -> Self {
        Self::new("com.enonic.cms.default")
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated identity of a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    /// The acting user.
    pub user: PrincipalKey,
    /// Principals held by the user (always includes the user itself).
    pub principals: Vec<PrincipalKey>,
}

impl AuthInfo {
    /// Check if the identity bypasses access control.
    pub fn is_administrator(&self) -> bool {
        self.principals.iter().any(PrincipalKey::is_administrator)
    }
}

/// Immutable execution context passed to every storage call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedContext {
    pub auth: AuthInfo,
    pub branch: Branch,
    pub repository: RepositoryId,
}

impl SeedContext {
    /// Principals to evaluate permissions against.
    pub fn principals(&self) -> &[PrincipalKey] {
        &self.auth.principals
    }
}

/// What a caller asks a [`ContextFactory`] for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRequest {
    pub principals: Vec<PrincipalKey>,
    pub user: PrincipalKey,
    pub branch: Branch,
    pub repository: RepositoryId,
}

/// Builds execution contexts.
pub trait ContextFactory {
    /// Build a context for the request, or refuse.
    fn build(&self, request: ContextRequest) -> Result<SeedContext, ContextError>;
}

/// Grants any requested principal set.
///
/// Optionally restricted to an allow-list, in which case requests for other
/// principals are refused.
#[derive(Debug, Clone, Default)]
pub struct ElevatingContextFactory {
    allowed: Option<BTreeSet<PrincipalKey>>,
}

impl ElevatingContextFactory {
    /// Factory that grants every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that only grants the listed principals.
    pub fn restricted(allowed: impl IntoIterator<Item = PrincipalKey>) -> Self {
        Self {
            allowed: Some(allowed.into_iter().collect()),
        }
    }
}

impl ContextFactory for ElevatingContextFactory {
    fn build(&self, request: ContextRequest) -> Result<SeedContext, ContextError> {
        if request.principals.is_empty() {
            return Err(ContextError::NoPrincipals);
        }

        if let Some(allowed) = &self.allowed {
            if let Some(denied) = request.principals.iter().find(|p| !allowed.contains(*p)) {
                return Err(ContextError::ElevationRefused {
                    principal: denied.to_string(),
                });
            }
        }

        let mut principals = request.principals;
        if !principals.contains(&request.user) {
            principals.push(request.user.clone());
        }

        Ok(SeedContext {
            auth: AuthInfo {
                user: request.user,
                principals,
            },
            branch: request.branch,
            repository: request.repository,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_request() -> ContextRequest {
        ContextRequest {
            principals: vec![PrincipalKey::content_manager_admin()],
            user: PrincipalKey::Anonymous,
            branch: Branch::draft(),
            repository: RepositoryId::content(),
        }
    }

    #[test]
    fn test_build_elevated_context() {
        let ctx = ElevatingContextFactory::new().build(admin_request()).unwrap();
        assert!(ctx.auth.is_administrator());
        assert_eq!(ctx.auth.user, PrincipalKey::Anonymous);
        assert!(ctx.principals().contains(&PrincipalKey::Anonymous));
        assert_eq!(ctx.branch.as_str(), "draft");
        assert_eq!(ctx.repository.as_str(), "com.enonic.cms.default");
    }

    #[test]
    fn test_restricted_factory_refuses() {
        let factory = ElevatingContextFactory::restricted([PrincipalKey::everyone()]);
        let err = factory.build(admin_request()).unwrap_err();
        assert!(matches!(err, ContextError::ElevationRefused { .. }));
    }

    #[test]
    fn test_empty_principals_refused() {
        let mut request = admin_request();
        request.principals.clear();
        assert!(matches!(
            ElevatingContextFactory::new().build(request),
            Err(ContextError::NoPrincipals)
        ));
    }
}
