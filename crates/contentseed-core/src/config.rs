//! Seeding configuration.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::acl::{AccessControlList, PrincipalKey};
use crate::context::{Branch, ContextRequest, RepositoryId};
use crate::error::ConfigError;
use crate::path::ContentPath;

/// Everything the seeder needs to know, passed in explicitly.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct SeedConfig {
    /// Path whose presence marks the demo content as already seeded.
    #[builder(default = "default_site_path()")]
    pub site_path: ContentPath,

    /// Directory holding bundled resources.
    #[builder(default = "PathBuf::from(\"bundle\")")]
    pub bundle_dir: PathBuf,

    /// Name of the bundled tree to import.
    #[builder(default = "\"import\".to_string()")]
    pub import_resource: String,

    /// Node the bundled tree is imported below.
    #[builder(default = "ContentPath::root()")]
    pub import_target: ContentPath,

    /// Root of the generated large tree.
    #[builder(default = "default_large_tree_path()")]
    pub large_tree_path: ContentPath,

    /// Display name of the large-tree root.
    #[builder(default = "\"Large tree\".to_string()")]
    pub large_tree_display_name: String,

    /// Number of children below the large-tree root.
    #[builder(default = "2")]
    pub large_tree_children: u32,

    /// Number of grandchildren below each child.
    #[builder(default = "100")]
    pub large_tree_grandchildren: u32,

    /// Principals the seeding context is elevated to.
    #[builder(default = "vec![PrincipalKey::content_manager_admin()]")]
    pub principals: Vec<PrincipalKey>,

    /// User identity of the seeding context.
    #[builder(default = "PrincipalKey::Anonymous")]
    pub user: PrincipalKey,

    /// Branch the seeding writes to.
    #[builder(default = "Branch::draft()")]
    pub branch: Branch,

    /// Repository the seeding writes to.
    #[builder(default = "RepositoryId::content()")]
    pub repository: RepositoryId,

    /// Access-control list applied to the seeded roots.
    #[builder(default = "AccessControlList::demo_defaults()")]
    pub permissions: AccessControlList,
}

fn default_site_path() -> ContentPath {
    ContentPath::root()
        .join("my-corporation")
        .unwrap_or_else(|_| ContentPath::root())
}

fn default_large_tree_path() -> ContentPath {
    ContentPath::root()
        .join("large-tree")
        .unwrap_or_else(|_| ContentPath::root())
}

impl SeedConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.site_path.as_ref().is_some_and(ContentPath::is_root) {
            return Err("Site path cannot be the root".to_string());
        }
        if self.large_tree_path.as_ref().is_some_and(ContentPath::is_root) {
            return Err("Large tree path cannot be the root".to_string());
        }
        if self.principals.as_ref().is_some_and(Vec::is_empty) {
            return Err("At least one principal is required".to_string());
        }
        if self
            .import_resource
            .as_ref()
            .is_some_and(|name| name.trim_matches('/').is_empty())
        {
            return Err("Import resource name cannot be empty".to_string());
        }
        Ok(())
    }
}

impl SeedConfig {
    /// Create a new config builder.
    pub fn builder() -> SeedConfigBuilder {
        SeedConfigBuilder::default()
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: SeedConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    /// Check invariants that deserialization cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let builder = SeedConfigBuilder {
            site_path: Some(self.site_path.clone()),
            large_tree_path: Some(self.large_tree_path.clone()),
            principals: Some(self.principals.clone()),
            import_resource: Some(self.import_resource.clone()),
            ..SeedConfigBuilder::default()
        };
        builder
            .validate()
            .map_err(|message| ConfigError::Invalid { message })
    }

    /// Context request for the elevated seeding identity.
    pub fn context_request(&self) -> ContextRequest {
        ContextRequest {
            principals: self.principals.clone(),
            user: self.user.clone(),
            branch: self.branch.clone(),
            repository: self.repository.clone(),
        }
    }

    /// Number of nodes a complete large tree holds.
    pub fn large_tree_size(&self) -> u64 {
        let children = u64::from(self.large_tree_children);
        1 + children + children * u64::from(self.large_tree_grandchildren)
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            site_path: default_site_path(),
            bundle_dir: PathBuf::from("bundle"),
            import_resource: "import".to_string(),
            import_target: ContentPath::root(),
            large_tree_path: default_large_tree_path(),
            large_tree_display_name: "Large tree".to_string(),
            large_tree_children: 2,
            large_tree_grandchildren: 100,
            principals: vec![PrincipalKey::content_manager_admin()],
            user: PrincipalKey::Anonymous,
            branch: Branch::draft(),
            repository: RepositoryId::content(),
            permissions: AccessControlList::demo_defaults(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SeedConfig::default();
        assert_eq!(config.site_path.to_string(), "/my-corporation");
        assert_eq!(config.large_tree_path.to_string(), "/large-tree");
        assert_eq!(config.large_tree_size(), 203);
        assert_eq!(config.permissions, AccessControlList::demo_defaults());
        assert_eq!(config, SeedConfig::builder().build().unwrap());
    }

    #[test]
    fn test_builder_overrides() {
        let config = SeedConfig::builder()
            .large_tree_children(3u32)
            .large_tree_grandchildren(5u32)
            .bundle_dir("/opt/demo")
            .build()
            .unwrap();

        assert_eq!(config.large_tree_size(), 1 + 3 + 15);
        assert_eq!(config.bundle_dir, PathBuf::from("/opt/demo"));
    }

    #[test]
    fn test_builder_rejects_root_paths() {
        let result = SeedConfig::builder()
            .large_tree_path(ContentPath::root())
            .build();
        assert!(result.is_err());

        let result = SeedConfig::builder().principals(Vec::new()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let raw = r#"
            site_path = "/demo-site"
            large_tree_children = 4
            principals = ["role:system.admin"]
        "#;
        let config = SeedConfig::from_toml_str(raw, Path::new("seed.toml")).unwrap();

        assert_eq!(config.site_path.to_string(), "/demo-site");
        assert_eq!(config.large_tree_children, 4);
        assert_eq!(config.large_tree_grandchildren, 100);
        assert_eq!(config.principals, vec![PrincipalKey::system_admin()]);
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        let err = SeedConfig::from_toml_str("site_path = \"relative\"", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = SeedConfig::from_toml_str("site_path = \"/\"", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
