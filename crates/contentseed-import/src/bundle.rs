//! On-disk layout of a bundled content tree.
//!
//! ```text
//! import/
//! ├── my-corporation/
//! │   ├── _/
//! │   │   ├── node.toml      optional metadata
//! │   │   └── bin/           binaries attached to the node
//! │   │       └── logo.png
//! │   └── about/             child node
//! └── ...
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

/// Name of the per-node metadata directory.
pub const META_DIR: &str = "_";

/// Metadata file inside [`META_DIR`].
pub const NODE_FILE: &str = "node.toml";

/// Binary directory inside [`META_DIR`].
pub const BIN_DIR: &str = "bin";

/// Data key listing a node's binary attachments.
pub const ATTACHMENTS_KEY: &str = "attachments";

/// Contents of a `node.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NodeMetadata {
    /// Id to keep when ids are included in the import.
    pub id: Option<String>,

    /// Human-readable title.
    pub display_name: Option<String>,

    /// Content type, `base:folder` when absent.
    #[serde(rename = "type")]
    pub content_type: Option<String>,

    /// Whether the node takes its permissions from the parent.
    pub inherit_permissions: Option<bool>,

    /// Payload of the node.
    #[serde(default)]
    pub data: toml::Table,
}

impl NodeMetadata {
    /// Parse a `node.toml` document.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Payload converted to JSON.
    pub fn data_json(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(&self.data)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

/// Location of a node's metadata file.
pub fn node_file(node_dir: &Path) -> PathBuf {
    node_dir.join(META_DIR).join(NODE_FILE)
}

/// Location of a node's binary directory.
pub fn bin_dir(node_dir: &Path) -> PathBuf {
    node_dir.join(META_DIR).join(BIN_DIR)
}

/// Check if a path relative to the bundle root lies inside a metadata
/// directory.
pub fn is_metadata(relative: &Path) -> bool {
    relative.components().any(|c| c.as_os_str() == META_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata() {
        let meta = NodeMetadata::parse(
            r#"
            id = "site-1"
            display_name = "My Corporation"
            type = "portal:site"

            [data]
            description = "Demo site"
            tags = ["demo", "corp"]
            "#,
        )
        .unwrap();

        assert_eq!(meta.id.as_deref(), Some("site-1"));
        assert_eq!(meta.content_type.as_deref(), Some("portal:site"));
        let data = meta.data_json().unwrap();
        assert_eq!(data["description"], "Demo site");
        assert_eq!(data["tags"][1], "corp");
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(NodeMetadata::parse("colour = \"blue\"").is_err());
    }

    #[test]
    fn test_is_metadata() {
        assert!(is_metadata(Path::new("site/_/node.toml")));
        assert!(is_metadata(Path::new("_")));
        assert!(!is_metadata(Path::new("site/about")));
        assert!(!is_metadata(Path::new("site/_private")));
    }
}
