//! Content nodes and creation parameters.

use std::fmt;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::acl::{AccessControlList, PrincipalKey};
use crate::error::PathError;
use crate::path::ContentPath;

/// Unique identifier of a content node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub CompactString);

impl ContentId {
    /// Create a new id from a string.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Qualified content type, e.g. `base:folder`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTypeName(pub CompactString);

impl ContentTypeName {
    /// Create a type name from a string.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self(name.into())
    }

    /// The built-in folder type.
    pub fn folder() -> Self {
        Self::new("base:folder")
    }

    /// Get the type name as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check if this is the folder type.
    pub fn is_folder(&self) -> bool {
        self.0 == "base:folder"
    }
}

impl Default for ContentTypeName {
    fn default() -> Self {
        Self::folder()
    }
}

impl fmt::Display for ContentTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored content node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Unique identifier.
    pub id: ContentId,

    /// Node name (last path segment).
    pub name: CompactString,

    /// Human-readable title.
    pub display_name: String,

    /// Full path of the node.
    pub path: ContentPath,

    /// Content type.
    #[serde(rename = "type")]
    pub content_type: ContentTypeName,

    /// Content payload.
    pub data: Map<String, Value>,

    /// Explicit access-control list.
    pub permissions: AccessControlList,

    /// Whether permissions are taken from the parent.
    pub inherit_permissions: bool,

    /// Owner of the node.
    pub owner: PrincipalKey,

    /// User that created the node.
    pub creator: PrincipalKey,

    /// Creation time.
    pub created_at: DateTime<Utc>,

    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

impl Content {
    /// Copy of this content with `permissions` as its explicit ACL and
    /// inheritance from the parent switched off.
    pub fn with_permissions(&self, permissions: &AccessControlList) -> Content {
        Content {
            permissions: permissions.clone(),
            inherit_permissions: false,
            ..self.clone()
        }
    }

    /// Path of the parent node, `None` for a node at the root.
    pub fn parent_path(&self) -> Option<ContentPath> {
        self.path.parent()
    }
}

/// Parameters for creating a content node.
#[derive(Debug, Clone, Builder, PartialEq)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CreateContent {
    /// Node name, used as the last path segment.
    pub name: String,

    /// Human-readable title (defaults to the name).
    #[builder(default, setter(into, strip_option))]
    pub display_name: Option<String>,

    /// Path of the parent node.
    pub parent: ContentPath,

    /// Content type.
    #[builder(default)]
    pub content_type: ContentTypeName,

    /// Content payload.
    #[builder(default)]
    pub data: Map<String, Value>,

    /// Explicit access-control list.
    #[builder(default)]
    pub permissions: AccessControlList,

    /// Take permissions from the parent at creation time.
    #[builder(default = "true")]
    pub inherit_permissions: bool,

    /// Owner of the node.
    #[builder(default = "PrincipalKey::Anonymous")]
    pub owner: PrincipalKey,

    /// Preassigned id; the store generates one when absent.
    #[builder(default, setter(into, strip_option))]
    pub id: Option<ContentId>,
}

impl CreateContentBuilder {
    fn validate(&self) -> Result<(), String> {
        match (&self.name, &self.parent) {
            (Some(name), Some(parent)) => parent
                .join(name)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            (None, _) => Err("Content name is required".to_string()),
            (_, None) => Err("Parent path is required".to_string()),
        }
    }
}

impl CreateContent {
    /// Create a new builder.
    pub fn builder() -> CreateContentBuilder {
        CreateContentBuilder::default()
    }

    /// Full path the node will be created at.
    pub fn path(&self) -> Result<ContentPath, PathError> {
        self.parent.join(&self.name)
    }

    /// Display name, falling back to the node name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Parameters for one folder node.
///
/// Folders carry an empty payload, are owned by the anonymous user and have
/// the type `base:folder`.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderSpec {
    pub name: String,
    pub display_name: String,
    pub parent: ContentPath,
    pub permissions: AccessControlList,
    pub inherit_permissions: bool,
}

impl FolderSpec {
    /// A folder inheriting its permissions from `parent`.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, parent: ContentPath) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            parent,
            permissions: AccessControlList::empty(),
            inherit_permissions: true,
        }
    }

    /// Use `permissions` as an explicit list and stop inheriting.
    pub fn with_permissions(mut self, permissions: AccessControlList) -> Self {
        self.permissions = permissions;
        self.inherit_permissions = false;
        self
    }

    /// Path the folder will be created at.
    pub fn path(&self) -> Result<ContentPath, PathError> {
        self.parent.join(&self.name)
    }
}

impl From<FolderSpec> for CreateContent {
    fn from(spec: FolderSpec) -> Self {
        CreateContent {
            name: spec.name,
            display_name: Some(spec.display_name),
            parent: spec.parent,
            content_type: ContentTypeName::folder(),
            data: Map::new(),
            permissions: spec.permissions,
            inherit_permissions: spec.inherit_permissions,
            owner: PrincipalKey::Anonymous,
            id: None,
        }
    }
}
