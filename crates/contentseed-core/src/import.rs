//! Import request and result types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::path::ContentPath;

/// A read-only file tree shipped alongside the seeder, resolved by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundledResource {
    name: String,
    root: PathBuf,
}

impl BundledResource {
    /// Resolve the resource `name` below `bundle_dir`.
    ///
    /// Resolution does not touch the file system; a missing resource surfaces
    /// when the importer reads it.
    pub fn resolve(bundle_dir: impl AsRef<Path>, name: &str) -> Self {
        let trimmed = name.trim_matches('/');
        Self {
            name: trimmed.to_string(),
            root: bundle_dir.as_ref().join(trimmed),
        }
    }

    /// Logical name of the resource.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the resource.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Parameters for a bulk node import.
#[derive(Debug, Clone)]
pub struct ImportParams {
    /// Tree to import.
    pub source: BundledResource,
    /// Node the imported tree is attached below.
    pub target: ContentPath,
    /// Keep node ids declared in the source instead of generating new ones.
    pub include_node_ids: bool,
    /// Compute the result without writing anything.
    pub dry_run: bool,
}

impl ImportParams {
    /// Import `source` below `target`, keeping node ids, for real.
    pub fn new(source: BundledResource, target: ContentPath) -> Self {
        Self {
            source,
            target,
            include_node_ids: true,
            dry_run: false,
        }
    }

    /// Toggle dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Toggle keeping source node ids.
    pub fn include_node_ids(mut self, include: bool) -> Self {
        self.include_node_ids = include;
        self
    }
}

/// A non-fatal problem with one node of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// What went wrong.
    pub message: String,
    /// Underlying cause, if any.
    pub cause: Option<String>,
}

impl ImportFailure {
    /// Create a failure with an optional cause.
    pub fn new(message: impl Into<String>, cause: Option<String>) -> Self {
        Self {
            message: message.into(),
            cause,
        }
    }

    /// Create a failure caused by an error.
    pub fn caused_by(message: impl Into<String>, cause: &dyn std::error::Error) -> Self {
        Self::new(message, Some(cause.to_string()))
    }
}

impl fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {cause}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Paths of the nodes added, in creation order.
    pub added_nodes: Vec<ContentPath>,
    /// Binaries copied, as `<node-path>/<file-name>`.
    pub binaries: Vec<String>,
    /// Per-node problems; the import continued past each of them.
    pub errors: Vec<ImportFailure>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl ImportResult {
    /// Check if any per-node problem was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
