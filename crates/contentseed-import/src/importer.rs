//! Directory-tree importer.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use serde_json::Value;
use tracing::debug;

use contentseed_core::{
    ContentId, ContentPath, ContentStore, ContentTypeName, CreateContent, ImportError,
    ImportFailure, ImportParams, ImportResult, Importer, SeedContext, StoreError,
};

use crate::bundle::{self, NodeMetadata, ATTACHMENTS_KEY};

/// Imports a bundled directory tree into a [`ContentStore`].
///
/// Entries are visited in sorted depth-first order, so every parent is created
/// before its children. A node that cannot be imported is recorded as an
/// [`ImportFailure`] and its whole subtree is skipped; the rest of the tree is
/// still imported.
#[derive(Debug)]
pub struct DirectoryImporter<S> {
    store: S,
}

impl<S: ContentStore> DirectoryImporter<S> {
    /// Create an importer writing to `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The store this importer writes to.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn check_source(&self, root: &Path) -> Result<(), ImportError> {
        let metadata = fs::metadata(root).map_err(|e| ImportError::io(root, e))?;
        if !metadata.is_dir() {
            return Err(ImportError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        Ok(())
    }

    fn check_target(&self, ctx: &SeedContext, target: &ContentPath) -> Result<(), ImportError> {
        if target.is_root() || self.store.get_by_path(ctx, target)?.is_some() {
            return Ok(());
        }
        Err(StoreError::ParentNotFound {
            path: target.clone(),
        }
        .into())
    }

    /// Import a single node directory.
    ///
    /// Returns the binaries attached to the node. Binaries that cannot be
    /// attached are pushed onto `errors` without failing the node.
    fn import_node(
        &self,
        ctx: &SeedContext,
        params: &ImportParams,
        node_dir: &Path,
        node_path: &ContentPath,
        errors: &mut Vec<ImportFailure>,
    ) -> Result<Vec<String>, ImportFailure> {
        let (parent, name) = match (node_path.parent(), node_path.name()) {
            (Some(parent), Some(name)) => (parent, name.to_string()),
            _ => {
                return Err(ImportFailure::new(
                    format!("Cannot import a node at {node_path}"),
                    None,
                ));
            }
        };

        let metadata = read_metadata(node_dir, node_path)?;
        let binaries = read_binaries(node_dir, node_path, errors)?;

        let mut data = metadata.data_json().map_err(|e| {
            ImportFailure::caused_by(format!("Invalid data for node {node_path}"), &e)
        })?;
        if !binaries.is_empty() {
            data.insert(
                ATTACHMENTS_KEY.to_string(),
                Value::Array(binaries.iter().cloned().map(Value::String).collect()),
            );
        }

        let create = CreateContent {
            display_name: Some(metadata.display_name.unwrap_or_else(|| name.clone())),
            name,
            parent,
            content_type: metadata
                .content_type
                .map(ContentTypeName::new)
                .unwrap_or_default(),
            data,
            permissions: Default::default(),
            inherit_permissions: metadata.inherit_permissions.unwrap_or(true),
            owner: ctx.auth.user.clone(),
            id: metadata
                .id
                .filter(|_| params.include_node_ids)
                .map(ContentId::new),
        };

        if !params.dry_run {
            self.store.create(ctx, create).map_err(|e| {
                ImportFailure::caused_by(format!("Could not import node {node_path}"), &e)
            })?;
        }

        debug!(path = %node_path, dry_run = params.dry_run, "imported node");
        Ok(binaries
            .into_iter()
            .map(|file| format!("{node_path}/{file}"))
            .collect())
    }
}

impl<S: ContentStore> Importer for DirectoryImporter<S> {
    fn import_nodes(
        &self,
        ctx: &SeedContext,
        params: &ImportParams,
    ) -> Result<ImportResult, ImportError> {
        let root = params.source.root();
        self.check_source(root)?;
        self.check_target(ctx, &params.target)?;

        let mut result = ImportResult {
            dry_run: params.dry_run,
            ..ImportResult::default()
        };
        // Bundle-relative directories whose subtree is skipped.
        let mut skipped: Vec<PathBuf> = Vec::new();

        let walker = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(true)
            .follow_links(false)
            .min_depth(1);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    result
                        .errors
                        .push(ImportFailure::caused_by("Failed to read bundle entry", &err));
                    continue;
                }
            };

            let path = entry.path();
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            if bundle::is_metadata(relative) || skipped.iter().any(|s| relative.starts_with(s)) {
                continue;
            }

            let node_path = match node_path_for(&params.target, relative) {
                Ok(p) => p,
                Err(failure) => {
                    result.errors.push(failure);
                    skipped.push(relative.to_path_buf());
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_file() {
                result.errors.push(ImportFailure::new(
                    format!("Unexpected file {node_path}"),
                    Some("files must live in a node's _/bin directory".to_string()),
                ));
                continue;
            }
            if !file_type.is_dir() {
                continue;
            }

            match self.import_node(ctx, params, &path, &node_path, &mut result.errors) {
                Ok(binaries) => {
                    result.added_nodes.push(node_path);
                    result.binaries.extend(binaries);
                }
                Err(failure) => {
                    result.errors.push(failure);
                    skipped.push(relative.to_path_buf());
                }
            }
        }

        Ok(result)
    }
}

/// Map a bundle-relative directory onto a content path below `target`.
fn node_path_for(target: &ContentPath, relative: &Path) -> Result<ContentPath, ImportFailure> {
    let mut node_path = target.clone();
    for component in relative.components() {
        let Some(segment) = component.as_os_str().to_str() else {
            return Err(ImportFailure::new(
                format!("Non UTF-8 name in bundle: {}", relative.display()),
                None,
            ));
        };
        node_path = node_path.join(segment).map_err(|e| {
            ImportFailure::caused_by(format!("Invalid node name {}", relative.display()), &e)
        })?;
    }
    Ok(node_path)
}

fn read_metadata(node_dir: &Path, node_path: &ContentPath) -> Result<NodeMetadata, ImportFailure> {
    let file = bundle::node_file(node_dir);
    let raw = match fs::read_to_string(&file) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(NodeMetadata::default()),
        Err(e) => {
            return Err(ImportFailure::caused_by(
                format!("Could not read metadata of node {node_path}"),
                &e,
            ));
        }
    };
    NodeMetadata::parse(&raw).map_err(|e| {
        ImportFailure::caused_by(format!("Invalid metadata for node {node_path}"), &e)
    })
}

/// File names in the node's binary directory, sorted.
///
/// Names that are not valid UTF-8 are left out and reported in `errors`.
fn read_binaries(
    node_dir: &Path,
    node_path: &ContentPath,
    errors: &mut Vec<ImportFailure>,
) -> Result<Vec<String>, ImportFailure> {
    let dir = bundle::bin_dir(node_dir);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(ImportFailure::caused_by(
                format!("Could not list binaries of node {node_path}"),
                &e,
            ));
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            ImportFailure::caused_by(format!("Could not list binaries of node {node_path}"), &e)
        })?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => errors.push(ImportFailure::new(
                format!("Non UTF-8 binary name in node {node_path}: {}", raw.to_string_lossy()),
                None,
            )),
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use contentseed_core::{BundledResource, ContextFactory, ElevatingContextFactory, SeedConfig};
    use contentseed_store::MemoryContentStore;
    use tempfile::TempDir;

    fn create_bundle() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("import");
        fs::create_dir_all(root.join("site/_/bin")).unwrap();
        fs::create_dir_all(root.join("site/about")).unwrap();
        fs::write(
            root.join("site/_/node.toml"),
            "id = \"site-id\"\ndisplay_name = \"Site\"\ntype = \"portal:site\"\n",
        )
        .unwrap();
        fs::write(root.join("site/_/bin/logo.png"), [0u8; 8]).unwrap();
        temp
    }

    fn ctx() -> SeedContext {
        ElevatingContextFactory::new()
            .build(SeedConfig::default().context_request())
            .unwrap()
    }

    #[test]
    fn test_import_tree() {
        let temp = create_bundle();
        let store = Arc::new(MemoryContentStore::new());
        let importer = DirectoryImporter::new(Arc::clone(&store));
        let params = ImportParams::new(
            BundledResource::resolve(temp.path(), "import"),
            ContentPath::root(),
        );

        let result = importer.import_nodes(&ctx(), &params).unwrap();

        let added: Vec<_> = result.added_nodes.iter().map(|p| p.to_string()).collect();
        assert_eq!(added, vec!["/site", "/site/about"]);
        assert_eq!(result.binaries, vec!["/site/logo.png"]);
        assert!(result.errors.is_empty());

        let site = store
            .get_by_path(&ctx(), &ContentPath::parse("/site").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(site.id.as_str(), "site-id");
        assert_eq!(site.display_name, "Site");
        assert_eq!(site.content_type.as_str(), "portal:site");
        assert_eq!(site.data[ATTACHMENTS_KEY][0], "logo.png");
    }

    #[test]
    fn test_ids_generated_when_not_included() {
        let temp = create_bundle();
        let store = Arc::new(MemoryContentStore::new());
        let importer = DirectoryImporter::new(Arc::clone(&store));
        let params = ImportParams::new(
            BundledResource::resolve(temp.path(), "import"),
            ContentPath::root(),
        )
        .include_node_ids(false);

        importer.import_nodes(&ctx(), &params).unwrap();
        let site = store
            .get_by_path(&ctx(), &ContentPath::parse("/site").unwrap())
            .unwrap()
            .unwrap();
        assert_ne!(site.id.as_str(), "site-id");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_binary_name_is_reported() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = create_bundle();
        let bin = temp.path().join("import/site/_/bin");
        fs::write(bin.join(OsStr::from_bytes(b"bad\xff.png")), [0u8; 4]).unwrap();

        let store = Arc::new(MemoryContentStore::new());
        let importer = DirectoryImporter::new(Arc::clone(&store));
        let params = ImportParams::new(
            BundledResource::resolve(temp.path(), "import"),
            ContentPath::root(),
        );

        let result = importer.import_nodes(&ctx(), &params).unwrap();

        assert_eq!(result.binaries, vec!["/site/logo.png"]);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.starts_with("Non UTF-8 binary name in node /site"));
        assert_eq!(result.added_nodes.len(), 2);

        let site = store
            .get_by_path(&ctx(), &ContentPath::parse("/site").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(site.data[ATTACHMENTS_KEY].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_node_path_for() {
        let target = ContentPath::parse("/content").unwrap();
        let path = node_path_for(&target, Path::new("a/b")).unwrap();
        assert_eq!(path.to_string(), "/content/a/b");
    }
}
