//! Bundled file-tree importer for contentseed.
//!
//! [`DirectoryImporter`] reads a directory shipped alongside the seeder and
//! creates one content node per sub-directory. See [`bundle`] for the layout.
//!
//! # Example
//!
//! ```rust,no_run
//! use contentseed_core::{
//!     BundledResource, ContentPath, ContextFactory, ElevatingContextFactory, ImportParams,
//!     Importer, SeedConfig,
//! };
//! use contentseed_import::DirectoryImporter;
//! use contentseed_store::MemoryContentStore;
//!
//! let config = SeedConfig::default();
//! let ctx = ElevatingContextFactory::new()
//!     .build(config.context_request())
//!     .unwrap();
//!
//! let importer = DirectoryImporter::new(MemoryContentStore::new());
//! let source = BundledResource::resolve("bundle", "import");
//! let result = importer
//!     .import_nodes(&ctx, &ImportParams::new(source, ContentPath::root()))
//!     .unwrap();
//!
//! println!("Imported {} nodes", result.added_nodes.len());
//! ```

pub mod bundle;
mod importer;

pub use bundle::NodeMetadata;
pub use importer::DirectoryImporter;

// Re-export core types for convenience
pub use contentseed_core::{
    BundledResource, ImportError, ImportFailure, ImportParams, ImportResult, Importer,
};
