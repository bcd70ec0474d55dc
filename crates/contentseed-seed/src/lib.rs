//! Idempotent demo-content seeding.
//!
//! [`Seeder::activate`] runs once on node startup. On the cluster master, and
//! only while the site path is empty, it imports a bundled content tree,
//! generates a large synthetic folder tree and applies a fixed permission set
//! to the site.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use contentseed_core::{ElevatingContextFactory, SeedConfig};
//! use contentseed_import::DirectoryImporter;
//! use contentseed_seed::{SeedOutcome, Seeder};
//! use contentseed_store::{MemoryContentStore, RoleFlag};
//!
//! let store = Arc::new(MemoryContentStore::new());
//! let seeder = Seeder::new(
//!     RoleFlag::master(),
//!     ElevatingContextFactory::new(),
//!     Arc::clone(&store),
//!     DirectoryImporter::new(Arc::clone(&store)),
//!     SeedConfig::default(),
//! );
//!
//! match seeder.activate().unwrap() {
//!     SeedOutcome::Seeded(report) => println!("{} nodes imported", report.import.added_nodes.len()),
//!     other => println!("{other:?}"),
//! }
//! ```

mod error;
mod large_tree;
mod progress;
pub mod report;
mod seeder;

pub use error::SeedError;
pub use large_tree::{generate_large_tree, LargeTreeOutcome};
pub use progress::SeedEvent;
pub use seeder::{SeedOutcome, SeedReport, Seeder};
