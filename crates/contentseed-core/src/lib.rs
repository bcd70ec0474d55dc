//! Core types and traits for contentseed.
//!
//! This crate provides the content model (paths, nodes, access-control lists),
//! explicit execution contexts, seeding configuration, and the collaborator
//! traits the seeder drives: [`ClusterRoleProvider`], [`ContentStore`] and
//! [`Importer`].

mod acl;
mod config;
mod content;
mod context;
mod error;
mod import;
mod path;
mod traits;

pub use acl::{AccessControlEntry, AccessControlList, Permission, PrincipalKey};
pub use config::{SeedConfig, SeedConfigBuilder};
pub use content::{
    Content, ContentId, ContentTypeName, CreateContent, CreateContentBuilder, FolderSpec,
};
pub use context::{
    AuthInfo, Branch, ContextFactory, ContextRequest, ElevatingContextFactory, RepositoryId,
    SeedContext,
};
pub use error::{ConfigError, ContextError, ImportError, PathError, StoreError};
pub use import::{BundledResource, ImportFailure, ImportParams, ImportResult};
pub use path::ContentPath;
pub use traits::{ClusterRoleProvider, ContentStore, Importer};
