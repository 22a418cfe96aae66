//! Service context - dependency container for services
//!
//! Holds all repositories, the blob store, and the settings services need.

use std::sync::Arc;
use std::time::Duration;

use blog_common::AppConfig;
use blog_core::traits::{
    AttachmentRepository, BlobStore, CommentRepository, PostRepository, PurgeRepository,
    ReactionRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Tunables read once at startup
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: u64,
    /// How long soft-deleted rows are kept before the purge removes them
    pub retention: chrono::Duration,
    /// Time between purge runs
    pub purge_interval: Duration,
    /// Run a purge as soon as the scheduler starts instead of one interval later
    pub purge_on_startup: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            retention: chrono::Duration::days(30),
            purge_interval: Duration::from_secs(7 * 24 * 60 * 60),
            purge_on_startup: false,
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_upload_bytes: config.storage.max_file_size_bytes(),
            retention: config.retention.retention(),
            purge_interval: config.retention.purge_interval(),
            purge_on_startup: config.retention.run_on_startup,
        }
    }
}

/// Service context containing all dependencies
///
/// Cheap to clone: every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    post_repo: Arc<dyn PostRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    attachment_repo: Arc<dyn AttachmentRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    purge_repo: Arc<dyn PurgeRepository>,

    // Object storage
    blob_store: Arc<dyn BlobStore>,

    settings: ServiceSettings,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the post repository
    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    /// Get the comment repository
    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    /// Get the attachment repository
    pub fn attachment_repo(&self) -> &dyn AttachmentRepository {
        self.attachment_repo.as_ref()
    }

    /// Get the reaction repository
    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    /// Get the purge repository
    pub fn purge_repo(&self) -> &dyn PurgeRepository {
        self.purge_repo.as_ref()
    }

    // === Object Storage ===

    /// Get the blob store
    pub fn blob_store(&self) -> &dyn BlobStore {
        self.blob_store.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("blob_store", &"dyn BlobStore")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    post_repo: Option<Arc<dyn PostRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    attachment_repo: Option<Arc<dyn AttachmentRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    purge_repo: Option<Arc<dyn PurgeRepository>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    settings: ServiceSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn attachment_repo(mut self, repo: Arc<dyn AttachmentRepository>) -> Self {
        self.attachment_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn purge_repo(mut self, repo: Arc<dyn PurgeRepository>) -> Self {
        self.purge_repo = Some(repo);
        self
    }

    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            post_repo: required(self.post_repo, "post_repo")?,
            comment_repo: required(self.comment_repo, "comment_repo")?,
            attachment_repo: required(self.attachment_repo, "attachment_repo")?,
            reaction_repo: required(self.reaction_repo, "reaction_repo")?,
            purge_repo: required(self.purge_repo, "purge_repo")?,
            blob_store: required(self.blob_store, "blob_store")?,
            settings: self.settings,
        })
    }
}

fn required<T>(dependency: Option<T>, name: &str) -> ServiceResult<T> {
    dependency.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
}
