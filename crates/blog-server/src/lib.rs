//! # blog-server
//!
//! Wires the PostgreSQL repositories and the S3 blob store into a
//! [`ServiceContext`] and runs the retention scheduler until shutdown.

use std::path::Path;
use std::sync::Arc;

use blog_common::{AppConfig, AppError};
use blog_db::{
    create_pool, run_migrations, DatabaseConfig, PgAttachmentRepository, PgCommentRepository,
    PgPostRepository, PgPurgeRepository, PgReactionRepository,
};
use blog_service::{RetentionService, ServiceContext, ServiceSettings};
use blog_storage::S3BlobStore;
use tokio::sync::watch;
use tracing::{info, warn};

/// Schema directory, relative to the working directory
const MIGRATIONS_DIR: &str = "migrations";

/// Connect every adapter and build the service context
pub async fn create_service_context(config: &AppConfig) -> Result<ServiceContext, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    run_migrations(&pool, Path::new(MIGRATIONS_DIR))
        .await
        .map_err(|e| AppError::Database(format!("Migrations failed: {e}")))?;
    info!("Migrations applied");

    info!(
        endpoint = %config.storage.endpoint,
        bucket = %config.storage.bucket,
        "Connecting to object storage..."
    );
    let blob_store = S3BlobStore::connect(&config.storage)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    info!("Object storage ready");

    ServiceContext::builder()
        .post_repo(Arc::new(PgPostRepository::new(pool.clone())))
        .comment_repo(Arc::new(PgCommentRepository::new(pool.clone())))
        .attachment_repo(Arc::new(PgAttachmentRepository::new(pool.clone())))
        .reaction_repo(Arc::new(PgReactionRepository::new(pool.clone())))
        .purge_repo(Arc::new(PgPurgeRepository::new(pool)))
        .blob_store(Arc::new(blob_store))
        .settings(ServiceSettings::from_config(config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))
}

/// Run until Ctrl-C, then stop the scheduler and wait for it
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let ctx = create_service_context(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = RetentionService::spawn(ctx, shutdown_rx);

    tokio::signal::ctrl_c()
        .await
        .map_err(AppError::internal)?;
    info!("Shutdown signal received");

    // The scheduler also stops if every receiver is gone
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler.await {
        warn!(error = %e, "Retention scheduler ended abnormally");
    }

    Ok(())
}
