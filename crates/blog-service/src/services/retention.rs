//! Retention service
//!
//! Hard deletes rows that were soft-deleted longer ago than the retention
//! period. A run goes through three stages, children before the rows they
//! reference:
//!
//! 1. attachments, concurrently with reactions followed by comments
//! 2. posts
//! 3. categories, roles and users, concurrently
//!
//! Reactions go before comments because deleting a comment cascades into its
//! reactions; purging both at once would lock the same rows from two sides.
//!
//! A failing table is logged and skipped; the rest of the run carries on.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use blog_common::MAX_PURGE_INTERVAL_SECS;
use blog_core::traits::{PurgeTable, RepoResult};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const ATTACHMENTS: &str = "attachments";
const MIN_INTERVAL: Duration = Duration::from_secs(1);
const MAX_INTERVAL: Duration = Duration::from_secs(MAX_PURGE_INTERVAL_SECS);

/// What one purge run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    /// Rows soft-deleted before this instant were eligible
    pub cutoff: DateTime<Utc>,
    /// Rows removed per table
    pub purged: BTreeMap<&'static str, u64>,
    /// Tables whose step failed
    pub failed_tables: Vec<&'static str>,
    /// Object ids whose blob could not be deleted
    pub blob_delete_failures: Vec<String>,
}

impl PurgeReport {
    fn new(cutoff: DateTime<Utc>) -> Self {
        Self {
            cutoff,
            purged: BTreeMap::new(),
            failed_tables: Vec::new(),
            blob_delete_failures: Vec::new(),
        }
    }

    /// Rows removed from `table`, zero when the step failed or found nothing
    pub fn purged_from(&self, table: &str) -> u64 {
        self.purged.get(table).copied().unwrap_or(0)
    }

    pub fn total_purged(&self) -> u64 {
        self.purged.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failed_tables.is_empty() && self.blob_delete_failures.is_empty()
    }

    fn record(&mut self, table: &'static str, result: RepoResult<u64>) {
        match result {
            Ok(count) => {
                debug!(table, count, "Purged table");
                self.purged.insert(table, count);
            }
            Err(e) => {
                error!(table, error = %e, "Purge failed");
                self.failed_tables.push(table);
            }
        }
    }
}

/// Retention service
pub struct RetentionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RetentionService<'a> {
    /// Create a new RetentionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run one purge. The cutoff is computed once from `now` and shared by every table.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` without touching any table when the
    /// retention period reaches past the earliest representable timestamp.
    #[instrument(skip(self))]
    pub async fn run_once(&self, now: DateTime<Utc>) -> ServiceResult<PurgeReport> {
        let retention = self.ctx.settings().retention;
        let cutoff = now.checked_sub_signed(retention).ok_or_else(|| {
            ServiceError::validation(format!(
                "retention of {} days reaches before the earliest timestamp",
                retention.num_days()
            ))
        })?;
        let mut report = PurgeReport::new(cutoff);

        // Stage 1: children. Reactions are cleared before the comments they hang off.
        let (attachments, (reactions, comments)) = futures::join!(
            self.purge_attachments(cutoff),
            async {
                let reactions = self.purge_table(PurgeTable::Reactions, cutoff).await;
                let comments = self.purge_table(PurgeTable::Comments, cutoff).await;
                (reactions, comments)
            },
        );
        let (attachment_result, blob_failures) = attachments;
        report.record(ATTACHMENTS, attachment_result);
        report.blob_delete_failures = blob_failures;
        report.record(PurgeTable::Reactions.as_str(), reactions);
        report.record(PurgeTable::Comments.as_str(), comments);

        // Stage 2: posts
        let posts = self.purge_table(PurgeTable::Posts, cutoff).await;
        report.record(PurgeTable::Posts.as_str(), posts);

        // Stage 3: parents
        let parents = [PurgeTable::Categories, PurgeTable::Roles, PurgeTable::Users];
        for (table, result) in self.purge_tables(&parents, cutoff).await {
            report.record(table.as_str(), result);
        }

        if report.is_clean() {
            info!(cutoff = %cutoff, total = report.total_purged(), "Purge run finished");
        } else {
            warn!(
                cutoff = %cutoff,
                total = report.total_purged(),
                failed_tables = ?report.failed_tables,
                blob_failures = report.blob_delete_failures.len(),
                "Purge run finished with failures"
            );
        }

        Ok(report)
    }

    async fn purge_table(&self, table: PurgeTable, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        self.ctx.purge_repo().purge_deleted_before(table, cutoff).await
    }

    /// Purge tables concurrently, keeping each table's result
    async fn purge_tables(
        &self,
        tables: &[PurgeTable],
        cutoff: DateTime<Utc>,
    ) -> Vec<(PurgeTable, RepoResult<u64>)> {
        let purges = tables.iter().map(|table| self.purge_table(*table, cutoff));
        let results = join_all(purges).await;
        tables.iter().copied().zip(results).collect()
    }

    /// Drop eligible attachment rows in one transaction, then delete their
    /// blobs outside it. Returns the row count and the blobs that survived.
    async fn purge_attachments(&self, cutoff: DateTime<Utc>) -> (RepoResult<u64>, Vec<String>) {
        let rows = match self.ctx.attachment_repo().purge_deleted_before(cutoff).await {
            Ok(rows) => rows,
            Err(e) => return (Err(e), Vec::new()),
        };

        let store = self.ctx.blob_store();
        let results = join_all(rows.iter().map(|a| store.delete(&a.path))).await;

        let mut failures = Vec::new();
        for (attachment, result) in rows.iter().zip(results) {
            if let Err(e) = result {
                warn!(
                    object_id = %attachment.path,
                    attachment_id = %attachment.id,
                    error = %e,
                    "Blob delete failed"
                );
                failures.push(attachment.path.clone());
            }
        }

        (Ok(rows.len() as u64), failures)
    }

    /// Start the periodic purge on the current runtime.
    ///
    /// The task stops once `shutdown` carries `true` or its sender is dropped.
    pub fn spawn(ctx: ServiceContext, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = ctx.settings().purge_interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately
            if !ctx.settings().purge_on_startup {
                ticker.tick().await;
            }

            info!(interval_secs = period.as_secs(), "Retention scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = RetentionService::new(&ctx).run_once(Utc::now()).await {
                            error!(error = %e, "Purge run skipped");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Retention scheduler stopped");
        })
    }
}
