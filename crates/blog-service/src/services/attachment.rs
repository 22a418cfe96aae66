//! Attachment service
//!
//! Keeps blob objects and attachment rows in step. The blob is always written
//! first; a row is only created once its blob exists, and a blob whose row
//! could not be written is deleted again before the error is returned.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use blog_core::entities::{Attachment, OwnerType};
use blog_core::traits::{BlobUpload, StoredBlob};
use blog_core::DomainError;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Attachment service
pub struct AttachmentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AttachmentService<'a> {
    /// Create a new AttachmentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store one blob and record it as an attachment of `owner_id`
    #[instrument(skip(self, upload), fields(bytes = upload.len()))]
    pub async fn create_attachment(
        &self,
        upload: BlobUpload,
        owner_id: Uuid,
        owner_type: OwnerType,
    ) -> ServiceResult<Attachment> {
        self.check_upload(&upload)?;

        let blob = self.ctx.blob_store().upload(upload).await.map_err(|e| {
            warn!(error = %e, "Blob upload failed");
            ServiceError::storage_unavailable()
        })?;

        let attachment = Attachment::from_stored(Uuid::new_v4(), owner_id, owner_type, blob);

        if let Err(e) = self.ctx.attachment_repo().create(&attachment).await {
            error!(
                error = %e,
                object_id = %attachment.path,
                "Attachment row write failed, removing blob"
            );
            self.compensate(vec![attachment.path]).await;
            return Err(ServiceError::storage_unavailable());
        }

        info!(
            attachment_id = %attachment.id,
            owner_id = %owner_id,
            owner_type = %owner_type,
            "Attachment created"
        );

        Ok(attachment)
    }

    /// Store a batch of blobs for one owner. Either every attachment is
    /// created or none is.
    #[instrument(skip(self, uploads), fields(count = uploads.len()))]
    pub async fn create_attachments(
        &self,
        uploads: Vec<BlobUpload>,
        owner_id: Uuid,
        owner_type: OwnerType,
    ) -> ServiceResult<Vec<Attachment>> {
        if uploads.is_empty() {
            return Ok(Vec::new());
        }

        for upload in &uploads {
            self.check_upload(upload)?;
        }

        // Every upload runs to completion so successful ones can be compensated
        let store = self.ctx.blob_store();
        let results = join_all(uploads.into_iter().map(|upload| store.upload(upload))).await;

        let mut stored: Vec<StoredBlob> = Vec::with_capacity(results.len());
        let mut failures = 0usize;
        for result in results {
            match result {
                Ok(blob) => stored.push(blob),
                Err(e) => {
                    warn!(error = %e, "Blob upload failed");
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            warn!(
                failures,
                uploaded = stored.len(),
                "Batch upload incomplete, removing uploaded blobs"
            );
            self.compensate(stored.into_iter().map(|b| b.object_id).collect()).await;
            return Err(ServiceError::storage_unavailable());
        }

        let attachments: Vec<Attachment> = stored
            .into_iter()
            .map(|blob| Attachment::from_stored(Uuid::new_v4(), owner_id, owner_type, blob))
            .collect();

        if let Err(e) = self.ctx.attachment_repo().create_many(&attachments).await {
            error!(error = %e, "Attachment batch write failed, removing blobs");
            self.compensate(attachments.into_iter().map(|a| a.path).collect()).await;
            return Err(ServiceError::storage_unavailable());
        }

        info!(
            count = attachments.len(),
            owner_id = %owner_id,
            owner_type = %owner_type,
            "Attachments created"
        );

        Ok(attachments)
    }

    /// Live attachments of many owners, grouped by owner id.
    ///
    /// Every requested id is present in the map, with an empty list when it
    /// owns nothing.
    #[instrument(skip(self, owner_ids), fields(owners = owner_ids.len()))]
    pub async fn get_attachments_by_entity_ids(
        &self,
        owner_ids: &[Uuid],
        owner_type: OwnerType,
    ) -> ServiceResult<HashMap<Uuid, Vec<Attachment>>> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut grouped: HashMap<Uuid, Vec<Attachment>> =
            owner_ids.iter().map(|id| (*id, Vec::new())).collect();

        let attachments = self
            .ctx
            .attachment_repo()
            .find_by_owners(owner_ids, owner_type)
            .await?;
        for attachment in attachments {
            grouped.entry(attachment.external_id).or_default().push(attachment);
        }

        Ok(grouped)
    }

    /// Soft delete every live attachment of an owner. Blobs stay until the purge.
    #[instrument(skip(self))]
    pub async fn soft_delete_for_owner(
        &self,
        owner_id: Uuid,
        owner_type: OwnerType,
    ) -> ServiceResult<u64> {
        let count = self
            .ctx
            .attachment_repo()
            .soft_delete_by_owner(owner_id, owner_type)
            .await?;

        info!(owner_id = %owner_id, owner_type = %owner_type, count, "Attachments soft deleted");
        Ok(count)
    }

    fn check_upload(&self, upload: &BlobUpload) -> ServiceResult<()> {
        if upload.is_empty() {
            return Err(DomainError::ValidationError("Upload is empty".to_string()).into());
        }

        let max_bytes = self.ctx.settings().max_upload_bytes;
        if upload.len() as u64 > max_bytes {
            return Err(DomainError::FileTooLarge { max_bytes }.into());
        }

        Ok(())
    }

    /// Best-effort removal of blobs that have no row. Each delete is attempted
    /// independently; failures are logged as leaks and not retried.
    async fn compensate(&self, object_ids: Vec<String>) {
        if object_ids.is_empty() {
            return;
        }

        let store = self.ctx.blob_store();
        let results = join_all(object_ids.iter().map(|id| store.delete(id))).await;

        for (object_id, result) in object_ids.iter().zip(results) {
            if let Err(e) = result {
                warn!(
                    object_id = %object_id,
                    error = %e,
                    "Compensating blob delete failed, object leaked"
                );
            }
        }
    }
}
