use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    Application, ApplicationId, Document, DocumentId, DocumentPatch, DocumentStatus,
    DocumentUpload,
};
use super::error::DeskError;
use super::intake::IntakeGuard;
use super::latency::SimulatedLatency;
use super::repository::{RepositoryError, SharedStore};

/// Uploads and review bookkeeping for application documents.
pub struct DocumentService {
    store: SharedStore<Document>,
    applications: SharedStore<Application>,
    guard: Arc<IntakeGuard>,
    latency: SimulatedLatency,
}

impl DocumentService {
    pub fn new(
        store: SharedStore<Document>,
        applications: SharedStore<Application>,
        guard: Arc<IntakeGuard>,
        latency: SimulatedLatency,
    ) -> Self {
        Self {
            store,
            applications,
            guard,
            latency,
        }
    }

    pub async fn list(&self) -> Result<Vec<Document>, DeskError> {
        self.latency.pause().await;
        Ok(self.store.list()?)
    }

    pub async fn get(&self, id: DocumentId) -> Result<Document, DeskError> {
        self.latency.pause().await;
        debug!(document_id = %id, "fetching document");
        let document = self
            .store
            .fetch(id)?
            .ok_or_else(|| RepositoryError::not_found::<Document>(id))?;
        Ok(document)
    }

    /// Documents attached to one application, in upload order.
    pub async fn by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<Document>, DeskError> {
        self.latency.pause().await;
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|document| document.application_id == application_id)
            .collect())
    }

    pub async fn by_status(&self, status: DocumentStatus) -> Result<Vec<Document>, DeskError> {
        self.latency.pause().await;
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|document| document.status == status)
            .collect())
    }

    /// Record an uploaded file as a pending-review document.
    pub async fn upload(&self, upload: DocumentUpload) -> Result<Document, DeskError> {
        if let Err(error) = self.guard.check_upload(&upload) {
            warn!(file_name = %upload.file_name, %error, "rejected upload");
            return Err(error.into());
        }

        self.latency.pause().await;
        if self.applications.fetch(upload.application_id)?.is_none() {
            warn!(application_id = %upload.application_id, "upload references unknown application");
            return Err(DeskError::missing_reference::<Application>(
                upload.application_id,
            ));
        }

        let id = self.store.allocate_id()?;
        let document = self
            .store
            .insert(Document::from_upload(id, upload, Utc::now()))?;
        info!(
            document_id = %document.id,
            application_id = %document.application_id,
            kind = ?document.kind,
            size = %document.size,
            "document uploaded"
        );
        Ok(document)
    }

    pub async fn update(&self, id: DocumentId, patch: DocumentPatch) -> Result<Document, DeskError> {
        self.latency.pause().await;
        let document = self
            .store
            .modify(id, &mut |document: &mut Document| document.apply(&patch))?;
        info!(document_id = %id, "document updated");
        Ok(document)
    }

    /// Manual review decision, e.g. marking a scan as verified.
    pub async fn review(&self, id: DocumentId, status: DocumentStatus) -> Result<Document, DeskError> {
        let document = self
            .update(
                id,
                DocumentPatch {
                    status: Some(status),
                    ..DocumentPatch::default()
                },
            )
            .await?;
        info!(document_id = %id, status = status.label(), "document reviewed");
        Ok(document)
    }

    pub async fn delete(&self, id: DocumentId) -> Result<Document, DeskError> {
        self.latency.pause().await;
        let removed = self.store.remove(id)?;
        info!(document_id = %id, "document deleted");
        Ok(removed)
    }
}
