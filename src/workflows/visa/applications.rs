use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{
    Application, ApplicationDraft, ApplicationId, ApplicationPatch, Client, ClientId, Priority,
};
use super::error::DeskError;
use super::intake::IntakeGuard;
use super::latency::SimulatedLatency;
use super::repository::{RepositoryError, SharedStore};
use super::stage::{ApplicationStage, StageError};

/// CRUD plus stage transitions over visa applications.
pub struct ApplicationService {
    store: SharedStore<Application>,
    clients: SharedStore<Client>,
    guard: Arc<IntakeGuard>,
    latency: SimulatedLatency,
}

/// Filter over the application list; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationQuery {
    pub stage: Option<ApplicationStage>,
    pub priority: Option<Priority>,
    /// Case-insensitive match against visa type and notes.
    pub text: Option<String>,
}

impl ApplicationQuery {
    pub fn matches(&self, application: &Application) -> bool {
        if self.stage.is_some_and(|stage| stage != application.stage) {
            return false;
        }
        if self
            .priority
            .is_some_and(|priority| priority != application.priority)
        {
            return false;
        }

        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                application.visa_type.to_lowercase().contains(&needle)
                    || application
                        .notes
                        .as_deref()
                        .map(|notes| notes.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            }
            _ => true,
        }
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total_applications: usize,
    pub active_applications: usize,
    pub completed_applications: usize,
}

impl ApplicationStats {
    pub fn from_applications(applications: &[Application]) -> Self {
        let active = applications
            .iter()
            .filter(|application| application.is_active())
            .count();
        Self {
            total_applications: applications.len(),
            active_applications: active,
            completed_applications: applications.len() - active,
        }
    }
}

impl ApplicationService {
    pub fn new(
        store: SharedStore<Application>,
        clients: SharedStore<Client>,
        guard: Arc<IntakeGuard>,
        latency: SimulatedLatency,
    ) -> Self {
        Self {
            store,
            clients,
            guard,
            latency,
        }
    }

    pub async fn list(&self) -> Result<Vec<Application>, DeskError> {
        self.latency.pause().await;
        Ok(self.store.list()?)
    }

    pub async fn get(&self, id: ApplicationId) -> Result<Application, DeskError> {
        self.latency.pause().await;
        debug!(application_id = %id, "fetching application");
        let application = self
            .store
            .fetch(id)?
            .ok_or_else(|| RepositoryError::not_found::<Application>(id))?;
        Ok(application)
    }

    /// Create at stage 1 with 0% completion. The referenced client must exist.
    pub async fn create(&self, draft: ApplicationDraft) -> Result<Application, DeskError> {
        if let Err(error) = self.guard.check_application(&draft) {
            warn!(%error, "rejected application draft");
            return Err(error.into());
        }

        self.latency.pause().await;
        if self.clients.fetch(draft.client_id)?.is_none() {
            warn!(client_id = %draft.client_id, "application references unknown client");
            return Err(DeskError::missing_reference::<Client>(draft.client_id));
        }

        let id = self.store.allocate_id()?;
        let application = self
            .store
            .insert(Application::from_draft(id, draft, Utc::now()))?;
        info!(
            application_id = %application.id,
            client_id = %application.client_id,
            visa_type = %application.visa_type,
            priority = application.priority.label(),
            "application created"
        );
        Ok(application)
    }

    /// Partial merge that refreshes `updatedAt`.
    pub async fn update(
        &self,
        id: ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, DeskError> {
        if let Err(error) = self.guard.check_application_patch(&patch) {
            warn!(application_id = %id, %error, "rejected application patch");
            return Err(error.into());
        }

        self.latency.pause().await;
        if let Some(client_id) = patch.client_id {
            if self.clients.fetch(client_id)?.is_none() {
                return Err(DeskError::missing_reference::<Client>(client_id));
            }
        }

        let now = Utc::now();
        let application = self
            .store
            .modify(id, &mut |application: &mut Application| {
                application.apply(&patch, now)
            })?;
        info!(application_id = %id, "application updated");
        Ok(application)
    }

    pub async fn delete(&self, id: ApplicationId) -> Result<Application, DeskError> {
        self.latency.pause().await;
        let removed = self.store.remove(id)?;
        info!(application_id = %id, "application deleted");
        Ok(removed)
    }

    /// Move to `target_stage` (1-6), deriving status and completion from the stage table.
    pub async fn advance_stage(
        &self,
        id: ApplicationId,
        target_stage: u8,
    ) -> Result<Application, DeskError> {
        let stage = match ApplicationStage::from_number(target_stage) {
            Ok(stage) => stage,
            Err(error) => {
                warn!(application_id = %id, target_stage, "rejected stage transition");
                return Err(error.into());
            }
        };

        let application = self
            .update(
                id,
                ApplicationPatch {
                    stage: Some(stage),
                    ..ApplicationPatch::default()
                },
            )
            .await?;
        info!(
            application_id = %id,
            stage = stage.number(),
            status = stage.label(),
            "application stage advanced"
        );
        Ok(application)
    }

    /// Step to the next stage; fails once the application is ready for submission.
    ///
    /// The current stage is read and replaced under the store lock.
    pub async fn advance(&self, id: ApplicationId) -> Result<Application, DeskError> {
        self.latency.pause().await;

        let now = Utc::now();
        let mut next = None;
        let application = self
            .store
            .modify(id, &mut |application: &mut Application| {
                next = application.stage.next();
                if let Some(stage) = next {
                    application.set_stage(stage);
                    application.updated_at = now;
                }
            })?;

        let Some(stage) = next else {
            warn!(application_id = %id, "application already at final stage");
            return Err(StageError::AlreadyFinal.into());
        };
        info!(
            application_id = %id,
            stage = stage.number(),
            status = stage.label(),
            "application stage advanced"
        );
        Ok(application)
    }

    pub async fn filter(&self, query: &ApplicationQuery) -> Result<Vec<Application>, DeskError> {
        self.latency.pause().await;
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|application| query.matches(application))
            .collect())
    }

    pub async fn for_client(&self, client_id: ClientId) -> Result<Vec<Application>, DeskError> {
        self.latency.pause().await;
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|application| application.client_id == client_id)
            .collect())
    }

    pub async fn stats(&self) -> Result<ApplicationStats, DeskError> {
        let applications = self.list().await?;
        Ok(ApplicationStats::from_applications(&applications))
    }
}
