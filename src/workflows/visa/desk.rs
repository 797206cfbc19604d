use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::applications::{ApplicationService, ApplicationStats};
use super::clients::ClientService;
use super::documents::DocumentService;
use super::domain::{
    Application, ApplicationDraft, ApplicationId, Client, ClientDraft, ClientId, Document,
    DocumentId, Priority,
};
use super::error::DeskError;
use super::fixtures::{FixtureError, FixtureSet};
use super::intake::IntakeGuard;
use super::latency::SimulatedLatency;
use super::memory::{InMemoryLedger, InMemoryStore};
use super::repository::{SharedLedger, SharedStore};
use super::validation::{ValidationEngine, ValidationService};
use crate::config::StoreConfig;

/// Knobs shared by every service the desk builds.
pub struct DeskOptions {
    pub latency: SimulatedLatency,
    pub guard: IntakeGuard,
    pub engine: ValidationEngine,
}

impl Default for DeskOptions {
    fn default() -> Self {
        Self {
            latency: SimulatedLatency::NONE,
            guard: IntakeGuard::default(),
            engine: ValidationEngine::standard(),
        }
    }
}

impl DeskOptions {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            latency: SimulatedLatency::new(config.latency()),
            guard: IntakeGuard::default(),
            engine: if config.strict_validation {
                ValidationEngine::strict()
            } else {
                ValidationEngine::standard()
            },
        }
    }
}

/// Combined client and application intake, as submitted by the new-application form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplicationRequest {
    pub client: ClientDraft,
    pub visa_type: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Records removed by a cascading delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub clients: Vec<ClientId>,
    pub applications: Vec<ApplicationId>,
    pub documents: Vec<DocumentId>,
    pub validation_results: usize,
}

/// Entry point wiring the stores, services, and cross-store policies together.
pub struct VisaDesk {
    guard: Arc<IntakeGuard>,
    clients: ClientService,
    applications: ApplicationService,
    documents: DocumentService,
    validation: ValidationService,
}

impl VisaDesk {
    /// Desk over empty stores.
    pub fn in_memory(options: DeskOptions) -> Self {
        Self::with_stores(
            Arc::new(InMemoryStore::<Client>::default()),
            Arc::new(InMemoryStore::<Application>::default()),
            Arc::new(InMemoryStore::<Document>::default()),
            Arc::new(InMemoryLedger::default()),
            options,
        )
    }

    /// Desk over stores seeded from fixture data.
    pub fn seeded(fixtures: FixtureSet, options: DeskOptions) -> Result<Self, FixtureError> {
        let FixtureSet {
            clients,
            applications,
            documents,
            validation_results,
        } = fixtures;

        info!(
            clients = clients.len(),
            applications = applications.len(),
            documents = documents.len(),
            validation_results = validation_results.len(),
            latency_ms = options.latency.delay().as_millis() as u64,
            "seeding stores from fixtures"
        );

        Ok(Self::with_stores(
            Arc::new(InMemoryStore::seeded(clients)?),
            Arc::new(InMemoryStore::seeded(applications)?),
            Arc::new(InMemoryStore::seeded(documents)?),
            Arc::new(InMemoryLedger::seeded(validation_results)?),
            options,
        ))
    }

    /// Load the configured fixture file, or the bundled seed when none is set.
    pub fn from_config(config: &StoreConfig) -> Result<Self, FixtureError> {
        let fixtures = match &config.fixtures_path {
            Some(path) => FixtureSet::from_path(path)?,
            None => FixtureSet::bundled()?,
        };
        Self::seeded(fixtures, DeskOptions::from_config(config))
    }

    /// Build the desk around caller supplied stores.
    pub fn with_stores(
        clients: SharedStore<Client>,
        applications: SharedStore<Application>,
        documents: SharedStore<Document>,
        ledger: SharedLedger,
        options: DeskOptions,
    ) -> Self {
        let DeskOptions {
            latency,
            guard,
            engine,
        } = options;
        let guard = Arc::new(guard);

        Self {
            clients: ClientService::new(clients.clone(), guard.clone(), latency),
            applications: ApplicationService::new(
                applications.clone(),
                clients.clone(),
                guard.clone(),
                latency,
            ),
            documents: DocumentService::new(
                documents.clone(),
                applications.clone(),
                guard.clone(),
                latency,
            ),
            validation: ValidationService::new(
                ledger,
                applications,
                clients,
                documents,
                engine,
                latency,
            ),
            guard,
        }
    }

    pub fn clients(&self) -> &ClientService {
        &self.clients
    }

    pub fn applications(&self) -> &ApplicationService {
        &self.applications
    }

    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }

    pub fn validation(&self) -> &ValidationService {
        &self.validation
    }

    /// Create the client, then an application for it. Both drafts are checked up front.
    pub async fn open_application(
        &self,
        request: NewApplicationRequest,
    ) -> Result<(Client, Application), DeskError> {
        self.guard.check_client(&request.client)?;
        self.guard.check_visa_type(&request.visa_type)?;

        let client = self.clients.create(request.client).await?;
        let application = self
            .applications
            .create(ApplicationDraft {
                client_id: client.id,
                visa_type: request.visa_type,
                priority: request.priority,
                notes: request.notes,
            })
            .await?;
        Ok((client, application))
    }

    pub async fn dashboard(&self) -> Result<ApplicationStats, DeskError> {
        self.applications.stats().await
    }

    /// Remove an application together with its documents and validation results.
    pub async fn delete_application(&self, id: ApplicationId) -> Result<DeletionReport, DeskError> {
        let mut report = DeletionReport::default();
        self.cascade_application(id, &mut report).await?;
        info!(
            application_id = %id,
            documents = report.documents.len(),
            validation_results = report.validation_results,
            "application removed with dependents"
        );
        Ok(report)
    }

    /// Remove a client and cascade through every application filed for them.
    pub async fn delete_client(&self, id: ClientId) -> Result<DeletionReport, DeskError> {
        let client = self.clients.delete(id).await?;
        let mut report = DeletionReport {
            clients: vec![client.id],
            ..DeletionReport::default()
        };

        for application in self.applications.for_client(id).await? {
            match self.cascade_application(application.id, &mut report).await {
                Ok(()) => {}
                Err(error) if error.is_not_found() => {
                    warn!(application_id = %application.id, "application vanished during cascade");
                }
                Err(error) => return Err(error),
            }
        }

        info!(
            client_id = %id,
            applications = report.applications.len(),
            documents = report.documents.len(),
            "client removed with dependents"
        );
        Ok(report)
    }

    async fn cascade_application(
        &self,
        id: ApplicationId,
        report: &mut DeletionReport,
    ) -> Result<(), DeskError> {
        let application = self.applications.delete(id).await?;
        report.applications.push(application.id);

        for document in self.documents.by_application(id).await? {
            let removed = self.documents.delete(document.id).await?;
            report.documents.push(removed.id);
        }

        report.validation_results += self.validation.clear(id).await?;
        Ok(())
    }
}
