use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{Client, ClientDraft, ClientId, ClientPatch};
use super::error::DeskError;
use super::intake::IntakeGuard;
use super::latency::SimulatedLatency;
use super::repository::{RepositoryError, SharedStore};

/// CRUD and search over client records.
pub struct ClientService {
    store: SharedStore<Client>,
    guard: Arc<IntakeGuard>,
    latency: SimulatedLatency,
}

impl ClientService {
    pub fn new(
        store: SharedStore<Client>,
        guard: Arc<IntakeGuard>,
        latency: SimulatedLatency,
    ) -> Self {
        Self {
            store,
            guard,
            latency,
        }
    }

    pub async fn list(&self) -> Result<Vec<Client>, DeskError> {
        self.latency.pause().await;
        Ok(self.store.list()?)
    }

    pub async fn get(&self, id: ClientId) -> Result<Client, DeskError> {
        self.latency.pause().await;
        debug!(client_id = %id, "fetching client");
        let client = self
            .store
            .fetch(id)?
            .ok_or_else(|| RepositoryError::not_found::<Client>(id))?;
        Ok(client)
    }

    pub async fn create(&self, draft: ClientDraft) -> Result<Client, DeskError> {
        if let Err(error) = self.guard.check_client(&draft) {
            warn!(%error, "rejected client draft");
            return Err(error.into());
        }

        self.latency.pause().await;
        let id = self.store.allocate_id()?;
        let client = self.store.insert(Client::from_draft(id, draft))?;
        info!(client_id = %client.id, "client created");
        Ok(client)
    }

    pub async fn update(&self, id: ClientId, patch: ClientPatch) -> Result<Client, DeskError> {
        if let Err(error) = self.guard.check_client_patch(&patch) {
            warn!(client_id = %id, %error, "rejected client patch");
            return Err(error.into());
        }

        self.latency.pause().await;
        let client = self.store.modify(id, &mut |client: &mut Client| client.apply(&patch))?;
        info!(client_id = %id, "client updated");
        Ok(client)
    }

    /// Remove a single client. Applications referencing it are left alone.
    pub async fn delete(&self, id: ClientId) -> Result<Client, DeskError> {
        self.latency.pause().await;
        let removed = self.store.remove(id)?;
        info!(client_id = %id, "client deleted");
        Ok(removed)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Client>, DeskError> {
        self.latency.pause().await;
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|client| client.matches(query))
            .collect())
    }
}
