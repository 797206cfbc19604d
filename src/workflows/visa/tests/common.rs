use std::sync::Arc;

use crate::workflows::visa::domain::{
    Application, ApplicationDraft, ApplicationId, Client, ClientDraft, ClientId, Document,
    DocumentUpload, Priority,
};
use crate::workflows::visa::repository::{RecordStore, RepositoryError};
use crate::workflows::visa::{
    DeskOptions, FixtureSet, InMemoryLedger, InMemoryStore, VisaDesk,
};

pub(super) fn empty_desk() -> VisaDesk {
    VisaDesk::in_memory(DeskOptions::default())
}

pub(super) fn seeded_desk() -> VisaDesk {
    seeded_desk_with(DeskOptions::default())
}

pub(super) fn seeded_desk_with(options: DeskOptions) -> VisaDesk {
    let fixtures = FixtureSet::bundled().expect("bundled fixtures parse");
    VisaDesk::seeded(fixtures, options).expect("fixtures seed cleanly")
}

pub(super) fn ana() -> ClientDraft {
    ClientDraft {
        first_name: "Ana".to_string(),
        last_name: "Lee".to_string(),
        email: "a@x.com".to_string(),
        nationality: Some("Korean".to_string()),
        ..ClientDraft::default()
    }
}

pub(super) fn client_draft(first_name: &str, last_name: &str, nationality: &str) -> ClientDraft {
    ClientDraft {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        nationality: Some(nationality.to_string()),
        ..ClientDraft::default()
    }
}

pub(super) fn work_visa(client_id: ClientId) -> ApplicationDraft {
    ApplicationDraft {
        client_id,
        visa_type: "Work Visa".to_string(),
        priority: Priority::High,
        notes: None,
    }
}

pub(super) fn upload(application_id: ApplicationId, file_name: &str) -> DocumentUpload {
    DocumentUpload {
        application_id,
        file_name: file_name.to_string(),
        size_bytes: 1_258_291,
    }
}

/// Desk with one client (Ana) and one work visa application, both id 1.
pub(super) async fn desk_with_application() -> VisaDesk {
    let desk = empty_desk();
    let client = desk.clients().create(ana()).await.expect("client created");
    desk.applications()
        .create(work_visa(client.id))
        .await
        .expect("application created");
    desk
}

/// Client store whose backend is down.
pub(super) struct UnavailableClients;

impl RecordStore<Client> for UnavailableClients {
    fn list(&self) -> Result<Vec<Client>, RepositoryError> {
        Err(unavailable())
    }

    fn fetch(&self, _id: ClientId) -> Result<Option<Client>, RepositoryError> {
        Err(unavailable())
    }

    fn allocate_id(&self) -> Result<ClientId, RepositoryError> {
        Err(unavailable())
    }

    fn insert(&self, _record: Client) -> Result<Client, RepositoryError> {
        Err(unavailable())
    }

    fn modify(
        &self,
        _id: ClientId,
        _change: &mut dyn FnMut(&mut Client),
    ) -> Result<Client, RepositoryError> {
        Err(unavailable())
    }

    fn remove(&self, _id: ClientId) -> Result<Client, RepositoryError> {
        Err(unavailable())
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("client backend offline".to_string())
}

pub(super) fn desk_with_offline_clients() -> VisaDesk {
    VisaDesk::with_stores(
        Arc::new(UnavailableClients),
        Arc::new(InMemoryStore::<Application>::default()),
        Arc::new(InMemoryStore::<Document>::default()),
        Arc::new(InMemoryLedger::default()),
        DeskOptions::default(),
    )
}
