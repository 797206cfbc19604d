//! Visa case desk: client, application, and document stores plus validation checks.
//!
//! Each store is an independent flat collection injected into its service; the
//! [`VisaDesk`] façade wires them together and owns the cross-store policies
//! (referential checks on create, cascading deletes).

pub mod applications;
pub mod clients;
pub mod desk;
pub mod documents;
pub mod domain;
mod error;
pub mod fixtures;
pub mod intake;
mod latency;
pub mod memory;
pub mod repository;
pub mod stage;
pub mod validation;

#[cfg(test)]
mod tests;

pub use applications::{ApplicationQuery, ApplicationService, ApplicationStats};
pub use clients::ClientService;
pub use desk::{DeletionReport, DeskOptions, NewApplicationRequest, VisaDesk};
pub use documents::DocumentService;
pub use domain::{
    Application, ApplicationDraft, ApplicationId, ApplicationPatch, CheckStatus, Client,
    ClientDraft, ClientId, ClientPatch, Document, DocumentId, DocumentKind, DocumentPatch,
    DocumentStatus, DocumentUpload, Priority, Severity, ValidationResult, ValidationResultId,
};
pub use error::DeskError;
pub use fixtures::{FixtureError, FixtureSet};
pub use intake::{IntakeError, IntakeGuard, UploadPolicy};
pub use latency::SimulatedLatency;
pub use memory::{InMemoryLedger, InMemoryStore};
pub use repository::{
    Record, RecordId, RecordStore, RepositoryError, SharedLedger, SharedStore, ValidationLedger,
};
pub use stage::{ApplicationStage, StageError};
pub use validation::{
    NamedRule, RuleOutcome, ValidationContext, ValidationEngine, ValidationRule,
    ValidationService, ValidationSummary,
};
