use std::fmt::Debug;
use std::sync::Arc;

use super::domain::{ApplicationId, ValidationResult, ValidationResultId};

/// Integer identity handed out by a store's sequence.
pub trait RecordId: Copy + Eq + Debug + Send + Sync + 'static {
    fn from_sequence(value: u64) -> Self;
    fn sequence(self) -> u64;
}

/// Entity kept in a [`RecordStore`].
pub trait Record: Clone + Send + Sync + 'static {
    type Id: RecordId;

    /// Human readable record kind used in error messages and logs.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;
}

/// Storage abstraction for one flat collection of records.
///
/// Implementations must hand out ids atomically and keep insertion order for `list`.
pub trait RecordStore<T: Record>: Send + Sync {
    fn list(&self) -> Result<Vec<T>, RepositoryError>;
    fn fetch(&self, id: T::Id) -> Result<Option<T>, RepositoryError>;
    fn allocate_id(&self) -> Result<T::Id, RepositoryError>;
    fn insert(&self, record: T) -> Result<T, RepositoryError>;
    /// Apply `change` to the stored record while holding the store's lock.
    fn modify(&self, id: T::Id, change: &mut dyn FnMut(&mut T)) -> Result<T, RepositoryError>;
    fn remove(&self, id: T::Id) -> Result<T, RepositoryError>;
}

pub type SharedStore<T> = Arc<dyn RecordStore<T>>;

/// Holds the current batch of validation results per application.
pub trait ValidationLedger: Send + Sync {
    fn all(&self) -> Result<Vec<ValidationResult>, RepositoryError>;
    fn results_for(&self, application_id: ApplicationId)
        -> Result<Vec<ValidationResult>, RepositoryError>;
    fn allocate_id(&self) -> Result<ValidationResultId, RepositoryError>;
    /// Discard every result for `application_id` and store `batch` in one step.
    fn replace(
        &self,
        application_id: ApplicationId,
        batch: Vec<ValidationResult>,
    ) -> Result<(), RepositoryError>;
}

pub type SharedLedger = Arc<dyn ValidationLedger>;

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{record} {id} already exists")]
    Conflict { record: &'static str, id: u64 },
    #[error("{record} {id} not found")]
    NotFound { record: &'static str, id: u64 },
    #[error("no {record} ids left to assign")]
    Exhausted { record: &'static str },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn not_found<T: Record>(id: T::Id) -> Self {
        Self::NotFound {
            record: T::KIND,
            id: id.sequence(),
        }
    }

    pub fn conflict<T: Record>(id: T::Id) -> Self {
        Self::Conflict {
            record: T::KIND,
            id: id.sequence(),
        }
    }
}
