use super::intake::IntakeError;
use super::repository::{Record, RecordId, RepositoryError};
use super::stage::StageError;

/// Error raised by the desk services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("referenced {record} {id} does not exist")]
    MissingReference { record: &'static str, id: u64 },
}

impl DeskError {
    pub fn missing_reference<T: Record>(id: T::Id) -> Self {
        Self::MissingReference {
            record: T::KIND,
            id: id.sequence(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DeskError::Repository(RepositoryError::NotFound { .. })
        )
    }
}
