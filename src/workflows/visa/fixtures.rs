//! Static seed data loaded into the stores at startup.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::domain::{Application, Client, Document, ValidationResult};
use super::repository::RepositoryError;

const BUNDLED_SEED: &str = include_str!("../../../fixtures/seed.json");

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("unable to read fixtures at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed fixture data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unable to seed stores: {0}")]
    Seed(#[from] RepositoryError),
}

/// Records for every store, mirroring the entity shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixtureSet {
    pub clients: Vec<Client>,
    pub applications: Vec<Application>,
    pub documents: Vec<Document>,
    pub validation_results: Vec<ValidationResult>,
}

impl FixtureSet {
    /// Seed data compiled into the binary.
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::from_json(BUNDLED_SEED)
    }

    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        let fixtures: Self = serde_json::from_str(raw)?;
        Ok(fixtures.normalized())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FixtureError> {
        let fixtures: Self = serde_json::from_reader(reader)?;
        Ok(fixtures.normalized())
    }

    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let file = File::open(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Re-derive application status and completion from the stored stage.
    fn normalized(mut self) -> Self {
        for application in &mut self.applications {
            application.normalize();
        }
        self
    }
}
