use serde::{Deserialize, Serialize};

/// Share of completion credited per stage; six stages saturate at 100%.
const STAGE_WEIGHT: f64 = 16.67;

/// The six fixed steps an application moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ApplicationStage {
    VisaSelection,
    InformationCollection,
    Validation,
    DocumentGeneration,
    AgentReview,
    ReadyForSubmission,
}

impl ApplicationStage {
    pub const FIRST: Self = Self::VisaSelection;
    pub const FINAL: Self = Self::ReadyForSubmission;

    pub const fn ordered() -> [Self; 6] {
        [
            Self::VisaSelection,
            Self::InformationCollection,
            Self::Validation,
            Self::DocumentGeneration,
            Self::AgentReview,
            Self::ReadyForSubmission,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VisaSelection => "Visa Selection",
            Self::InformationCollection => "Information Collection",
            Self::Validation => "Validation",
            Self::DocumentGeneration => "Document Generation",
            Self::AgentReview => "Agent Review",
            Self::ReadyForSubmission => "Ready for Submission",
        }
    }

    /// 1-indexed position in the stage table.
    pub const fn number(self) -> u8 {
        match self {
            Self::VisaSelection => 1,
            Self::InformationCollection => 2,
            Self::Validation => 3,
            Self::DocumentGeneration => 4,
            Self::AgentReview => 5,
            Self::ReadyForSubmission => 6,
        }
    }

    pub fn from_number(number: u8) -> Result<Self, StageError> {
        Self::ordered()
            .into_iter()
            .find(|stage| stage.number() == number)
            .ok_or(StageError::OutOfRange(number))
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let needle = label.trim();
        Self::ordered()
            .into_iter()
            .find(|stage| stage.label().eq_ignore_ascii_case(needle))
    }

    pub fn completion_percentage(self) -> u8 {
        (f64::from(self.number()) * STAGE_WEIGHT).round().min(100.0) as u8
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1).ok()
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::ReadyForSubmission)
    }
}

impl TryFrom<u8> for ApplicationStage {
    type Error = StageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value)
    }
}

impl From<ApplicationStage> for u8 {
    fn from(stage: ApplicationStage) -> Self {
        stage.number()
    }
}

/// Rejected stage transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("stage {0} is outside the stage table (1-6)")]
    OutOfRange(u8),
    #[error("application is already at the final stage")]
    AlreadyFinal,
}
