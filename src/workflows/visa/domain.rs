use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repository::{Record, RecordId};
use super::stage::ApplicationStage;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl RecordId for $name {
            fn from_sequence(value: u64) -> Self {
                Self(value)
            }

            fn sequence(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier for client records.
    ClientId
);
record_id!(
    /// Identifier for visa applications.
    ApplicationId
);
record_id!(
    /// Identifier for uploaded documents.
    DocumentId
);
record_id!(ValidationResultId);

/// Person the desk files applications for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,
}

impl Client {
    pub fn from_draft(id: ClientId, draft: ClientDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            passport_number: draft.passport_number,
            nationality: draft.nationality,
            date_of_birth: draft.date_of_birth,
            occupation: draft.occupation,
            employer: draft.employer,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Merge the fields present in `patch`; the id never changes.
    pub fn apply(&mut self, patch: &ClientPatch) {
        merge(&mut self.first_name, &patch.first_name);
        merge(&mut self.last_name, &patch.last_name);
        merge(&mut self.email, &patch.email);
        merge_optional(&mut self.phone, &patch.phone);
        merge_optional(&mut self.passport_number, &patch.passport_number);
        merge_optional(&mut self.nationality, &patch.nationality);
        merge_optional(&mut self.date_of_birth, &patch.date_of_birth);
        merge_optional(&mut self.occupation, &patch.occupation);
        merge_optional(&mut self.employer, &patch.employer);
    }

    /// Case-insensitive match over full name, email, and nationality.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.full_name().to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
            || self
                .nationality
                .as_deref()
                .map(|nationality| nationality.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

impl Record for Client {
    type Id = ClientId;
    const KIND: &'static str = "client";

    fn id(&self) -> ClientId {
        self.id
    }
}

/// Caller supplied fields for a new client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub passport_number: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub employer: Option<String>,
}

/// Partial update for a client; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub passport_number: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<String>,
    pub occupation: Option<String>,
    pub employer: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::Normal => "Normal",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

/// A visa application and its progress through the stage table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub client_id: ClientId,
    pub visa_type: String,
    #[serde(default)]
    pub priority: Priority,
    pub stage: ApplicationStage,
    pub status: String,
    pub completion_percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Fresh applications sit at the first stage with nothing completed yet.
    pub fn from_draft(id: ApplicationId, draft: ApplicationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id: draft.client_id,
            visa_type: draft.visa_type,
            priority: draft.priority,
            stage: ApplicationStage::FIRST,
            status: ApplicationStage::FIRST.label().to_string(),
            completion_percentage: 0,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `stage`, re-deriving the status label and completion.
    pub fn set_stage(&mut self, stage: ApplicationStage) {
        self.stage = stage;
        self.status = stage.label().to_string();
        self.completion_percentage = stage.completion_percentage();
    }

    /// Restore the derived fields after loading untrusted data.
    pub fn normalize(&mut self) {
        if self.stage == ApplicationStage::FIRST && self.completion_percentage == 0 {
            self.status = self.stage.label().to_string();
        } else {
            self.set_stage(self.stage);
        }
    }

    pub fn apply(&mut self, patch: &ApplicationPatch, now: DateTime<Utc>) {
        if let Some(client_id) = patch.client_id {
            self.client_id = client_id;
        }
        merge(&mut self.visa_type, &patch.visa_type);
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        merge_optional(&mut self.notes, &patch.notes);
        if let Some(stage) = patch.stage {
            self.set_stage(stage);
        }
        self.updated_at = now;
    }

    pub fn is_active(&self) -> bool {
        !self.stage.is_final()
    }
}

impl Record for Application {
    type Id = ApplicationId;
    const KIND: &'static str = "application";

    fn id(&self) -> ApplicationId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub client_id: ClientId,
    pub visa_type: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update for an application. A patched stage goes through the stage table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationPatch {
    pub client_id: Option<ClientId>,
    pub visa_type: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub stage: Option<ApplicationStage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Passport,
    Document,
}

impl DocumentKind {
    /// Case-sensitive: only a lowercase "passport" in the file name counts.
    pub fn infer(file_name: &str) -> Self {
        if file_name.contains("passport") {
            DocumentKind::Passport
        } else {
            DocumentKind::Document
        }
    }
}

/// Review state of an uploaded document. Transitions are manual only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[default]
    #[serde(rename = "Pending Review")]
    PendingReview,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::PendingReview => "Pending Review",
            DocumentStatus::Verified => "Verified",
            DocumentStatus::Rejected => "Rejected",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let needle = label.trim();
        [Self::PendingReview, Self::Verified, Self::Rejected]
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub application_id: ApplicationId,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub file_name: String,
    pub url: String,
    pub size: String,
    #[serde(default)]
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn from_upload(id: DocumentId, upload: DocumentUpload, now: DateTime<Utc>) -> Self {
        Self {
            id,
            application_id: upload.application_id,
            kind: DocumentKind::infer(&upload.file_name),
            url: format!("/documents/{}", upload.file_name),
            size: format_megabytes(upload.size_bytes),
            file_name: upload.file_name,
            status: DocumentStatus::PendingReview,
            uploaded_at: now,
        }
    }

    pub fn apply(&mut self, patch: &DocumentPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        merge(&mut self.file_name, &patch.file_name);
        merge(&mut self.url, &patch.url);
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

impl Record for Document {
    type Id = DocumentId;
    const KIND: &'static str = "document";

    fn id(&self) -> DocumentId {
        self.id
    }
}

/// A file handed over by the upload widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    pub application_id: ApplicationId,
    pub file_name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentPatch {
    #[serde(rename = "type")]
    pub kind: Option<DocumentKind>,
    pub file_name: Option<String>,
    pub url: Option<String>,
    pub status: Option<DocumentStatus>,
}

/// Render a byte count as megabytes with one decimal, e.g. "1.2 MB".
pub fn format_megabytes(size_bytes: u64) -> String {
    format!("{:.1} MB", size_bytes as f64 / 1024.0 / 1024.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl CheckStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warning => "warning",
            CheckStatus::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Medium,
    High,
}

/// One named check outcome for an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub id: ValidationResultId,
    pub application_id: ApplicationId,
    pub field: String,
    pub status: CheckStatus,
    pub message: String,
    pub severity: Severity,
    pub category: String,
}

fn merge(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

fn merge_optional(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}
