use super::domain::{ApplicationDraft, ApplicationPatch, ClientDraft, ClientPatch, DocumentUpload};

/// Rejected caller input, raised before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("{file_name} is not an accepted file type ({accepted})")]
    UnsupportedFileType { file_name: String, accepted: String },
    #[error("{file_name} is too large; maximum size is {max_megabytes}MB")]
    FileTooLarge {
        file_name: String,
        max_megabytes: u64,
    },
}

const DEFAULT_MAX_UPLOAD_MEGABYTES: u64 = 10;
const DEFAULT_ACCEPTED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

/// Limits applied to uploaded files.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_megabytes: u64,
    accepted_extensions: Vec<String>,
}

impl UploadPolicy {
    pub fn new(max_megabytes: u64, accepted_extensions: &[&str]) -> Self {
        let max_megabytes = if max_megabytes == 0 {
            DEFAULT_MAX_UPLOAD_MEGABYTES
        } else {
            max_megabytes
        };

        Self {
            max_megabytes,
            accepted_extensions: accepted_extensions
                .iter()
                .map(|extension| extension.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_megabytes.saturating_mul(1024 * 1024)
    }

    fn accepts(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => self
                .accepted_extensions
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(extension)),
            _ => false,
        }
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_MEGABYTES, &DEFAULT_ACCEPTED_EXTENSIONS)
    }
}

/// Boundary checks for drafts, patches, and uploads.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    uploads: UploadPolicy,
}

impl IntakeGuard {
    pub fn with_upload_policy(uploads: UploadPolicy) -> Self {
        Self { uploads }
    }

    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.uploads
    }

    pub fn check_client(&self, draft: &ClientDraft) -> Result<(), IntakeError> {
        require("firstName", &draft.first_name)?;
        require("lastName", &draft.last_name)?;
        require("email", &draft.email)?;
        check_email(&draft.email)
    }

    pub fn check_client_patch(&self, patch: &ClientPatch) -> Result<(), IntakeError> {
        if let Some(first_name) = &patch.first_name {
            require("firstName", first_name)?;
        }
        if let Some(last_name) = &patch.last_name {
            require("lastName", last_name)?;
        }
        if let Some(email) = &patch.email {
            require("email", email)?;
            check_email(email)?;
        }
        Ok(())
    }

    pub fn check_application(&self, draft: &ApplicationDraft) -> Result<(), IntakeError> {
        self.check_visa_type(&draft.visa_type)
    }

    pub fn check_visa_type(&self, visa_type: &str) -> Result<(), IntakeError> {
        require("visaType", visa_type)
    }

    pub fn check_application_patch(&self, patch: &ApplicationPatch) -> Result<(), IntakeError> {
        match &patch.visa_type {
            Some(visa_type) => self.check_visa_type(visa_type),
            None => Ok(()),
        }
    }

    pub fn check_upload(&self, upload: &DocumentUpload) -> Result<(), IntakeError> {
        require("fileName", &upload.file_name)?;

        if !self.uploads.accepts(&upload.file_name) {
            return Err(IntakeError::UnsupportedFileType {
                file_name: upload.file_name.clone(),
                accepted: self.uploads.accepted_extensions.join(", "),
            });
        }

        if upload.size_bytes > self.uploads.max_bytes() {
            return Err(IntakeError::FileTooLarge {
                file_name: upload.file_name.clone(),
                max_megabytes: self.uploads.max_megabytes,
            });
        }

        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), IntakeError> {
    if value.trim().is_empty() {
        Err(IntakeError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Accepts `local@domain.tld` with no whitespace and a single `@`.
fn check_email(email: &str) -> Result<(), IntakeError> {
    let invalid = || IntakeError::InvalidEmail(email.to_string());
    let candidate = email.trim();

    if candidate.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = candidate.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}
