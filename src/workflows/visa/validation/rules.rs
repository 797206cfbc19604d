use crate::workflows::visa::domain::{CheckStatus, DocumentKind, DocumentStatus, Severity};

use super::ValidationContext;

/// Outcome of a single rule for one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub status: CheckStatus,
    pub severity: Severity,
    pub message: String,
}

/// A named check evaluated against an application, its client, and its documents.
pub trait ValidationRule: Send + Sync {
    /// Result key, e.g. `document_completeness`.
    fn field(&self) -> &str;
    fn category(&self) -> &str;
    /// `None` means the rule does not apply and emits no result.
    fn evaluate(&self, context: &ValidationContext<'_>) -> Option<RuleOutcome>;
}

type Predicate = Box<dyn Fn(&ValidationContext<'_>) -> bool + Send + Sync>;

/// Predicate plus message templates.
///
/// Templates may reference `{application_id}`, `{visa_type}`, `{client_name}`, and
/// `{document_count}`.
pub struct NamedRule {
    field: String,
    category: String,
    predicate: Predicate,
    pass_message: String,
    failure_status: CheckStatus,
    failure_severity: Severity,
    failure_message: String,
}

impl NamedRule {
    pub fn new<F>(field: &str, category: &str, predicate: F) -> Self
    where
        F: Fn(&ValidationContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            field: field.to_string(),
            category: category.to_string(),
            predicate: Box::new(predicate),
            pass_message: format!("{field} passed"),
            failure_status: CheckStatus::Fail,
            failure_severity: Severity::High,
            failure_message: format!("{field} failed"),
        }
    }

    /// Rule whose predicate always holds.
    pub fn always_pass(field: &str, category: &str, message: &str) -> Self {
        Self::new(field, category, |_| true).on_pass(message)
    }

    pub fn on_pass(mut self, message: &str) -> Self {
        self.pass_message = message.to_string();
        self
    }

    pub fn on_failure(mut self, status: CheckStatus, severity: Severity, message: &str) -> Self {
        self.failure_status = status;
        self.failure_severity = severity;
        self.failure_message = message.to_string();
        self
    }
}

impl ValidationRule for NamedRule {
    fn field(&self) -> &str {
        &self.field
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn evaluate(&self, context: &ValidationContext<'_>) -> Option<RuleOutcome> {
        let outcome = if (self.predicate)(context) {
            RuleOutcome {
                status: CheckStatus::Pass,
                severity: Severity::Info,
                message: render(&self.pass_message, context),
            }
        } else {
            RuleOutcome {
                status: self.failure_status,
                severity: self.failure_severity,
                message: render(&self.failure_message, context),
            }
        };
        Some(outcome)
    }
}

fn render(template: &str, context: &ValidationContext<'_>) -> String {
    let client_name = context
        .client
        .map(|client| client.full_name())
        .unwrap_or_else(|| "Unknown Client".to_string());

    template
        .replace("{application_id}", &context.application.id.to_string())
        .replace("{visa_type}", &context.application.visa_type)
        .replace("{client_name}", &client_name)
        .replace("{document_count}", &context.documents.len().to_string())
}

/// The two checks every application receives.
pub fn standard_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(NamedRule::always_pass(
            "document_completeness",
            "Document Verification",
            "All required documents uploaded",
        )),
        Box::new(NamedRule::always_pass(
            "eligibility_check",
            "Eligibility",
            "Meets visa eligibility criteria",
        )),
    ]
}

/// Data-driven checks enabled in strict mode.
pub fn extended_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(
            NamedRule::new("passport_on_file", "Document Verification", |context| {
                context
                    .documents
                    .iter()
                    .any(|document| document.kind == DocumentKind::Passport)
            })
            .on_pass("Passport scan on file for {client_name}")
            .on_failure(
                CheckStatus::Warning,
                Severity::Medium,
                "No passport scan uploaded for application {application_id}",
            ),
        ),
        Box::new(
            NamedRule::new("client_passport", "Client Information", |context| {
                context.client.is_some_and(|client| {
                    client
                        .passport_number
                        .as_deref()
                        .is_some_and(|number| !number.trim().is_empty())
                })
            })
            .on_pass("Client record complete for {client_name}")
            .on_failure(
                CheckStatus::Fail,
                Severity::High,
                "Client record for {client_name} is missing a passport number",
            ),
        ),
        Box::new(
            NamedRule::new("pending_documents", "Document Verification", |context| {
                context
                    .documents
                    .iter()
                    .all(|document| document.status != DocumentStatus::PendingReview)
            })
            .on_pass("All {document_count} document(s) reviewed")
            .on_failure(
                CheckStatus::Warning,
                Severity::Medium,
                "Documents awaiting review for {visa_type} application",
            ),
        ),
    ]
}
