//! Rule-driven validation checks and their per-application ledger.

mod rules;
mod summary;

pub use rules::{extended_rules, standard_rules, NamedRule, RuleOutcome, ValidationRule};
pub use summary::ValidationSummary;

use tracing::{debug, info};

use super::domain::{Application, ApplicationId, Client, Document, ValidationResult};
use super::error::DeskError;
use super::latency::SimulatedLatency;
use super::repository::{RepositoryError, SharedLedger, SharedStore};

/// Everything a rule may inspect for one application.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub application: &'a Application,
    pub client: Option<&'a Client>,
    pub documents: &'a [Document],
}

/// A rule outcome tagged with the rule's key and category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub field: String,
    pub category: String,
    pub outcome: RuleOutcome,
}

/// Ordered registry of validation rules.
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl ValidationEngine {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn standard() -> Self {
        Self {
            rules: standard_rules(),
        }
    }

    /// Standard rules followed by the data-driven extended set.
    pub fn strict() -> Self {
        let mut engine = Self::standard();
        engine.rules.extend(extended_rules());
        engine
    }

    pub fn register<R>(&mut self, rule: R) -> &mut Self
    where
        R: ValidationRule + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn with_rule<R>(mut self, rule: R) -> Self
    where
        R: ValidationRule + 'static,
    {
        self.register(rule);
        self
    }

    pub fn fields(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.field()).collect()
    }

    pub fn evaluate(&self, context: &ValidationContext<'_>) -> Vec<Finding> {
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.evaluate(context).map(|outcome| Finding {
                    field: rule.field().to_string(),
                    category: rule.category().to_string(),
                    outcome,
                })
            })
            .collect()
    }
}

/// Runs the engine for an application and keeps its latest batch of results.
pub struct ValidationService {
    ledger: SharedLedger,
    applications: SharedStore<Application>,
    clients: SharedStore<Client>,
    documents: SharedStore<Document>,
    engine: ValidationEngine,
    latency: SimulatedLatency,
}

impl ValidationService {
    pub fn new(
        ledger: SharedLedger,
        applications: SharedStore<Application>,
        clients: SharedStore<Client>,
        documents: SharedStore<Document>,
        engine: ValidationEngine,
        latency: SimulatedLatency,
    ) -> Self {
        Self {
            ledger,
            applications,
            clients,
            documents,
            engine,
            latency,
        }
    }

    pub async fn all(&self) -> Result<Vec<ValidationResult>, DeskError> {
        self.latency.pause().await;
        Ok(self.ledger.all()?)
    }

    pub async fn results(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<ValidationResult>, DeskError> {
        self.latency.pause().await;
        Ok(self.ledger.results_for(application_id)?)
    }

    /// Evaluate every rule and replace the application's previous results.
    pub async fn run(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<ValidationResult>, DeskError> {
        self.latency.pause().await;

        let application = self
            .applications
            .fetch(application_id)?
            .ok_or_else(|| RepositoryError::not_found::<Application>(application_id))?;
        let client = self.clients.fetch(application.client_id)?;
        let documents: Vec<Document> = self
            .documents
            .list()?
            .into_iter()
            .filter(|document| document.application_id == application_id)
            .collect();

        let context = ValidationContext {
            application: &application,
            client: client.as_ref(),
            documents: &documents,
        };
        let findings = self.engine.evaluate(&context);

        let mut batch = Vec::with_capacity(findings.len());
        for finding in findings {
            batch.push(ValidationResult {
                id: self.ledger.allocate_id()?,
                application_id,
                field: finding.field,
                status: finding.outcome.status,
                message: finding.outcome.message,
                severity: finding.outcome.severity,
                category: finding.category,
            });
        }

        self.ledger.replace(application_id, batch.clone())?;

        let summary = ValidationSummary::from_results(&batch);
        info!(
            application_id = %application_id,
            total = summary.total,
            failed = summary.failed,
            warnings = summary.warnings,
            overall = summary.overall_status.label(),
            "validation run complete"
        );
        Ok(batch)
    }

    /// Drop every stored result for an application, returning how many were removed.
    pub async fn clear(&self, application_id: ApplicationId) -> Result<usize, DeskError> {
        self.latency.pause().await;
        let removed = self.ledger.results_for(application_id)?.len();
        self.ledger.replace(application_id, Vec::new())?;
        debug!(application_id = %application_id, removed, "validation results cleared");
        Ok(removed)
    }

    pub async fn summary(
        &self,
        application_id: ApplicationId,
    ) -> Result<ValidationSummary, DeskError> {
        let results = self.results(application_id).await?;
        let summary = ValidationSummary::from_results(&results);
        debug!(
            application_id = %application_id,
            overall = summary.overall_status.label(),
            "validation summary computed"
        );
        Ok(summary)
    }
}
