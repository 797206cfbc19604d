use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use visa_desk::config::{AppConfig, StoreConfig};
use visa_desk::error::AppError;
use visa_desk::telemetry;
use visa_desk::workflows::visa::{
    ApplicationId, ApplicationQuery, ApplicationStage, DocumentStatus, ValidationResult,
    ValidationSummary, VisaDesk,
};

use crate::demo::run_demo;

#[derive(Parser, Debug)]
#[command(
    name = "visa-desk",
    about = "Track visa applications, client records, documents, and validation checks",
    version
)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Application counters over the loaded records (default command)
    Dashboard,
    /// Walk a new client from intake through validation on an empty desk
    Demo,
    /// List applications, optionally filtered
    Applications(ApplicationArgs),
    /// List clients, optionally filtered by a search term
    Clients(ClientArgs),
    /// List documents, optionally for one application or review status
    Documents(DocumentArgs),
    /// Run validation for one application and print the results with a summary
    Validate(ValidateArgs),
}

/// Overrides for the store settings loaded from the environment.
#[derive(Args, Debug, Default)]
struct StoreArgs {
    /// Fixture file to seed the stores from instead of the bundled data
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,
    /// Artificial delay before each store operation, in milliseconds
    #[arg(long, global = true)]
    latency_ms: Option<u64>,
    /// Enable the extended validation rules
    #[arg(long, global = true)]
    strict: bool,
}

impl StoreArgs {
    fn apply(self, config: &mut StoreConfig) {
        if let Some(path) = self.fixtures {
            config.fixtures_path = Some(path);
        }
        if let Some(latency_ms) = self.latency_ms {
            config.latency_ms = latency_ms;
        }
        if self.strict {
            config.strict_validation = true;
        }
    }
}

#[derive(Args, Debug, Default)]
struct ApplicationArgs {
    /// Only applications at this stage (1-6 or its label)
    #[arg(long, value_parser = parse_stage)]
    stage: Option<ApplicationStage>,
    /// Case-insensitive match on visa type and notes
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args, Debug, Default)]
struct ClientArgs {
    /// Case-insensitive match on name, email, and nationality
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args, Debug, Default)]
struct DocumentArgs {
    /// Only documents attached to this application
    #[arg(long)]
    application: Option<u64>,
    /// Only documents with this review status, e.g. "Pending Review"
    #[arg(long, value_parser = parse_document_status)]
    status: Option<DocumentStatus>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Application to validate
    application_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport {
    application_id: ApplicationId,
    results: Vec<ValidationResult>,
    summary: ValidationSummary,
}

fn parse_stage(raw: &str) -> Result<ApplicationStage, String> {
    match raw.trim().parse::<u8>() {
        Ok(number) => ApplicationStage::from_number(number).map_err(|err| err.to_string()),
        Err(_) => ApplicationStage::from_label(raw)
            .ok_or_else(|| format!("'{raw}' is neither a stage number nor a stage label")),
    }
}

fn parse_document_status(raw: &str) -> Result<DocumentStatus, String> {
    DocumentStatus::from_label(raw).ok_or_else(|| {
        format!("'{raw}' is not a document status (Pending Review, Verified, Rejected)")
    })
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    cli.store.apply(&mut config.store);
    telemetry::init(&config.telemetry, config.environment)?;
    info!(
        environment = ?config.environment,
        latency_ms = config.store.latency_ms,
        strict = config.store.strict_validation,
        "visa desk starting"
    );

    match cli.command.unwrap_or(Command::Dashboard) {
        Command::Demo => run_demo(&config.store).await,
        Command::Dashboard => {
            let desk = VisaDesk::from_config(&config.store)?;
            print_json(&desk.dashboard().await?)
        }
        Command::Applications(args) => {
            let desk = VisaDesk::from_config(&config.store)?;
            let query = ApplicationQuery {
                stage: args.stage,
                text: args.search,
                ..ApplicationQuery::default()
            };
            print_json(&desk.applications().filter(&query).await?)
        }
        Command::Clients(args) => {
            let desk = VisaDesk::from_config(&config.store)?;
            let clients = match args.search {
                Some(query) => desk.clients().search(&query).await?,
                None => desk.clients().list().await?,
            };
            print_json(&clients)
        }
        Command::Documents(args) => {
            let desk = VisaDesk::from_config(&config.store)?;
            let mut documents = match args.application {
                Some(id) => desk.documents().by_application(ApplicationId(id)).await?,
                None => desk.documents().list().await?,
            };
            if let Some(status) = args.status {
                documents.retain(|document| document.status == status);
            }
            print_json(&documents)
        }
        Command::Validate(args) => {
            let desk = VisaDesk::from_config(&config.store)?;
            let application_id = ApplicationId(args.application_id);
            let results = desk.validation().run(application_id).await?;
            let summary = ValidationSummary::from_results(&results);
            print_json(&ValidationReport {
                application_id,
                results,
                summary,
            })
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}
