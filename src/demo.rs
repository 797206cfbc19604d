use serde::Serialize;
use visa_desk::config::StoreConfig;
use visa_desk::error::AppError;
use visa_desk::workflows::visa::{
    Application, ApplicationDraft, Client, ClientDraft, DeskOptions, Document, DocumentUpload,
    Priority, ValidationResult, ValidationSummary, VisaDesk,
};

use crate::cli::print_json;

const DEMO_STAGE: u8 = 2;
const DEMO_UPLOAD_BYTES: u64 = 1_258_291;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoTranscript {
    client: Client,
    created: Application,
    advanced: Application,
    document: Document,
    validation_results: Vec<ValidationResult>,
    summary: ValidationSummary,
}

/// Intake, stage change, upload, and validation for one new client.
pub(crate) async fn run_demo(config: &StoreConfig) -> Result<(), AppError> {
    let desk = VisaDesk::in_memory(DeskOptions::from_config(config));

    let client = desk
        .clients()
        .create(ClientDraft {
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            email: "a@x.com".to_string(),
            nationality: Some("Korean".to_string()),
            ..ClientDraft::default()
        })
        .await?;

    let created = desk
        .applications()
        .create(ApplicationDraft {
            client_id: client.id,
            visa_type: "Work Visa".to_string(),
            priority: Priority::High,
            notes: None,
        })
        .await?;

    let advanced = desk
        .applications()
        .advance_stage(created.id, DEMO_STAGE)
        .await?;

    let document = desk
        .documents()
        .upload(DocumentUpload {
            application_id: created.id,
            file_name: "passport_scan.png".to_string(),
            size_bytes: DEMO_UPLOAD_BYTES,
        })
        .await?;

    let validation_results = desk.validation().run(created.id).await?;
    let summary = desk.validation().summary(created.id).await?;

    print_json(&DemoTranscript {
        client,
        created,
        advanced,
        document,
        validation_results,
        summary,
    })
}
