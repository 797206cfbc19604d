use super::common::*;
use crate::workflows::visa::domain::{
    ApplicationId, ClientId, DocumentId, DocumentKind, DocumentPatch, DocumentStatus,
};
use crate::workflows::visa::intake::IntakeError;
use crate::workflows::visa::DeskError;

#[tokio::test]
async fn upload_infers_passport_and_formats_size() {
    let desk = desk_with_application().await;
    let document = desk
        .documents()
        .upload(upload(ApplicationId(1), "passport_scan.pdf"))
        .await
        .expect("document uploaded");

    assert_eq!(document.id, DocumentId(1));
    assert_eq!(document.kind, DocumentKind::Passport);
    assert_eq!(document.size, "1.2 MB");
    assert_eq!(document.status, DocumentStatus::PendingReview);
    assert_eq!(document.url, "/documents/passport_scan.pdf");
}

#[tokio::test]
async fn passport_inference_is_case_sensitive() {
    let desk = desk_with_application().await;
    let document = desk
        .documents()
        .upload(upload(ApplicationId(1), "Passport.pdf"))
        .await
        .expect("document uploaded");
    assert_eq!(document.kind, DocumentKind::Document);
}

#[tokio::test]
async fn uploads_for_unknown_applications_are_refused() {
    let desk = empty_desk();
    assert_eq!(
        desk.documents()
            .upload(upload(ApplicationId(3), "bank_statement.pdf"))
            .await,
        Err(DeskError::MissingReference {
            record: "application",
            id: 3,
        })
    );
}

#[tokio::test]
async fn upload_policy_is_enforced_before_storage() {
    let desk = desk_with_application().await;

    let mut oversized = upload(ApplicationId(1), "scan.png");
    oversized.size_bytes = 11 * 1024 * 1024;
    assert_eq!(
        desk.documents().upload(oversized).await,
        Err(DeskError::Intake(IntakeError::FileTooLarge {
            file_name: "scan.png".to_string(),
            max_megabytes: 10,
        }))
    );

    assert!(matches!(
        desk.documents()
            .upload(upload(ApplicationId(1), "notes.txt"))
            .await,
        Err(DeskError::Intake(IntakeError::UnsupportedFileType { .. }))
    ));
    assert!(desk
        .documents()
        .list()
        .await
        .expect("list succeeds")
        .is_empty());
}

#[tokio::test]
async fn by_application_keeps_upload_order() {
    let desk = desk_with_application().await;
    desk.applications()
        .create(work_visa(ClientId(1)))
        .await
        .expect("second application");

    for (application, file_name) in [
        (1, "passport_scan.pdf"),
        (2, "offer_letter.pdf"),
        (1, "bank_statement.jpg"),
        (1, "photo.png"),
    ] {
        desk.documents()
            .upload(upload(ApplicationId(application), file_name))
            .await
            .expect("document uploaded");
    }

    let first = desk
        .documents()
        .by_application(ApplicationId(1))
        .await
        .expect("lookup succeeds");
    let names: Vec<&str> = first
        .iter()
        .map(|document| document.file_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["passport_scan.pdf", "bank_statement.jpg", "photo.png"]
    );
    assert!(first
        .iter()
        .all(|document| document.application_id == ApplicationId(1)));

    let none = desk
        .documents()
        .by_application(ApplicationId(5))
        .await
        .expect("lookup succeeds");
    assert!(none.is_empty());
}

#[tokio::test]
async fn review_changes_status_only() {
    let desk = seeded_desk();
    let before = desk.documents().get(DocumentId(2)).await.expect("document");

    let reviewed = desk
        .documents()
        .review(DocumentId(2), DocumentStatus::Verified)
        .await
        .expect("document reviewed");

    assert_eq!(reviewed.status, DocumentStatus::Verified);
    assert_eq!(reviewed.file_name, before.file_name);
    assert_eq!(reviewed.uploaded_at, before.uploaded_at);

    let pending = desk
        .documents()
        .by_status(DocumentStatus::PendingReview)
        .await
        .expect("lookup succeeds");
    let ids: Vec<u64> = pending.iter().map(|document| document.id.0).collect();
    assert_eq!(ids, vec![3]);
}

#[tokio::test]
async fn update_and_delete_documents() {
    let desk = seeded_desk();

    let renamed = desk
        .documents()
        .update(
            DocumentId(3),
            DocumentPatch {
                file_name: Some("admission_letter_signed.pdf".to_string()),
                ..DocumentPatch::default()
            },
        )
        .await
        .expect("document updated");
    assert_eq!(renamed.file_name, "admission_letter_signed.pdf");
    assert_eq!(renamed.status, DocumentStatus::PendingReview);

    desk.documents()
        .delete(DocumentId(3))
        .await
        .expect("document deleted");
    assert_eq!(desk.documents().list().await.expect("list").len(), 3);
    assert!(desk
        .documents()
        .delete(DocumentId(3))
        .await
        .expect_err("already removed")
        .is_not_found());
}
