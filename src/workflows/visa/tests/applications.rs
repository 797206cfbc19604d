use super::common::*;
use crate::workflows::visa::domain::{ApplicationId, ApplicationPatch, ClientId, Priority};
use crate::workflows::visa::intake::IntakeError;
use crate::workflows::visa::stage::{ApplicationStage, StageError};
use crate::workflows::visa::{
    ApplicationQuery, ApplicationStats, DeskError, DeskOptions, SimulatedLatency,
};

#[tokio::test]
async fn new_applications_start_at_visa_selection() {
    let desk = desk_with_application().await;
    let application = desk
        .applications()
        .get(ApplicationId(1))
        .await
        .expect("application found");

    assert_eq!(application.client_id, ClientId(1));
    assert_eq!(application.stage, ApplicationStage::VisaSelection);
    assert_eq!(application.status, "Visa Selection");
    assert_eq!(application.completion_percentage, 0);
    assert_eq!(application.priority, Priority::High);
    assert_eq!(application.created_at, application.updated_at);
}

#[tokio::test]
async fn advance_stage_follows_the_stage_table() {
    let desk = desk_with_application().await;
    let expected = [
        (1, "Visa Selection", 17),
        (2, "Information Collection", 33),
        (3, "Validation", 50),
        (4, "Document Generation", 67),
        (5, "Agent Review", 83),
        (6, "Ready for Submission", 100),
    ];

    for (stage, status, completion) in expected {
        let application = desk
            .applications()
            .advance_stage(ApplicationId(1), stage)
            .await
            .expect("stage accepted");
        assert_eq!(application.stage.number(), stage);
        assert_eq!(application.status, status);
        assert_eq!(application.completion_percentage, completion);
    }
}

#[tokio::test]
async fn advance_stage_refreshes_updated_at_only() {
    let desk = desk_with_application().await;
    let before = desk
        .applications()
        .get(ApplicationId(1))
        .await
        .expect("application found");

    let after = desk
        .applications()
        .advance_stage(ApplicationId(1), 4)
        .await
        .expect("stage accepted");

    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
    assert_eq!(after.visa_type, before.visa_type);
    assert_eq!(after.client_id, before.client_id);
}

#[tokio::test]
async fn out_of_range_stages_are_rejected_without_mutation() {
    let desk = desk_with_application().await;

    for stage in [0, 7, 42] {
        assert_eq!(
            desk.applications()
                .advance_stage(ApplicationId(1), stage)
                .await,
            Err(DeskError::Stage(StageError::OutOfRange(stage)))
        );
    }

    let application = desk
        .applications()
        .get(ApplicationId(1))
        .await
        .expect("application found");
    assert_eq!(application.stage, ApplicationStage::VisaSelection);
    assert_eq!(application.completion_percentage, 0);
}

#[tokio::test]
async fn advance_steps_until_ready_for_submission() {
    let desk = desk_with_application().await;

    for expected in 2..=6 {
        let application = desk
            .applications()
            .advance(ApplicationId(1))
            .await
            .expect("next stage");
        assert_eq!(application.stage.number(), expected);
    }

    assert_eq!(
        desk.applications().advance(ApplicationId(1)).await,
        Err(DeskError::Stage(StageError::AlreadyFinal))
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_advances_each_take_one_step() {
    let desk = seeded_desk_with(DeskOptions {
        latency: SimulatedLatency::from_millis(100),
        ..DeskOptions::default()
    });

    let (first, second) = tokio::join!(
        desk.applications().advance(ApplicationId(2)),
        desk.applications().advance(ApplicationId(2)),
    );
    let mut stages = vec![
        first.expect("advanced").stage.number(),
        second.expect("advanced").stage.number(),
    ];
    stages.sort_unstable();
    assert_eq!(stages, vec![3, 4]);

    let application = desk
        .applications()
        .get(ApplicationId(2))
        .await
        .expect("application found");
    assert_eq!(application.stage, ApplicationStage::DocumentGeneration);
    assert_eq!(application.completion_percentage, 67);
}

#[tokio::test]
async fn advance_on_missing_application_is_not_found() {
    let desk = empty_desk();
    let err = desk
        .applications()
        .advance(ApplicationId(9))
        .await
        .expect_err("no such application");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn advance_stage_on_missing_application_is_not_found() {
    let desk = empty_desk();
    let err = desk
        .applications()
        .advance_stage(ApplicationId(9), 2)
        .await
        .expect_err("no such application");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn create_requires_an_existing_client() {
    let desk = empty_desk();
    assert_eq!(
        desk.applications().create(work_visa(ClientId(7))).await,
        Err(DeskError::MissingReference {
            record: "client",
            id: 7,
        })
    );
    assert!(desk
        .applications()
        .list()
        .await
        .expect("list succeeds")
        .is_empty());
}

#[tokio::test]
async fn blank_visa_type_is_rejected() {
    let desk = desk_with_application().await;
    let mut draft = work_visa(ClientId(1));
    draft.visa_type = "  ".to_string();

    assert_eq!(
        desk.applications().create(draft).await,
        Err(DeskError::Intake(IntakeError::MissingField("visaType")))
    );
}

#[tokio::test]
async fn update_merges_patch_and_checks_reassigned_client() {
    let desk = desk_with_application().await;

    let updated = desk
        .applications()
        .update(
            ApplicationId(1),
            ApplicationPatch {
                notes: Some("Sponsor letter pending".to_string()),
                priority: Some(Priority::Critical),
                ..ApplicationPatch::default()
            },
        )
        .await
        .expect("application updated");
    assert_eq!(updated.notes.as_deref(), Some("Sponsor letter pending"));
    assert_eq!(updated.priority, Priority::Critical);
    assert_eq!(updated.visa_type, "Work Visa");

    let reassigned = desk
        .applications()
        .update(
            ApplicationId(1),
            ApplicationPatch {
                client_id: Some(ClientId(99)),
                ..ApplicationPatch::default()
            },
        )
        .await;
    assert_eq!(
        reassigned,
        Err(DeskError::MissingReference {
            record: "client",
            id: 99,
        })
    );
}

#[tokio::test]
async fn delete_shrinks_the_list() {
    let desk = seeded_desk();
    let before = desk.applications().list().await.expect("list succeeds");

    desk.applications()
        .delete(ApplicationId(2))
        .await
        .expect("application deleted");

    let after = desk.applications().list().await.expect("list succeeds");
    assert_eq!(after.len(), before.len() - 1);
    assert!(desk
        .applications()
        .get(ApplicationId(2))
        .await
        .expect_err("gone")
        .is_not_found());
}

#[tokio::test]
async fn seeded_ids_continue_after_the_fixtures() {
    let desk = seeded_desk();
    let application = desk
        .applications()
        .create(work_visa(ClientId(2)))
        .await
        .expect("application created");
    assert_eq!(application.id, ApplicationId(6));
}

#[tokio::test]
async fn filter_combines_stage_priority_and_text() {
    let desk = seeded_desk();

    let at_validation = desk
        .applications()
        .filter(&ApplicationQuery {
            stage: Some(ApplicationStage::Validation),
            ..ApplicationQuery::default()
        })
        .await
        .expect("filter succeeds");
    assert_eq!(at_validation.len(), 1);
    assert_eq!(at_validation[0].id, ApplicationId(1));

    let normal = desk
        .applications()
        .filter(&ApplicationQuery {
            priority: Some(Priority::Normal),
            ..ApplicationQuery::default()
        })
        .await
        .expect("filter succeeds");
    let ids: Vec<u64> = normal.iter().map(|application| application.id.0).collect();
    assert_eq!(ids, vec![2, 4, 5]);

    let expedite = desk
        .applications()
        .filter(&ApplicationQuery {
            text: Some("EXPEDITE".to_string()),
            ..ApplicationQuery::default()
        })
        .await
        .expect("filter succeeds");
    assert_eq!(expedite.len(), 1);
    assert_eq!(expedite[0].visa_type, "Business Visa");

    let everything = desk
        .applications()
        .filter(&ApplicationQuery::default())
        .await
        .expect("filter succeeds");
    assert_eq!(everything.len(), 5);
}

#[tokio::test]
async fn for_client_lists_every_application_of_that_client() {
    let desk = seeded_desk();
    let maria = desk
        .applications()
        .for_client(ClientId(1))
        .await
        .expect("lookup succeeds");
    let ids: Vec<u64> = maria.iter().map(|application| application.id.0).collect();
    assert_eq!(ids, vec![1, 5]);
}

#[tokio::test]
async fn stats_split_active_and_completed() {
    let desk = seeded_desk();
    assert_eq!(
        desk.applications().stats().await.expect("stats"),
        ApplicationStats {
            total_applications: 5,
            active_applications: 4,
            completed_applications: 1,
        }
    );

    desk.applications()
        .advance_stage(ApplicationId(3), 6)
        .await
        .expect("stage accepted");
    let stats = desk.dashboard().await.expect("stats");
    assert_eq!(stats.completed_applications, 2);
    assert_eq!(stats.active_applications, 3);
}
