//! Integration tests for `CleanupScheduleRepo`.

use jobs2go_core::cleanup_template::Frequency;
use jobs2go_db::models::cleanup_schedule::{CreateCleanupSchedule, UpdateCleanupSchedule};
use jobs2go_db::models::cleanup_template::CreateTemplate;
use jobs2go_db::repositories::{CleanupScheduleRepo, CleanupTemplateRepo};
use sqlx::PgPool;

fn new_schedule(name: &str, template_id: Option<i64>) -> CreateCleanupSchedule {
    CreateCleanupSchedule {
        name: name.to_string(),
        description: None,
        retention_days: 30,
        min_versions_to_keep: 5,
        cron_schedule: "0 3 * * *".to_string(),
        dry_run: None,
        delete_from_storage: None,
        delete_from_database: None,
        notify_on_completion: None,
        notification_channels: vec!["email".to_string()],
        template_id,
        is_active: None,
        created_by: Some("system".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_applies_defaults(pool: PgPool) {
    let schedule = CleanupScheduleRepo::create(&pool, &new_schedule("Nightly", None))
        .await
        .unwrap();

    assert_eq!(schedule.description, "");
    assert!(!schedule.dry_run);
    assert!(schedule.delete_from_storage);
    assert!(schedule.delete_from_database);
    assert!(schedule.notify_on_completion);
    assert!(schedule.is_active);
    assert!(schedule.last_run.is_none());
    assert!(schedule.next_run.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_and_delete(pool: PgPool) {
    let schedule = CleanupScheduleRepo::create(&pool, &new_schedule("Nightly", None))
        .await
        .unwrap();

    let patch = UpdateCleanupSchedule {
        is_active: Some(false),
        retention_days: Some(60),
        ..Default::default()
    };
    let updated = CleanupScheduleRepo::update(&pool, schedule.id, &patch)
        .await
        .unwrap()
        .unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.retention_days, 60);
    assert_eq!(updated.cron_schedule, "0 3 * * *");

    assert!(CleanupScheduleRepo::delete(&pool, schedule.id).await.unwrap());
    assert!(CleanupScheduleRepo::find_by_id(&pool, schedule.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_template_keeps_schedule(pool: PgPool) {
    let template = CleanupTemplateRepo::create_with_initial_version(
        &pool,
        &CreateTemplate {
            name: "T1".to_string(),
            description: None,
            frequency: Frequency::Weekly,
            day_of_week: Some(0),
            day_of_month: None,
            hour: 2,
            minute: 0,
            retention_days: 30,
            min_deployments_to_keep: 5,
            dry_run: false,
            storage_provider: "s3".to_string(),
            notify_on_success: false,
            notify_on_failure: true,
            notification_recipients: vec![],
            tags: vec![],
            created_by: None,
        },
    )
    .await
    .unwrap();
    let schedule = CleanupScheduleRepo::create(&pool, &new_schedule("Weekly", Some(template.template.id)))
        .await
        .unwrap();

    CleanupTemplateRepo::delete(&pool, template.template.id).await.unwrap();

    let reloaded = CleanupScheduleRepo::find_by_id(&pool, schedule.id)
        .await
        .unwrap()
        .expect("schedule survives template deletion");
    assert!(reloaded.template_id.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_detaches_template_only_when_asked(pool: PgPool) {
    let template_id: i64 = sqlx::query_scalar(
        "SELECT id FROM source_map_cleanup_templates WHERE name = 'Weekly Archiving'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let schedule = CleanupScheduleRepo::create(&pool, &new_schedule("Linked", Some(template_id)))
        .await
        .unwrap();

    let keep = UpdateCleanupSchedule {
        name: Some("Still linked".to_string()),
        ..Default::default()
    };
    let updated = CleanupScheduleRepo::update(&pool, schedule.id, &keep)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.template_id, Some(template_id));

    let detach = UpdateCleanupSchedule {
        template_id: Some(None),
        ..Default::default()
    };
    let updated = CleanupScheduleRepo::update(&pool, schedule.id, &detach)
        .await
        .unwrap()
        .unwrap();
    assert!(updated.template_id.is_none());
    assert_eq!(updated.name, "Still linked");
}
