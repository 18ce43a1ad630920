//! Integration tests for `PermissionRepo`.

use jobs2go_db::repositories::PermissionRepo;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_role_grants_everything(pool: PgPool) {
    let user = PermissionRepo::create_user(&pool, "admin@jobs2go.app").await.unwrap();
    let admin = PermissionRepo::find_role_by_name(&pool, "admin").await.unwrap().unwrap();
    PermissionRepo::assign_role(&pool, user.id, admin.id).await.unwrap();
    PermissionRepo::assign_role(&pool, user.id, admin.id).await.unwrap();

    let perms = PermissionRepo::load_user_permissions(&pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(perms.len(), 12);
    assert!(perms.contains(&"templates:write".to_string()));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_viewer_role_grants_reads_only(pool: PgPool) {
    let user = PermissionRepo::create_user(&pool, "viewer@jobs2go.app").await.unwrap();
    let viewer = PermissionRepo::find_role_by_name(&pool, "viewer").await.unwrap().unwrap();
    PermissionRepo::assign_role(&pool, user.id, viewer.id).await.unwrap();

    let perms = PermissionRepo::load_user_permissions(&pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!perms.is_empty());
    assert!(perms.iter().all(|p| p.ends_with(":read")), "got: {perms:?}");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_or_inactive_user_loads_none(pool: PgPool) {
    assert!(PermissionRepo::load_user_permissions(&pool, 424_242)
        .await
        .unwrap()
        .is_none());

    let user = PermissionRepo::create_user(&pool, "gone@jobs2go.app").await.unwrap();
    PermissionRepo::set_user_active(&pool, user.id, false).await.unwrap();
    assert!(PermissionRepo::load_user_permissions(&pool, user.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_without_roles_loads_empty_set(pool: PgPool) {
    let user = PermissionRepo::create_user(&pool, "new@jobs2go.app").await.unwrap();
    let perms = PermissionRepo::load_user_permissions(&pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(perms.is_empty());
}
