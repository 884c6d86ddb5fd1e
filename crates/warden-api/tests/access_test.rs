//! Route guards and the role hierarchy, end to end.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use warden_database::store::UserStore;

use common::TestApp;

#[tokio::test]
async fn test_manager_scenario() {
    let app = TestApp::new();
    let (manager, token) = app.user_with_token("Manager", "mia").await;
    let user = app.create_user("User", "uma", "password123").await;

    let read = app
        .request("GET", &format!("/api/users/{user}"), None, Some(&token))
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.data()["username"], "uma");

    let delete = app
        .request("DELETE", &format!("/api/users/{user}"), None, Some(&token))
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
    assert_eq!(delete.error(), "FORBIDDEN");

    let own_activity = app
        .request(
            "GET",
            &format!("/api/users/{manager}/activity"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(own_activity.status, StatusCode::OK);
    assert_eq!(own_activity.data()["items"][0]["action"], "login");

    let roles = app.request("GET", "/api/roles", None, Some(&token)).await;
    assert_eq!(roles.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_plain_user_reaches_only_self() {
    let app = TestApp::new();
    let (me, token) = app.user_with_token("User", "uma").await;
    let other = app.create_user("User", "ursula", "password123").await;

    let own = app
        .request("GET", &format!("/api/users/{me}"), None, Some(&token))
        .await;
    assert_eq!(own.status, StatusCode::OK);

    let theirs = app
        .request("GET", &format!("/api/users/{other}"), None, Some(&token))
        .await;
    assert_eq!(theirs.status, StatusCode::FORBIDDEN);

    let own_password = app
        .request(
            "PUT",
            &format!("/api/users/{me}/password"),
            Some(json!({ "current_password": "password123", "new_password": "another-pass" })),
            Some(&token),
        )
        .await;
    assert_eq!(own_password.status, StatusCode::OK);

    let their_password = app
        .request(
            "PUT",
            &format!("/api/users/{other}/password"),
            Some(json!({ "new_password": "another-pass" })),
            Some(&token),
        )
        .await;
    assert_eq!(their_password.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_manage_super_admin() {
    let app = TestApp::new();
    let (admin, admin_token) = app.user_with_token("Admin", "ann").await;
    let (root, root_token) = app.user_with_token("Super Admin", "root").await;
    let manager = app.create_user("Manager", "mia", "password123").await;

    let upward = app
        .request(
            "PUT",
            &format!("/api/users/{root}/deactivate"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(upward.status, StatusCode::FORBIDDEN);

    let downward = app
        .request(
            "PUT",
            &format!("/api/users/{manager}/deactivate"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(downward.status, StatusCode::OK);
    assert_eq!(downward.data()["is_active"], false);

    let root_acts = app
        .request(
            "PUT",
            &format!("/api/users/{admin}/deactivate"),
            None,
            Some(&root_token),
        )
        .await;
    assert_eq!(root_acts.status, StatusCode::OK);

    let reactivate = app
        .request(
            "PUT",
            &format!("/api/users/{admin}/activate"),
            None,
            Some(&root_token),
        )
        .await;
    assert_eq!(reactivate.status, StatusCode::OK);
    assert_eq!(reactivate.data()["is_active"], true);
}

#[tokio::test]
async fn test_deactivated_user_cannot_reactivate_self() {
    let app = TestApp::new();
    let (_, admin_token) = app.user_with_token("Admin", "ann").await;
    let (manager, manager_token) = app.user_with_token("Manager", "mia").await;

    let deactivate = app
        .request(
            "PUT",
            &format!("/api/users/{manager}/deactivate"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(deactivate.status, StatusCode::OK);

    // The access token issued before deactivation is still unexpired.
    let undo = app
        .request(
            "PUT",
            &format!("/api/users/{manager}/activate"),
            None,
            Some(&manager_token),
        )
        .await;
    assert_eq!(undo.status, StatusCode::BAD_REQUEST);

    let stored = UserStore::find_by_id(&app.memory, manager)
        .await
        .expect("find")
        .expect("user");
    assert!(!stored.is_active);
}

#[tokio::test]
async fn test_self_protection() {
    let app = TestApp::new();
    let (root, token) = app.user_with_token("Super Admin", "root").await;

    let deactivate = app
        .request(
            "PUT",
            &format!("/api/users/{root}/deactivate"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(deactivate.status, StatusCode::BAD_REQUEST);

    let delete = app
        .request("DELETE", &format!("/api/users/{root}"), None, Some(&token))
        .await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_user() {
    let app = TestApp::new();
    let (_, token) = app.user_with_token("Admin", "ann").await;
    let user = app.create_user("User", "uma", "password123").await;

    let deleted = app
        .request("DELETE", &format!("/api/users/{user}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .request("GET", &format!("/api/users/{user}"), None, Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manager_sets_subordinate_password() {
    let app = TestApp::new();
    let (_, token) = app.user_with_token("Manager", "mia").await;
    let user = app.create_user("User", "uma", "password123").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{user}/password"),
            Some(json!({ "new_password": "issued-by-manager" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    app.login("uma", "issued-by-manager").await;
}

#[tokio::test]
async fn test_authentication_precedes_authorization() {
    let app = TestApp::new();
    let user = app.create_user("User", "uma", "password123").await;

    for (method, path) in [
        ("GET", format!("/api/users/{user}")),
        ("DELETE", format!("/api/users/{user}")),
        ("GET", "/api/roles".to_string()),
        ("GET", "/api/system/health".to_string()),
    ] {
        let response = app.request(method, &path, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {path}");
    }
}

#[tokio::test]
async fn test_system_health_requires_admin_role() {
    let app = TestApp::new();
    let (_, admin) = app.user_with_token("Admin", "ann").await;
    let (_, manager) = app.user_with_token("Manager", "mia").await;

    let allowed = app
        .request("GET", "/api/system/health", None, Some(&admin))
        .await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.data()["store"], "memory");
    assert_eq!(allowed.data()["user_count"], 2);

    let denied = app
        .request("GET", "/api/system/health", None, Some(&manager))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_and_permission_listings() {
    let app = TestApp::new();
    let (_, token) = app.user_with_token("Admin", "ann").await;

    let roles = app.request("GET", "/api/roles", None, Some(&token)).await;
    assert_eq!(roles.status, StatusCode::OK);
    let roles = roles.data().as_array().expect("roles").clone();
    assert_eq!(roles.len(), 4);

    let permissions = app
        .request("GET", "/api/permissions", None, Some(&token))
        .await;
    assert_eq!(permissions.status, StatusCode::OK);
    assert_eq!(permissions.data().as_array().expect("permissions").len(), 11);

    let user_role = roles
        .iter()
        .find(|r| r["name"] == "User")
        .expect("User role");
    let id = user_role["id"].as_str().expect("id");
    let grants = app
        .request("GET", &format!("/api/roles/{id}/permissions"), None, Some(&token))
        .await;
    assert_eq!(grants.status, StatusCode::OK);
    assert_eq!(grants.data()[0]["name"], "dashboard.read");

    let bad_id = app
        .request("GET", "/api/roles/not-a-uuid/permissions", None, Some(&token))
        .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_change_applies_without_new_token() {
    let app = TestApp::new();
    let (id, token) = app.user_with_token("User", "uma").await;

    let before = app.request("GET", "/api/permissions", None, Some(&token)).await;
    assert_eq!(before.status, StatusCode::FORBIDDEN);

    let admin = warden_database::store::RoleStore::find_by_name(&app.memory, "Admin")
        .await
        .expect("lookup")
        .expect("seeded");
    assert!(app.memory.assign_role(id, admin.id).await);

    let after = app.request("GET", "/api/permissions", None, Some(&token)).await;
    assert_eq!(after.status, StatusCode::OK);
}
