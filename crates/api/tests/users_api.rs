//! HTTP-level integration tests for the user roster and admin markers.

mod common;

use axum::http::StatusCode;
use common::{
    admin_session, body_json, delete_auth, get_auth, login, post_auth, post_json,
    post_json_auth, put_json_auth, seed_user, FailingWrites,
};
use cursus_db::repositories::{AdminRepo, CredentialRepo};
use cursus_db::store::Query;
use serde_json::{json, Value};

async fn create_student(test: &common::TestApp, token: &str, email: &str) -> Value {
    let response = post_json_auth(
        test.app(),
        "/api/v1/users",
        json!({
            "email": email,
            "password": "motdepasse",
            "full_name": "Amina Benali",
            "matricule": "202312345",
            "year": "L2",
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Create / list / update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_user_can_log_in_and_is_listed() {
    let test = common::build_test_app();
    let (_, token) = admin_session(&test).await;

    let user = create_student(&test, &token, "Amina@Univ.dz").await;
    assert_eq!(user["email"], "amina@univ.dz");
    assert_eq!(user["is_admin"], false);

    login(test.app(), "amina@univ.dz", "motdepasse").await;

    let json = body_json(get_auth(test.app(), "/api/v1/users", &token).await).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|u| u["is_admin"] == true));
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let test = common::build_test_app();
    let (_, token) = admin_session(&test).await;
    create_student(&test, &token, "amina@univ.dz").await;

    let response = post_json_auth(
        test.app(),
        "/api/v1/users",
        json!({ "email": "amina@univ.dz", "password": "motdepasse", "full_name": "Autre" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_password_is_a_field_error() {
    let test = common::build_test_app();
    let (_, token) = admin_session(&test).await;
    let response = post_json_auth(
        test.app(),
        "/api/v1/users",
        json!({ "email": "a@univ.dz", "password": "court", "full_name": "A" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "password");
}

#[tokio::test]
async fn email_change_moves_the_login() {
    let test = common::build_test_app();
    let (_, token) = admin_session(&test).await;
    let user = create_student(&test, &token, "amina@univ.dz").await;
    let uri = format!("/api/v1/users/{}", user["uid"].as_str().unwrap());

    let response = put_json_auth(
        test.app(),
        &uri,
        json!({ "email": "amina.b@univ.dz", "matricule": "" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "amina.b@univ.dz");
    assert!(json["data"]["matricule"].is_null());

    login(test.app(), "amina.b@univ.dz", "motdepasse").await;
    let old = post_json(
        test.app(),
        "/api/v1/auth/login",
        json!({ "email": "amina@univ.dz", "password": "motdepasse" }),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Admin toggle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toggle_grants_then_revokes() {
    let test = common::build_test_app();
    let (admin_uid, token) = admin_session(&test).await;
    let user = create_student(&test, &token, "amina@univ.dz").await;
    let uid = user["uid"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/users/{uid}/admin/toggle");

    let json = body_json(post_auth(test.app(), &uri, &token).await).await;
    assert_eq!(json["data"]["is_admin"], true);
    assert!(AdminRepo::is_admin(test.state.store(), &uid).await.unwrap());

    let marker = test
        .state
        .store()
        .get("admins", &uid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(marker.data["granted_by"], admin_uid.as_str());

    let json = body_json(post_auth(test.app(), &uri, &token).await).await;
    assert_eq!(json["data"]["is_admin"], false);
    assert!(!AdminRepo::is_admin(test.state.store(), &uid).await.unwrap());
}

#[tokio::test]
async fn toggle_in_flight_is_refused() {
    let test = common::build_test_app();
    let (_, token) = admin_session(&test).await;
    let user = create_student(&test, &token, "amina@univ.dz").await;
    let uid = user["uid"].as_str().unwrap().to_string();

    let _guard = test.state.admin_toggles.try_claim(&uid).unwrap();
    let uri = format!("/api/v1/users/{uid}/admin/toggle");
    let response = post_auth(test.app(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(!AdminRepo::is_admin(test.state.store(), &uid).await.unwrap());
}

#[tokio::test]
async fn admin_cannot_revoke_self() {
    let test = common::build_test_app();
    let (admin_uid, token) = admin_session(&test).await;

    let uri = format!("/api/v1/users/{admin_uid}/admin/toggle");
    let response = post_auth(test.app(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(AdminRepo::is_admin(test.state.store(), &admin_uid).await.unwrap());
    assert!(!test.state.admin_toggles.is_in_flight(&admin_uid));
}

#[tokio::test]
async fn revoked_admin_loses_access_immediately() {
    let test = common::build_test_app();
    let (_, token) = admin_session(&test).await;
    let other = seed_user(&test.state, "second@univ.dz", "motdepasse", true).await;
    let other_token = login(test.app(), "second@univ.dz", "motdepasse").await;

    let uri = format!("/api/v1/users/{other}/admin/toggle");
    post_auth(test.app(), &uri, &token).await;

    let response = get_auth(test.app(), "/api/v1/years", &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_profile_credential_marker_and_sessions() {
    let test = common::build_test_app();
    let (_, token) = admin_session(&test).await;
    let uid = seed_user(&test.state, "second@univ.dz", "motdepasse", true).await;
    login(test.app(), "second@univ.dz", "motdepasse").await;

    let uri = format!("/api/v1/users/{uid}");
    let response = delete_auth(test.app(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let store = test.state.store();
    assert!(CredentialRepo::find_by_uid(store, &uid).await.unwrap().is_none());
    assert!(!AdminRepo::is_admin(store, &uid).await.unwrap());
    let sessions = store
        .query(&Query::new("sessions").filter("uid", uid.as_str()))
        .await
        .unwrap();
    assert!(sessions.is_empty());

    let response = get_auth(test.app(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_cannot_delete_self() {
    let test = common::build_test_app();
    let (admin_uid, token) = admin_session(&test).await;
    let response = delete_auth(test.app(), &format!("/api/v1/users/{admin_uid}"), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn failed_profile_write_leaves_no_credential() {
    let store = FailingWrites::new();
    let test = common::build_test_app_with_store(store.clone());
    let (_, token) = admin_session(&test).await;
    store.fail_writes_to("users");

    let response = post_json_auth(
        test.app(),
        "/api/v1/users",
        json!({ "email": "orphelin@univ.dz", "password": "motdepasse", "full_name": "Orphelin" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let credential = CredentialRepo::find_by_email(test.state.store(), "orphelin@univ.dz")
        .await
        .unwrap();
    assert!(credential.is_none());
}
