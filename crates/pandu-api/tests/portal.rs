//! End-to-end tests driving the full router with in-memory storage.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::FixedOffset;
use serde_json::{Value, json};
use tower::ServiceExt;

use pandu_api::app::router;
use pandu_api::auth::hash_password;
use pandu_api::state::{AppState, AppStateInner};
use pandu_db::Database;
use pandu_types::models::Role;

fn portal(ledger_write_role: Role) -> (Router, AppState) {
    let db = Database::open_in_memory().unwrap();
    db.ensure_root_admin(
        "admin",
        &hash_password("admin123").unwrap(),
        "Administrator",
        chrono::Utc::now(),
    )
    .unwrap();

    let state = Arc::new(AppStateInner {
        db,
        jwt_secret: "test-secret".into(),
        tz_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        ledger_write_role,
    });
    (router(state.clone()), state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, handle: &str, password: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "handle": handle, "password": password, "display_name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn login(app: &Router, handle: &str, password: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "handle": handle, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["member_id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn register_login_and_check_in() {
    let (app, _state) = portal(Role::Admin);

    register(&app, "budi", "pass123", "Budi Santoso").await;
    let (_, token) = login(&app, "budi", "pass123").await;

    let (status, record) = send(&app, "POST", "/attendance/check-in", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["display_name"], "Budi Santoso");

    // Second check-in on the same day is refused.
    let (status, body) = send(&app, "POST", "/attendance/check-in", Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already checked in today");

    let (status, list) = send(&app, "GET", "/attendance", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn register_validates_input() {
    let (app, _state) = portal(Role::Admin);

    // Duplicate handle, case-insensitive.
    register(&app, "budi", "pass123", "Budi").await;
    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "handle": "  BUDI ", "password": "pass456", "display_name": "Other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "handle already taken");

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "handle": "sari", "password": "short", "display_name": "Sari" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "handle": "budi", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ledger_writes_are_role_gated() {
    let (app, _state) = portal(Role::Admin);

    let budi = register(&app, "budi", "pass123", "Budi").await;
    let (_, admin) = login(&app, "admin", "admin123").await;

    let entry = json!({ "direction": "in", "amount": 100000, "memo": "dues" });
    let (status, _) = send(&app, "POST", "/ledger/entries", Some(&budi), Some(entry.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", "/ledger/entries", Some(&admin), Some(entry)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        "/ledger/entries",
        Some(&admin),
        Some(json!({ "direction": "out", "amount": 30000, "memo": "supplies" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Any member may read the balance.
    let (status, balance) = send(&app, "GET", "/ledger/balance", Some(&budi), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["income"], 100000);
    assert_eq!(balance["expense"], 30000);
    assert_eq!(balance["balance"], 70000);

    // A non-positive amount never lands in the ledger.
    let (status, _) = send(
        &app,
        "POST",
        "/ledger/entries",
        Some(&admin),
        Some(json!({ "direction": "in", "amount": 0, "memo": "bogus" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn moderators_may_write_when_configured() {
    let (app, state) = portal(Role::Moderator);

    register(&app, "sari", "pass123", "Sari").await;
    let (id, _) = login(&app, "sari", "pass123").await;
    state.db.set_member_role(id, "moderator").unwrap();
    let (_, sari) = login(&app, "sari", "pass123").await;

    let (status, _) = send(
        &app,
        "POST",
        "/ledger/entries",
        Some(&sari),
        Some(json!({ "direction": "in", "amount": 5000, "memo": "donation" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn report_resolution_requires_staff() {
    let (app, state) = portal(Role::Admin);

    let budi = register(&app, "budi", "pass123", "Budi").await;
    let (status, report) = send(
        &app,
        "POST",
        "/reports",
        Some(&budi),
        Some(json!({ "message": "projector broken" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let report_id = report["id"].as_i64().unwrap();

    // An empty message is refused.
    let (status, _) = send(&app, "POST", "/reports", Some(&budi), Some(json!({ "message": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A plain member cannot resolve, not even their own report.
    let uri = format!("/reports/{report_id}");
    let (status, _) = send(&app, "DELETE", &uri, Some(&budi), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    register(&app, "sari", "pass123", "Sari").await;
    let (sari_id, _) = login(&app, "sari", "pass123").await;
    state.db.set_member_role(sari_id, "moderator").unwrap();
    let (_, sari) = login(&app, "sari", "pass123").await;

    let (status, _) = send(&app, "DELETE", &uri, Some(&sari), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, Some(&sari), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn members_see_only_their_own_reports() {
    let (app, _state) = portal(Role::Admin);

    let budi = register(&app, "budi", "pass123", "Budi").await;
    let sari = register(&app, "sari", "pass123", "Sari").await;
    send(&app, "POST", "/reports", Some(&budi), Some(json!({ "message": "one" }))).await;
    send(&app, "POST", "/reports", Some(&sari), Some(json!({ "message": "two" }))).await;

    let (_, own) = send(&app, "GET", "/reports", Some(&budi), None).await;
    assert_eq!(own.as_array().unwrap().len(), 1);

    let (_, admin) = login(&app, "admin", "admin123").await;
    let (_, all) = send(&app, "GET", "/reports", Some(&admin), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn role_changes_are_admin_only_and_spare_the_root() {
    let (app, state) = portal(Role::Admin);

    register(&app, "budi", "pass123", "Budi").await;
    let (budi_id, _) = login(&app, "budi", "pass123").await;
    register(&app, "sari", "pass123", "Sari").await;
    let (sari_id, _) = login(&app, "sari", "pass123").await;
    state.db.set_member_role(sari_id, "moderator").unwrap();
    let (_, sari) = login(&app, "sari", "pass123").await;

    // A moderator cannot hand out roles.
    let uri = format!("/members/{budi_id}/role");
    let (status, _) = send(&app, "PUT", &uri, Some(&sari), Some(json!({ "role": "admin" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(state.db.member_by_id(budi_id).unwrap().unwrap().role, "member");

    // The admin can.
    let (admin_id, admin) = login(&app, "admin", "admin123").await;
    let (status, body) = send(&app, "PUT", &uri, Some(&admin), Some(json!({ "role": "moderator" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "moderator");

    // The root admin is untouchable, even by itself.
    let root_uri = format!("/members/{admin_id}/role");
    let (status, _) = send(&app, "PUT", &root_uri, Some(&admin), Some(json!({ "role": "member" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &format!("/members/{admin_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Deleting a regular member works and is admin-only.
    let (status, _) = send(&app, "DELETE", &format!("/members/{budi_id}"), Some(&sari), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &format!("/members/{budi_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn directory_and_agenda_mutation_is_staff_only() {
    let (app, _state) = portal(Role::Admin);

    let budi = register(&app, "budi", "pass123", "Budi").await;
    let (_, admin) = login(&app, "admin", "admin123").await;

    let entry = json!({ "name": "Sari", "position": "Chair", "division": "Executive" });
    let (status, _) = send(&app, "POST", "/directory", Some(&budi), Some(entry.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "POST", "/directory", Some(&admin), Some(entry)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = send(&app, "GET", "/directory", Some(&budi), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let event = json!({ "title": "Weekly meeting", "location": "Room 8A", "scheduled_for": "2026-02-01" });
    let (status, _) = send(&app, "POST", "/agenda", Some(&admin), Some(event)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, agenda) = send(&app, "GET", "/agenda", Some(&budi), None).await;
    assert_eq!(agenda[0]["scheduled_for"], "2026-02-01");
}

#[tokio::test]
async fn profile_views_and_update() {
    let (app, _state) = portal(Role::Admin);

    let budi = register(&app, "budi", "pass123", "Budi Santoso").await;

    let (status, profile) = send(&app, "GET", "/profile", Some(&budi), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["handle"], "budi");
    assert!(profile.get("password").is_none());

    let update = json!({ "display_name": "Budi S.", "class": "8A", "whatsapp": "0812xxxx" });
    let (status, updated) = send(&app, "PUT", "/profile", Some(&budi), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["display_name"], "Budi S.");
    assert_eq!(updated["class"], "8A");

    let (status, card) = send(&app, "GET", "/profile/card", Some(&budi), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(card["member_no"].as_str().unwrap().starts_with("IPM-"));
    assert_eq!(card["class"], "8A");

    let (status, cert) = send(&app, "GET", "/profile/certificate", Some(&budi), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cert["certificate_no"].as_str().unwrap().starts_with("PIAGAM/"));
}

#[tokio::test]
async fn admin_overview_is_staff_only() {
    let (app, _state) = portal(Role::Admin);

    let budi = register(&app, "budi", "pass123", "Budi").await;
    let (status, _) = send(&app, "GET", "/admin/overview", Some(&budi), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin) = login(&app, "admin", "admin123").await;
    send(
        &app,
        "POST",
        "/ledger/entries",
        Some(&admin),
        Some(json!({ "direction": "in", "amount": 100000, "memo": "dues" })),
    )
    .await;

    let (status, overview) = send(&app, "GET", "/admin/overview", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["members"].as_array().unwrap().len(), 2);
    assert_eq!(overview["ledger"]["balance"], 100000);
}

#[tokio::test]
async fn missing_or_bad_tokens_are_rejected() {
    let (app, _state) = portal(Role::Admin);

    let (status, _) = send(&app, "GET", "/attendance", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/attendance", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A token signed with a different secret is refused too.
    let foreign =
        pandu_api::auth::create_token("other-secret", 1, "budi", "Budi", Role::Admin).unwrap();
    let (status, _) = send(&app, "GET", "/attendance", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
