use super::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use yaqeen_core::Store;

fn app() -> Router {
    let cfg = CoreConfig::in_memory().with_password_iterations(1);
    let services = Services::with_store(Arc::new(cfg), Arc::new(Store::in_memory()));
    router(AppState::new(services))
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
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register_and_login(app: &Router, body: Value) -> String {
    let username = body["username"].as_str().unwrap().to_string();
    let (status, _) = send(app, "POST", "/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, session) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "username": username, "password": "s3cure-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    session["token"].as_str().unwrap().to_string()
}

async fn patient(app: &Router, username: &str) -> String {
    register_and_login(
        app,
        json!({
            "username": username,
            "password": "s3cure-pass",
            "first_name": "Amira",
            "last_name": "Haddad",
            "role": "patient",
            "age": 34
        }),
    )
    .await
}

async fn doctor(app: &Router, username: &str, specialty: &str, license: &str) -> (String, u64) {
    let token = register_and_login(
        app,
        json!({
            "username": username,
            "password": "s3cure-pass",
            "first_name": "Omar",
            "last_name": "Nasser",
            "role": "doctor",
            "specialty": specialty,
            "license_number": license,
            "years_experience": 8
        }),
    )
    .await;
    let (_, me) = send(app, "GET", "/users/me", Some(&token), None).await;
    (token, me["id"].as_u64().unwrap())
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = app();
    let (status, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the Yaqeen API!");

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let app = app();
    let (status, body) = send(&app, "GET", "/issues", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

    let (status, _) = send(&app, "GET", "/issues", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_errors_are_reported() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "x", "password": "s3cure-pass", "role": "nurse" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    patient(&app, "amira").await;
    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "amira", "password": "s3cure-pass", "role": "patient" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "username": "amira", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", "/register", None, Some(json!({ "role": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_and_logout_manage_sessions() {
    let app = app();
    let token = patient(&app, "amira").await;

    let (status, session) = send(
        &app,
        "POST",
        "/users/token/refresh",
        None,
        Some(json!({ "refresh": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["token_type"], "Bearer");
    let fresh = session["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", "/users/logout", Some(&fresh), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/users/me", Some(&fresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn issue_lifecycle_freezes_comments_once_completed() {
    let app = app();
    let amira = patient(&app, "amira").await;
    let (dr, dr_id) = doctor(&app, "omar", "radiology", "LIC-1").await;

    let (status, issue) = send(
        &app,
        "POST",
        "/issues",
        Some(&amira),
        Some(json!({ "title": "Knee pain", "description": "After a fall", "doctor_id": dr_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(issue["status"], "pending");
    let id = issue["id"].as_u64().unwrap();

    let (status, _) = send(&app, "POST", &format!("/issues/{id}/complete"), Some(&dr), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "POST", &format!("/issues/{id}/accept"), Some(&amira), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, accepted) =
        send(&app, "POST", &format!("/issues/{id}/accept"), Some(&dr), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (status, comment) = send(
        &app,
        "POST",
        "/comments",
        Some(&dr),
        Some(json!({ "issue_id": id, "content": "Please upload the X-ray" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["author"], "Omar Nasser (doctor)");

    let (status, _) = send(
        &app,
        "POST",
        "/documents",
        Some(&amira),
        Some(json!({ "issue_id": id, "file_name": "knee.png", "size_bytes": 2048 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, detail) = send(&app, "GET", &format!("/issues/{id}"), Some(&amira), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
    assert_eq!(detail["documents"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "POST", &format!("/issues/{id}/complete"), Some(&dr), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/comments",
        Some(&amira),
        Some(json!({ "issue_id": id, "content": "Thanks!" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ISSUE_COMPLETED");
}

#[tokio::test]
async fn other_patients_cannot_see_issues() {
    let app = app();
    let amira = patient(&app, "amira").await;
    let layla = patient(&app, "layla").await;

    let (_, issue) = send(
        &app,
        "POST",
        "/issues",
        Some(&amira),
        Some(json!({ "title": "Migraine" })),
    )
    .await;
    let id = issue["id"].as_u64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/issues/{id}"), Some(&layla), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (_, issues) = send(&app, "GET", "/issues", Some(&layla), None).await;
    assert!(issues.as_array().unwrap().is_empty());

    let (status, _) = send(&app, "GET", "/issues/abc", Some(&layla), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn issue_update_rejects_assign_and_unassign_together() {
    let app = app();
    let amira = patient(&app, "amira").await;
    let (_, dr_id) = doctor(&app, "omar", "cardiology", "LIC-1").await;

    let (_, issue) = send(
        &app,
        "POST",
        "/issues",
        Some(&amira),
        Some(json!({ "title": "Palpitations", "doctor_id": dr_id })),
    )
    .await;
    let uri = format!("/issues/{}", issue["id"].as_u64().unwrap());

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&amira),
        Some(json!({ "doctor_id": dr_id, "unassign_doctor": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (_, detail) = send(&app, "GET", &uri, Some(&amira), None).await;
    assert_eq!(detail["issue"]["doctor_id"], dr_id);
}

#[tokio::test]
async fn accepting_a_request_keeps_the_doctor_the_patient_chose() {
    let app = app();
    let amira = patient(&app, "amira").await;
    let (chosen, chosen_id) = doctor(&app, "omar", "cardiology", "LIC-1").await;
    let (other, _) = doctor(&app, "sami", "cardiology", "LIC-2").await;

    let (_, issue) = send(
        &app,
        "POST",
        "/issues",
        Some(&amira),
        Some(json!({ "title": "Palpitations", "doctor_id": chosen_id })),
    )
    .await;
    let issue_id = issue["id"].as_u64().unwrap();
    let (status, request) = send(
        &app,
        "POST",
        "/patient-requests",
        Some(&amira),
        Some(json!({ "title": "Palpitations", "specialty": "cardiology", "issue_id": issue_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let action = format!("/patient-requests/{}/action", request["id"].as_u64().unwrap());

    let (status, body) = send(
        &app,
        "POST",
        &action,
        Some(&other),
        Some(json!({ "action": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, decided) = send(
        &app,
        "POST",
        &action,
        Some(&chosen),
        Some(json!({ "action": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["handled_by"], chosen_id);
}

#[tokio::test]
async fn patient_requests_are_triaged_by_specialty() {
    let app = app();
    let amira = patient(&app, "amira").await;
    let (radiologist, _) = doctor(&app, "rad", "radiology", "LIC-1").await;
    let (cardiologist, cardio_id) = doctor(&app, "card", "cardiology", "LIC-2").await;

    let (status, request) = send(
        &app,
        "POST",
        "/patient-requests",
        Some(&amira),
        Some(json!({ "title": "Palpitations", "specialty": "cardiology" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = request["id"].as_u64().unwrap();
    let action = format!("/patient-requests/{id}/action");
    let detail = format!("/patient-requests/{id}");

    let (status, _) = send(&app, "GET", &detail, Some(&radiologist), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, "GET", &detail, Some(&cardiologist), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    let (_, visible) = send(&app, "GET", "/patient-requests", Some(&radiologist), None).await;
    assert!(visible.as_array().unwrap().is_empty());
    let (status, _) = send(
        &app,
        "POST",
        &action,
        Some(&radiologist),
        Some(json!({ "action": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        &action,
        Some(&cardiologist),
        Some(json!({ "action": "maybe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, decided) = send(
        &app,
        "POST",
        &action,
        Some(&cardiologist),
        Some(json!({ "action": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["status"], "accepted");
    assert_eq!(decided["handled_by"], cardio_id);

    let (_, issues) = send(&app, "GET", "/issues", Some(&cardiologist), None).await;
    let issues = issues.as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["status"], "accepted");
    assert_eq!(issues[0]["title"], "Palpitations");

    let (status, body) = send(
        &app,
        "POST",
        &action,
        Some(&cardiologist),
        Some(json!({ "action": "decline" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_DECIDED");
}

#[tokio::test]
async fn profiles_follow_role_visibility() {
    let app = app();
    let amira = patient(&app, "amira").await;
    patient(&app, "layla").await;
    let (dr, dr_id) = doctor(&app, "omar", "pathology", "LIC-1").await;

    let (_, patients) = send(&app, "GET", "/patients", Some(&amira), None).await;
    assert_eq!(patients.as_array().unwrap().len(), 1);
    let (_, patients) = send(&app, "GET", "/patients", Some(&dr), None).await;
    assert_eq!(patients.as_array().unwrap().len(), 2);

    let (status, doctor) = send(&app, "GET", &format!("/doctors/{dr_id}"), Some(&amira), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doctor["specialty"], "pathology");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/doctors/{dr_id}"),
        Some(&dr),
        Some(json!({ "years_experience": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/patients", Some(&dr), Some(json!({ "age": 40 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
