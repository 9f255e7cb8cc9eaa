//! End-to-end tests of the client flows against mocked HTTP services

use client::{
    ForgotPasswordFlow, RecoveryOrigin, Route, SessionContext, SessionError,
    api::HttpAuthApi,
    directory::RestDirectory,
    identity::GoTrueClient,
    recovery::ResetRedirect,
    storage::{SessionStorage, USER_STORAGE_KEY},
};
use common::{
    cache::{FileStore, KeyValueStore},
    user::LoginCredentials,
};
use serde_json::json;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "6f1c2a8e-4b7d-4f0e-9c3a-2d5e8b1f7a90";

async fn mount_count(server: &MockServer, email: &str, total: u64) {
    Mock::given(method("HEAD"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", format!("eq.{}", email)))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Content-Range", format!("*/{}", total)),
        )
        .mount(server)
        .await;
}

fn recovery_flow(identity: &MockServer, origin: &str) -> ForgotPasswordFlow {
    let base = Url::parse(&identity.uri()).expect("mock uri");
    ForgotPasswordFlow::new(
        Arc::new(RestDirectory::new(&base, "anon-key")),
        Arc::new(GoTrueClient::new(&base, "anon-key")),
        ResetRedirect::new(
            Url::parse(origin).expect("origin"),
            "https://dlsuqr.vercel.app/reset-password",
        ),
        RecoveryOrigin::Login,
    )
}

#[tokio::test]
async fn forgot_password_is_enumeration_resistant_over_http() {
    let server = MockServer::start().await;
    mount_count(&server, "ana@school.edu", 1).await;
    mount_count(&server, "ghost@school.edu", 0).await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/recover"))
        .and(query_param(
            "redirect_to",
            "http://localhost:5000/reset-password",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = recovery_flow(&server, "http://localhost:5000");
    let existing = flow.submit("ana@school.edu").await.expect("existing");

    flow.try_another_email();
    let missing = flow.submit("ghost@school.edu").await.expect("missing");

    assert_eq!(existing, missing);
}

#[tokio::test]
async fn forgot_password_survives_unreachable_services() {
    // Nothing is listening on the mock server once it is dropped
    let server = MockServer::start().await;
    let mut flow = recovery_flow(&server, "https://attendance.school.edu");
    drop(server);

    let notice = flow
        .submit("ana@school.edu")
        .await
        .expect("generic confirmation");
    assert_eq!(notice.title, "Request Received");
}

#[tokio::test]
async fn session_round_trip_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "attendance_session=abc; HttpOnly; Path=/")
                .set_body_json(json!({
                    "id": USER_ID,
                    "id_number": "2021-00042",
                    "email": "ana@school.edu",
                    "full_name": "Ana Cruz",
                    "role": "student",
                    "created_at": "2024-06-01T08:30:00+00:00"
                })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "id_number": "2021-00042",
            "email": "ana@school.edu",
            "full_name": "Ana Cruz-Reyes",
            "role": "student",
            "profile_picture": "https://cdn.example.com/ana.png",
            "created_at": "2024-06-01T08:30:00+00:00"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    let base = Url::parse(&server.uri()).expect("mock uri");

    let session = SessionContext::new(
        Arc::new(HttpAuthApi::new(&base).expect("api")),
        Arc::new(RestDirectory::new(&base, "anon-key")),
        SessionStorage::new(Arc::new(store.clone())),
    );
    session.restore().await;

    let outcome = session
        .login(LoginCredentials::new("2021-00042", "correct horse"))
        .await
        .expect("login");
    assert_eq!(outcome.redirect, Route::Dashboard);
    assert_eq!(
        outcome.user.created_at.map(|at| at.to_rfc3339()),
        Some(
            chrono::DateTime::parse_from_rfc3339("2024-06-01T08:30:00+00:00")
                .expect("timestamp")
                .to_rfc3339()
        )
    );

    let refreshed = session.refresh().await.expect("refreshed");
    assert_eq!(refreshed.full_name, "Ana Cruz-Reyes");

    // No logout route is mounted, so the server answers 404
    let outcome = session.logout().await;
    assert_eq!(outcome.redirect, Route::Login);
    assert_eq!(session.user(), None);
    assert_eq!(store.get(USER_STORAGE_KEY).await.expect("get"), None);
}

#[tokio::test]
async fn login_failure_falls_back_to_generic_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let base = Url::parse(&server.uri()).expect("mock uri");
    let session = SessionContext::new(
        Arc::new(HttpAuthApi::new(&base).expect("api")),
        Arc::new(RestDirectory::new(&base, "anon-key")),
        SessionStorage::new(Arc::new(FileStore::new(dir.path()))),
    );

    match session
        .login(LoginCredentials::new("ana@school.edu", "wrong"))
        .await
    {
        Err(SessionError::Authentication(message)) => {
            assert_eq!(message, "Invalid email/ID number or password");
        }
        other => panic!("unexpected result: {:?}", other.map(|outcome| outcome.user)),
    }
    assert_eq!(session.user(), None);
}

#[tokio::test]
async fn logout_clears_everything_when_server_is_unreachable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "idNumber": "2021-00042",
            "email": "ana@school.edu",
            "fullName": "Ana Cruz",
            "role": "student"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    let base = Url::parse(&server.uri()).expect("mock uri");
    let session = SessionContext::new(
        Arc::new(HttpAuthApi::new(&base).expect("api")),
        Arc::new(RestDirectory::new(&base, "anon-key")),
        SessionStorage::new(Arc::new(store.clone())),
    );

    session
        .login(LoginCredentials::new("2021-00042", "correct horse"))
        .await
        .expect("login");
    session.cache_query("attendance:today", json!({ "present": 31 }));

    // The logout request now fails at the connection level
    drop(server);
    let outcome = session.logout().await;

    assert_eq!(outcome.redirect, Route::Login);
    assert_eq!(outcome.notice.title, "Logged out");
    assert_eq!(session.user(), None);
    assert_eq!(session.cached_query("attendance:today"), None);
    assert!(!session.is_logging_out());
    assert_eq!(store.get(USER_STORAGE_KEY).await.expect("get"), None);
}
