//! Integration tests for the corefboard-web API
//!
//! Tests cover:
//! - Health endpoint (no auth required)
//! - Login/logout and session cookies
//! - Protected routes rejecting missing/invalid sessions
//! - Admin-only routes rejecting non-admin sessions
//! - Language administration
//! - Evaluation upload validation
//! - Public statistics and leaderboard endpoints
//!
//! All tests run against the demo store with a temporary data root; no
//! database or Perl installation is required.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use corefboard_common::config::DataDirs;
use corefboard_web::store::Store;
use corefboard_web::{build_router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a demo-only store and a temporary data root.
/// The TempDir must stay alive for the duration of the test.
fn setup_app() -> (axum::Router, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let dirs = DataDirs::ensure(tmp.path().to_path_buf()).unwrap();
    let state = AppState::new(Store::demo_only(), dirs);
    (build_router(state), tmp)
}

/// Test helper: plain request with no body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: GET with a session cookie
fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: urlencoded form POST with a session cookie
fn form_post(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("cookie", cookie)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: multipart POST carrying `language_id` and `file`
fn multipart_post(
    uri: &str,
    cookie: &str,
    language_id: &str,
    filename: &str,
    content: &str,
) -> Request<Body> {
    let boundary = "xXtestboundaryXx";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"language_id\"\r\n\r\n\
         {lid}\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{b}--\r\n",
        b = boundary,
        lid = language_id,
        name = filename,
        content = content
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("cookie", cookie)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Test helper: log in and return the session cookie pair
async fn login(app: &axum::Router, username: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            username, password
        )))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("login should set a session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _tmp) = setup_app();

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "corefboard-web");
    assert!(body["version"].is_string());
}

// =============================================================================
// Public Page Tests
// =============================================================================

#[tokio::test]
async fn test_homepage_served() {
    let (app, _tmp) = setup_app();

    let response = app.oneshot(test_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Leaderboard"));
}

#[tokio::test]
async fn test_home_alias_redirects() {
    let (app, _tmp) = setup_app();

    let response = app.oneshot(test_request("GET", "/home")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/");
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_admin_login_redirects_to_admin_panel() {
    let (app, _tmp) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("username=admin&password=admin123"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/admin");

    let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.starts_with("session_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=3600"));
}

#[tokio::test]
async fn test_user_login_redirects_to_client() {
    let (app, _tmp) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("username=testuser&password=user123"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/client");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _tmp) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("username=admin&password=wrong"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_requires_session() {
    let (app, _tmp) = setup_app();

    let response = app.oneshot(test_request("GET", "/client")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_session_token_rejected() {
    let (app, _tmp) = setup_app();

    let response = app
        .oneshot(get_with_cookie("/client", "session_token=forged"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "testuser", "user123").await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/logout", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The old token no longer resolves
    let response = app
        .oneshot(get_with_cookie("/client", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Dashboard Tests
// =============================================================================

#[tokio::test]
async fn test_client_dashboard_returns_workspace_data() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "testuser", "user123").await;

    let response = app
        .oneshot(get_with_cookie("/client", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["user"]["username"], "testuser");
    assert!(body["languages"].is_array());
    assert!(body["evaluations"].is_array());
    // Seeded language is present
    assert_eq!(body["languages"][0]["language_code"], "hi");
}

#[tokio::test]
async fn test_admin_redirected_off_client_dashboard() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "admin", "admin123").await;

    let response = app
        .oneshot(get_with_cookie("/client", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/admin");
}

#[tokio::test]
async fn test_admin_dashboard_forbidden_for_regular_user() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "testuser", "user123").await;

    let response = app
        .oneshot(get_with_cookie("/admin", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

// =============================================================================
// Language Administration Tests
// =============================================================================

#[tokio::test]
async fn test_admin_adds_language() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "admin", "admin123").await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/admin/languages",
            &cookie,
            "language_code=DE&language_name=German",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/admin");

    let response = app
        .oneshot(get_with_cookie("/admin", &cookie))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let codes: Vec<&str> = body["languages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["language_code"].as_str().unwrap())
        .collect();
    // Lowercased on the way in
    assert!(codes.contains(&"de"));
}

#[tokio::test]
async fn test_duplicate_language_code_rejected() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "admin", "admin123").await;

    let response = app
        .oneshot(form_post(
            "/admin/languages",
            &cookie,
            "language_code=hi&language_name=Hindi+again",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_overlong_language_code_rejected() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "admin", "admin123").await;

    let response = app
        .oneshot(form_post(
            "/admin/languages",
            &cookie,
            "language_code=morethantenchars&language_name=Verbose",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_language_crud_is_admin_only() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "testuser", "user123").await;

    let response = app
        .oneshot(form_post(
            "/admin/languages",
            &cookie,
            "language_code=xx&language_name=Nope",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_missing_language_not_found() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "admin", "admin123").await;

    let response = app
        .oneshot(form_post("/admin/languages/999/delete", &cookie, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Evaluation Upload Tests
// =============================================================================

#[tokio::test]
async fn test_evaluate_requires_gold_dataset() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "testuser", "user123").await;

    let response = app
        .oneshot(multipart_post(
            "/evaluate",
            &cookie,
            "1",
            "predictions.txt",
            "some predictions",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("gold dataset"));
}

#[tokio::test]
async fn test_evaluate_rejects_non_txt_file() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "testuser", "user123").await;

    let response = app
        .oneshot(multipart_post(
            "/evaluate",
            &cookie,
            "1",
            "predictions.csv",
            "some,predictions",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains(".txt"));
}

#[tokio::test]
async fn test_evaluate_reaches_scorer_after_gold_upload() {
    let (app, _tmp) = setup_app();
    let admin_cookie = login(&app, "admin", "admin123").await;

    // Admin uploads a gold dataset for the seeded language
    let response = app
        .clone()
        .oneshot(multipart_post(
            "/admin/gold-datasets",
            &admin_cookie,
            "1",
            "gold.txt",
            "gold standard content",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The gold check now passes; with no scorer installed under the
    // data root the request fails at the scorer stage instead
    let user_cookie = login(&app, "testuser", "user123").await;
    let response = app
        .oneshot(multipart_post(
            "/evaluate",
            &user_cookie,
            "1",
            "predictions.txt",
            "system output",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("Scorer script not found"));
}

#[tokio::test]
async fn test_gold_dataset_upload_rejects_unknown_language() {
    let (app, _tmp) = setup_app();
    let cookie = login(&app, "admin", "admin123").await;

    let response = app
        .oneshot(multipart_post(
            "/admin/gold-datasets",
            &cookie,
            "42",
            "gold.txt",
            "content",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Public Data Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_statistics_shape() {
    let (app, _tmp) = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/stats"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_languages"], 1);
    assert_eq!(body["total_evaluations"], 0);
    assert!(body["total_participants"].is_number());
}

#[tokio::test]
async fn test_leaderboards_shape() {
    let (app, _tmp) = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/leaderboards"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let boards = body.as_array().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0]["language_code"], "hi");
    assert!(boards[0]["scores"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_best_scores_empty_without_database() {
    let (app, _tmp) = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/best-scores"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}
