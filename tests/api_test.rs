use jsonwebtoken::Algorithm;
use rolegate::auth::TokenManager;
use rolegate::handlers::AppState;
use rolegate::routes::routes;
use rolegate::storage::{IdentityStore, MemoryIdentityStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;

fn app_state() -> AppState {
    let tokens = Arc::new(TokenManager::new(
        "api-test-signing-key-0123456789-abcdefghij",
        Algorithm::HS256,
        Duration::from_secs(86400),
    ));
    AppState::new(tokens, Arc::new(MemoryIdentityStore::new()))
}

fn body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

async fn register(state: &AppState, email: &str, password: &str, role: &str) -> i64 {
    let api = routes(state.clone());
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/register")
        .json(&json!({"email": email, "password": password, "role": role}))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED, "{:?}", response.body());
    body(response.body())["user_id"].as_i64().unwrap()
}

async fn login(state: &AppState, email: &str, password: &str) -> String {
    let api = routes(state.clone());
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/token")
        .json(&json!({"email": email, "password": password}))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body(response.body());
    assert_eq!(json["token_type"], "bearer");
    json["access_token"].as_str().unwrap().to_string()
}

async fn call(
    state: &AppState,
    method: &str,
    path: &str,
    token: Option<&str>,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let api = routes(state.clone());
    let mut request = warp::test::request().method(method).path(path);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }
    if let Some(payload) = payload {
        request = request.json(&payload);
    }
    let response = request.reply(&api).await;
    (response.status(), body(response.body()))
}

#[tokio::test]
async fn test_developer_flow() {
    let state = app_state();
    let id = register(&state, "a@x.com", "hunter2-pass", "Developer").await;
    let token = login(&state, "a@x.com", "hunter2-pass").await;

    let claims = state.tokens.validate(&token).unwrap();
    assert_eq!(claims.role, Some(rolegate::auth::Role::Developer));
    assert_eq!(claims.id, Some(id));

    let (status, json) = call(&state, "GET", "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json["detail"].as_str().unwrap().contains("Access denied"));

    let (status, json) = call(&state, "GET", &format!("/api/v1/users/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"id": id, "email": "a@x.com", "role": "Developer"}));

    let (status, json) = call(&state, "GET", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email"], "a@x.com");
}

#[tokio::test]
async fn test_delete_by_role() {
    let state = app_state();
    register(&state, "ceo@x.com", "ceo-password", "CEO").await;
    register(&state, "eng@x.com", "eng-password", "Engineer").await;
    let victim = register(&state, "victim@x.com", "victim-password", "Developer").await;
    let path = format!("/api/v1/users/{}", victim);

    let engineer = login(&state, "eng@x.com", "eng-password").await;
    let (status, _) = call(&state, "DELETE", &path, Some(&engineer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let ceo = login(&state, "ceo@x.com", "ceo-password").await;
    let (status, _) = call(&state, "DELETE", &path, Some(&ceo), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&state, "GET", &path, Some(&ceo), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting twice is a miss
    let (status, _) = call(&state, "DELETE", &path, Some(&ceo), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_identity_token_is_not_found() {
    let state = app_state();
    register(&state, "ceo@x.com", "ceo-password", "CEO").await;
    let gone = register(&state, "gone@x.com", "gone-password", "Engineer").await;
    let gone_token = login(&state, "gone@x.com", "gone-password").await;
    let ceo = login(&state, "ceo@x.com", "ceo-password").await;

    let (status, _) = call(&state, "DELETE", &format!("/api/v1/users/{}", gone), Some(&ceo), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = call(&state, "GET", "/api/v1/auth/me", Some(&gone_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "User not found");
}

#[tokio::test]
async fn test_registration_errors() {
    let state = app_state();
    register(&state, "a@x.com", "first-pass", "Engineer").await;

    let (status, json) = call(
        &state,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"email": "a@x.com", "password": "second", "role": "CEO"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Email already registered");

    let (status, _) = call(
        &state,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"email": "b@x.com", "password": "pw", "role": "Admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &state,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"email": "b@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let state = app_state();
    register(&state, "a@x.com", "right-password", "Engineer").await;

    let api = routes(state.clone());
    for (email, password) in [("a@x.com", "wrong-password"), ("nobody@x.com", "right-password")] {
        let response = warp::test::request()
            .method("POST")
            .path("/api/v1/auth/token")
            .json(&json!({"email": email, "password": password}))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body(response.body())["detail"], "Invalid email or password");
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
    }
}

#[tokio::test]
async fn test_unauthenticated_requests() {
    let state = app_state();

    let (status, json) = call(&state, "GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["detail"], "Not authenticated");

    let (status, json) = call(&state, "GET", "/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["detail"], "Invalid or expired token");

    let api = routes(state.clone());
    let response = warp::test::request()
        .path("/profile")
        .header("authorization", "Basic Zm9vOmJhcg==")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(response.body())["detail"], "Invalid authentication credentials");
}

#[tokio::test]
async fn test_update_rules() {
    let state = app_state();
    let ceo_id = register(&state, "ceo@x.com", "ceo-password", "CEO").await;
    register(&state, "lead@x.com", "lead-password", "ProjectLead").await;
    let eng_id = register(&state, "eng@x.com", "eng-password", "Engineer").await;

    let lead = login(&state, "lead@x.com", "lead-password").await;
    let (status, json) = call(
        &state,
        "PATCH",
        &format!("/api/v1/users/{}", eng_id),
        Some(&lead),
        Some(json!({"role": "Developer"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["detail"], "ProjectLead cannot update users");

    let engineer = login(&state, "eng@x.com", "eng-password").await;
    let (status, _) = call(
        &state,
        "PATCH",
        &format!("/api/v1/users/{}", ceo_id),
        Some(&engineer),
        Some(json!({"email": "taken@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = call(
        &state,
        "PATCH",
        &format!("/api/v1/users/{}", eng_id),
        Some(&engineer),
        Some(json!({"email": "ceo@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Email already registered");

    let (status, json) = call(
        &state,
        "PATCH",
        &format!("/api/v1/users/{}", eng_id),
        Some(&engineer),
        Some(json!({"email": "eng2@x.com", "password": "new-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email"], "eng2@x.com");

    // The old token keeps working, and the new password is in effect
    let (status, _) = call(&state, "GET", "/api/v1/auth/me", Some(&engineer), None).await;
    assert_eq!(status, StatusCode::OK);
    login(&state, "eng2@x.com", "new-password").await;

    let ceo = login(&state, "ceo@x.com", "ceo-password").await;
    let (status, _) = call(
        &state,
        "PATCH",
        &format!("/api/v1/users/{}", eng_id),
        Some(&ceo),
        Some(json!({"role": "Overlord"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &state,
        "PATCH",
        "/api/v1/users/999",
        Some(&ceo),
        Some(json!({"role": "CTO"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_patches_do_not_overwrite_each_other() {
    let state = app_state();
    register(&state, "ceo@x.com", "ceo-password", "CEO").await;
    let target = register(&state, "t@x.com", "old-password", "Engineer").await;
    let ceo = login(&state, "ceo@x.com", "ceo-password").await;
    let path = format!("/api/v1/users/{}", target);

    let (password_patch, email_patch) = tokio::join!(
        call(
            &state,
            "PATCH",
            &path,
            Some(&ceo),
            Some(json!({"password": "brand-new-pw"})),
        ),
        call(
            &state,
            "PATCH",
            &path,
            Some(&ceo),
            Some(json!({"email": "moved@x.com"})),
        ),
    );
    assert_eq!(password_patch.0, StatusCode::OK);
    assert_eq!(email_patch.0, StatusCode::OK);

    let (status, json) = call(&state, "GET", &path, Some(&ceo), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email"], "moved@x.com");
    assert!(state.store.find_by_email("t@x.com").await.unwrap().is_none());

    login(&state, "moved@x.com", "brand-new-pw").await;
}

#[tokio::test]
async fn test_create_and_list() {
    let state = app_state();
    register(&state, "cto@x.com", "cto-password", "CTO").await;
    register(&state, "ceo@x.com", "ceo-password", "CEO").await;

    let cto = login(&state, "cto@x.com", "cto-password").await;
    let payload = json!({"email": "new@x.com", "password": "new-password", "role": "Engineer"});
    let (status, json) = call(&state, "POST", "/api/v1/users", Some(&cto), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["detail"], "CTO cannot create users");

    let ceo = login(&state, "ceo@x.com", "ceo-password").await;
    let (status, json) = call(&state, "POST", "/api/v1/users", Some(&ceo), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["role"], "Engineer");
    assert!(json.get("hashed_password").is_none());

    let (status, json) = call(&state, "GET", "/api/v1/users", Some(&cto), None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["cto@x.com", "ceo@x.com", "new@x.com"]);
}

#[tokio::test]
async fn test_admin_and_profile() {
    let state = app_state();
    register(&state, "cto@x.com", "cto-password", "CTO").await;
    register(&state, "dev@x.com", "dev-password", "Developer").await;

    let cto = login(&state, "cto@x.com", "cto-password").await;
    let (status, json) = call(&state, "GET", "/admin", Some(&cto), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Admin Access Granted: cto@x.com");

    let dev = login(&state, "dev@x.com", "dev-password").await;
    let (status, _) = call(&state, "GET", "/admin", Some(&dev), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = call(&state, "GET", "/profile", Some(&dev), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Hello dev@x.com");
    assert_eq!(json["role"], "Developer");
}

#[tokio::test]
async fn test_public_routes() {
    let state = app_state();

    let (status, json) = call(&state, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].is_string());

    let api = routes(state.clone());
    let response = warp::test::request().path("/health").reply(&api).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&response.body()[..], b"OK");

    let (status, _) = call(&state, "GET", "/does-not-exist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
