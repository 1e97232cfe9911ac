use std::net::TcpListener;
use std::sync::Arc;

use serde_json::{json, Value};

use auth_service::auth::sign_access;
use auth_service::configuration::JwtSettings;
use auth_service::startup::run;
use auth_service::store::{InMemoryUserStore, Role, UserStore};

pub struct TestApp {
    pub address: String,
}

fn test_jwt_settings() -> JwtSettings {
    JwtSettings {
        access_secret: "integration-access-secret-32-chars!!".to_string(),
        refresh_secret: "integration-refresh-secret-32-chars!".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
        rotate_refresh: false,
    }
}

fn spawn_app_with(jwt_config: JwtSettings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let server = run(listener, store, jwt_config).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address }
}

fn spawn_app() -> TestApp {
    spawn_app_with(test_jwt_settings())
}

async fn register_user(
    client: &reqwest::Client,
    app: &TestApp,
    email: &str,
    password: &str,
) -> Value {
    let response = client
        .post(&format!("{}/api/v1/auth/register", &app.address))
        .json(&json!({ "email": email, "password": password, "name": "Test User" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());
    response.json().await.expect("Failed to parse response")
}

// --- Registration ---

#[tokio::test]
async fn register_returns_201_and_tokens() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let body = register_user(&client, &app, "john@example.com", "secret123").await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "john@example.com");
    assert_eq!(body["data"]["user"]["name"], "Test User");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["accessToken"].is_string());
    assert!(body["data"]["refreshToken"].is_string());

    // credential hash and sessions never leave the server
    assert!(body["data"]["user"].get("password").is_none());
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["user"].get("sessions").is_none());
}

#[tokio::test]
async fn register_returns_409_for_duplicate_email() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    register_user(&client, &app, "john@example.com", "secret123").await;

    let response = client
        .post(&format!("{}/api/v1/auth/register", &app.address))
        .json(&json!({ "email": "john@example.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(409, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn register_returns_400_with_field_errors() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/v1/auth/register", &app.address))
        .json(&json!({ "email": "notanemail", "password": "12345" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);

    let errors = body["errors"].as_array().expect("No errors array");
    let fields: Vec<&str> = errors
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn register_returns_400_for_missing_fields() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let test_cases = vec![
        (json!({ "password": "secret123" }), "missing email"),
        (json!({ "email": "a@x.com" }), "missing password"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = client
            .post(&format!("{}/api/v1/auth/register", &app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(
            400,
            response.status().as_u16(),
            "Should reject request: {}",
            reason
        );
    }
}

#[tokio::test]
async fn register_normalizes_email() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/v1/auth/register", &app.address))
        .json(&json!({ "email": "  John@Example.COM ", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["email"], "john@example.com");
}

#[tokio::test]
async fn register_honors_admin_role() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/v1/auth/register", &app.address))
        .json(&json!({ "email": "root@example.com", "password": "secret123", "role": "admin" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["role"], "admin");

    // unknown roles are a validation error
    let response = client
        .post(&format!("{}/api/v1/auth/register", &app.address))
        .json(&json!({ "email": "b@example.com", "password": "secret123", "role": "superuser" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(400, response.status().as_u16());
}

// --- Login ---

#[tokio::test]
async fn login_returns_200_and_identify_matches_account() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&client, &app, "john@example.com", "secret123").await;
    let account_id = registered["data"]["user"]["id"].as_str().unwrap();

    let response = client
        .post(&format!("{}/api/v1/auth/login", &app.address))
        .json(&json!({ "email": "john@example.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    let access_token = body["data"]["accessToken"].as_str().unwrap();

    let me = client
        .get(&format!("{}/api/v1/auth/me", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, me.status().as_u16());
    let me_body: Value = me.json().await.expect("Failed to parse response");
    assert_eq!(me_body["data"]["id"], account_id);
    assert_eq!(me_body["data"]["email"], "john@example.com");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    register_user(&client, &app, "john@example.com", "secret123").await;

    let wrong_password = client
        .post(&format!("{}/api/v1/auth/login", &app.address))
        .json(&json!({ "email": "john@example.com", "password": "wrongpass" }))
        .send()
        .await
        .expect("Failed to execute request.");

    let unknown_email = client
        .post(&format!("{}/api/v1/auth/login", &app.address))
        .json(&json!({ "email": "nobody@example.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["message"], b["message"], "messages must not leak which check failed");
}

#[tokio::test]
async fn login_supersedes_previously_issued_refresh_tokens() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&client, &app, "john@example.com", "secret123").await;
    let old_refresh = registered["data"]["refreshToken"].as_str().unwrap();

    let login: Value = client
        .post(&format!("{}/api/v1/auth/login", &app.address))
        .json(&json!({ "email": "john@example.com", "password": "secret123" }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .unwrap();
    assert!(login["data"]["refreshToken"].is_string());

    // the registration-issued token was replaced; presenting it is reuse
    let response = client
        .post(&format!("{}/api/v1/auth/refresh", &app.address))
        .json(&json!({ "refreshToken": old_refresh }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- Refresh ---

#[tokio::test]
async fn refresh_is_idempotent_and_yields_usable_access_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&client, &app, "john@example.com", "secret123").await;
    let refresh_token = registered["data"]["refreshToken"].as_str().unwrap();

    for _ in 0..3 {
        let response = client
            .post(&format!("{}/api/v1/auth/refresh", &app.address))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");

        // no rotation: the same refresh token is handed back each time
        assert_eq!(body["data"]["refreshToken"], refresh_token);

        let access_token = body["data"]["accessToken"].as_str().unwrap();
        let me = client
            .get(&format!("{}/api/v1/auth/me", &app.address))
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(200, me.status().as_u16());
    }
}

#[tokio::test]
async fn refresh_returns_401_for_garbage_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/v1/auth/refresh", &app.address))
        .json(&json!({ "refreshToken": "definitely.not.valid" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn refresh_returns_400_for_missing_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/v1/auth/refresh", &app.address))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn refresh_rotates_when_configured() {
    let mut jwt_config = test_jwt_settings();
    jwt_config.rotate_refresh = true;
    let app = spawn_app_with(jwt_config);
    let client = reqwest::Client::new();

    let registered = register_user(&client, &app, "john@example.com", "secret123").await;
    let old_refresh = registered["data"]["refreshToken"].as_str().unwrap();

    let response = client
        .post(&format!("{}/api/v1/auth/refresh", &app.address))
        .json(&json!({ "refreshToken": old_refresh }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    let new_refresh = body["data"]["refreshToken"].as_str().unwrap();
    assert_ne!(old_refresh, new_refresh, "Refresh token should rotate");

    // consumed token is rejected on replay
    let replay = client
        .post(&format!("{}/api/v1/auth/refresh", &app.address))
        .json(&json!({ "refreshToken": old_refresh }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, replay.status().as_u16());
}

// --- Logout ---

#[tokio::test]
async fn logout_revokes_refresh_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&client, &app, "john@example.com", "secret123").await;
    let refresh_token = registered["data"]["refreshToken"].as_str().unwrap();

    let response = client
        .post(&format!("{}/api/v1/auth/logout", &app.address))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Logged out");

    let refresh = client
        .post(&format!("{}/api/v1/auth/refresh", &app.address))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, refresh.status().as_u16());
}

#[tokio::test]
async fn logout_always_succeeds_even_for_garbage_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/v1/auth/logout", &app.address))
        .json(&json!({ "refreshToken": "garbage" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Logged out");
}

// --- Protected route ---

#[tokio::test]
async fn me_returns_401_without_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/v1/auth/me", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No token provided");
}

#[tokio::test]
async fn me_rejects_malformed_authorization_header() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let malformed_headers = vec!["Bearer", "Basic dXNlcjpwYXNz", "BearerToken", "Bearer "];

    for header in malformed_headers {
        let response = client
            .get(&format!("{}/api/v1/auth/me", &app.address))
            .header("Authorization", header)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(
            401,
            response.status().as_u16(),
            "Should reject malformed header: {}",
            header
        );
    }
}

#[tokio::test]
async fn me_rejects_tampered_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&client, &app, "john@example.com", "secret123").await;
    let access_token = registered["data"]["accessToken"].as_str().unwrap();

    let response = client
        .get(&format!("{}/api/v1/auth/me", &app.address))
        .header("Authorization", format!("Bearer {}X", access_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn me_returns_404_for_deleted_account() {
    // well-formed, unexpired token whose account the store has never held:
    // the cryptographic gate passes, the account lookup does not
    let app = spawn_app();
    let client = reqwest::Client::new();

    let access_token = sign_access(
        uuid::Uuid::new_v4(),
        "ghost@example.com",
        Role::User,
        &test_jwt_settings(),
    )
    .expect("Failed to sign token");

    let response = client
        .get(&format!("{}/api/v1/auth/me", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn empty_bearer_token_fails_verification_not_format() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    // "Bearer " carries an (empty) token: it reaches verification
    let response = client
        .get(&format!("{}/api/v1/auth/me", &app.address))
        .header("Authorization", "Bearer ")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid or expired token");

    // no "Bearer " prefix at all is a format error
    let response = client
        .get(&format!("{}/api/v1/auth/me", &app.address))
        .header("Authorization", "BearerToken")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid token format");
}

#[tokio::test]
async fn access_token_stays_valid_after_logout() {
    // access validity is purely cryptographic; revocation latency is
    // bounded by the access TTL, not instant
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&client, &app, "john@example.com", "secret123").await;
    let access_token = registered["data"]["accessToken"].as_str().unwrap();
    let refresh_token = registered["data"]["refreshToken"].as_str().unwrap();

    client
        .post(&format!("{}/api/v1/auth/logout", &app.address))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request.");

    let response = client
        .get(&format!("{}/api/v1/auth/me", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

// --- Health ---

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "auth-service");
}

// --- Full lifecycle ---

#[tokio::test]
async fn full_session_lifecycle() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    // register
    let response = client
        .post(&format!("{}/api/v1/auth/register", &app.address))
        .json(&json!({ "email": "a@x.com", "password": "secret1" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["user"]["email"], "a@x.com");
    assert!(body["data"]["user"].get("password").is_none());

    // login
    let response = client
        .post(&format!("{}/api/v1/auth/login", &app.address))
        .json(&json!({ "email": "a@x.com", "password": "secret1" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let access_token = body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh_token = body["data"]["refreshToken"].as_str().unwrap().to_string();

    // who am I
    let response = client
        .get(&format!("{}/api/v1/auth/me", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["email"], "a@x.com");

    // logout
    let response = client
        .post(&format!("{}/api/v1/auth/logout", &app.address))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Logged out");

    // refresh with the revoked token
    let response = client
        .post(&format!("{}/api/v1/auth/refresh", &app.address))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
}
