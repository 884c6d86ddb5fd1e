//! Shared helpers for the API tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use warden_api::{AppState, build_app};
use warden_auth::PasswordHasher;
use warden_core::config::{AppConfig, DatabaseProvider};
use warden_core::result::AppResult;
use warden_core::types::UserId;
use warden_database::store::{RoleStore, UserStore};
use warden_database::{MemoryStore, Stores};
use warden_entity::user::{CreateUser, User};
use warden_service::password::ResetDelivery;

/// Captures reset tokens instead of sending them.
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
}

impl Outbox {
    /// The last token sent to `email`.
    pub fn token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .expect("outbox lock")
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    pub fn len(&self) -> usize {
        self.sent.lock().expect("outbox lock").len()
    }
}

#[async_trait]
impl ResetDelivery for Outbox {
    async fn deliver(&self, user: &User, token: &str) -> AppResult<()> {
        self.sent
            .lock()
            .expect("outbox lock")
            .push((user.email.clone(), token.to_string()));
        Ok(())
    }
}

/// Test application over a seeded in-memory store.
pub struct TestApp {
    pub router: Router,
    pub memory: MemoryStore,
    pub outbox: Arc<Outbox>,
    pub state: AppState,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// `body.data`.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `body.error`.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "api-test-secret".to_string();
        config.database.provider = DatabaseProvider::Memory;

        let memory = MemoryStore::seeded();
        let outbox = Arc::new(Outbox::default());
        let state = AppState::with_delivery(
            config,
            Stores::memory(memory.clone()),
            None,
            outbox.clone(),
        );

        Self {
            router: build_app(state.clone()),
            memory,
            outbox,
            state,
        }
    }

    /// Insert an active user with `role`; email is `{username}@example.com`.
    pub async fn create_user(&self, role: &str, username: &str, password: &str) -> UserId {
        let role = RoleStore::find_by_name(&self.memory, role)
            .await
            .expect("role lookup")
            .expect("seeded role");
        UserStore::create(
            &self.memory,
            &CreateUser {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                password_hash: PasswordHasher::new().hash_password(password).expect("hash"),
                first_name: username.to_string(),
                last_name: "Test".to_string(),
                role_id: role.id,
            },
        )
        .await
        .expect("create user")
        .id
    }

    /// Log in and return the response.
    pub async fn login_response(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": email, "password": password })),
            None,
        )
        .await
    }

    /// Log in and return the access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .login_response(&format!("{username}@example.com"), password)
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.data()["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    /// Create a user and log it in.
    pub async fn user_with_token(&self, role: &str, username: &str) -> (UserId, String) {
        let id = self.create_user(role, username, "password123").await;
        let token = self.login(username, "password123").await;
        (id, token)
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req.body(Body::from(body_str)).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}
