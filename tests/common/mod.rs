#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use beneficiary_api::auth::Authenticator;
use beneficiary_api::config::BeneficiaryConfig;
use beneficiary_api::database::MemoryBeneficiaryStore;
use beneficiary_api::services::BeneficiaryService;
use beneficiary_api::{router, AppState};

pub const SECRET: &str = "test-secret";
pub const TEST_EMAIL: &str = "test@test.fr";

pub struct TestApp {
    pub router: Router,
    pub auth: Authenticator,
}

/// Full router over a fresh in-memory store.
pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryBeneficiaryStore::new());
    let service = BeneficiaryService::new(store, BeneficiaryConfig::default())
        .expect("default beneficiary config is valid");
    let auth = Authenticator::new(SECRET, 1);
    let state = AppState::new(service, auth.clone());

    TestApp { router: router(state), auth }
}

impl TestApp {
    pub fn token(&self) -> String {
        self.auth.issue("testuser", Some(TEST_EMAIL)).expect("issue token")
    }

    pub fn token_for(&self, username: &str, email: Option<&str>) -> String {
        self.auth.issue(username, email).expect("issue token")
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, None, None).await
    }

    /// Create a beneficiary as the default test user and return its JSON.
    pub async fn create(&self, name: &str) -> Result<Value> {
        let token = self.token();
        let (status, body) = self
            .send(
                Method::POST,
                "/beneficiaries/",
                Some(&token),
                Some(serde_json::json!({
                    "name": name,
                    "avatar_url": "https://example.com/avatar.jpg",
                })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create failed: {} {}", status, body);
        Ok(body)
    }
}
