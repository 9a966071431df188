#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

use eventy_server::auth::{Claims, JwtVerifier, RealmAccess};
use eventy_server::repository::InMemoryStore;
use eventy_server::routes::{create_routes, RouterOptions};
use eventy_server::state::AppState;

pub const SECRET: &str = "integration-test-secret-at-least-32-chars";

pub struct TestApp {
    router: Router,
    pub admin_id: Uuid,
    pub user_id: Uuid,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_date_order_check(false)
    }

    pub fn with_date_order_check(enforce: bool) -> Self {
        let state = AppState::new(
            Arc::new(InMemoryStore::new()),
            JwtVerifier::hs256(SECRET),
            enforce,
        );

        Self {
            router: create_routes(state, &RouterOptions::default()),
            admin_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        }
    }

    pub fn admin_token(&self) -> String {
        token(&self.admin_id.to_string(), &["admin"])
    }

    pub fn user_token(&self) -> String {
        token(&self.user_id.to_string(), &["user"])
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    /// Creates an event as admin and returns its JSON.
    pub async fn create_event(&self, body: Value) -> Value {
        let (status, json) = self
            .send(Method::POST, "/events", Some(&self.admin_token()), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
        json
    }

    /// Creates a catalog entry as admin and returns its id.
    pub async fn create_label(&self, collection: &str, label: &str) -> String {
        let (status, json) = self
            .send(
                Method::POST,
                collection,
                Some(&self.admin_token()),
                Some(serde_json::json!({ "label": label })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
        json["id"].as_str().unwrap().to_string()
    }
}

pub fn token(subject: &str, realm_roles: &[&str]) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        realm_access: Some(RealmAccess {
            roles: realm_roles.iter().map(|r| r.to_string()).collect(),
        }),
        ..Default::default()
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// A minimal valid event payload starting `days_ahead` days from now.
pub fn event_body(name: &str, location: &str, days_ahead: i64) -> Value {
    let start = chrono::Utc::now() + chrono::Duration::days(days_ahead);
    serde_json::json!({
        "name": name,
        "startDate": start,
        "endDate": start + chrono::Duration::hours(3),
        "location": location,
    })
}

pub fn names(events: &Value) -> Vec<String> {
    events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect()
}
