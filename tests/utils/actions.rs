#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

/// Status and decoded JSON body of one request
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a request through the full router
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn signup(&self, email: &str, password: &str, name: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(json!({ "email": email, "password": password, "name": name })),
        )
        .await
    }

    pub async fn signin(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/v1/auth/signin",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refreshToken": refresh_token })),
        )
        .await
    }

    pub async fn logout(&self, refresh_token: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/v1/auth/logout",
            None,
            Some(json!({ "refreshToken": refresh_token })),
        )
        .await
    }

    /// Sign up and sign in, returning the session body
    pub async fn registered_session(&self, email: &str, password: &str) -> Value {
        let signup = self.signup(email, password, "Test User").await;
        assert_eq!(signup.status, StatusCode::CREATED, "signup failed: {}", signup.body);

        let signin = self.signin(email, password).await;
        assert_eq!(signin.status, StatusCode::OK, "signin failed: {}", signin.body);
        signin.body
    }

    pub async fn create_category(&self, access_token: &str, name: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/v1/categories",
            Some(access_token),
            Some(json!({ "name": name })),
        )
        .await
    }

    pub async fn create_post(
        &self,
        access_token: &str,
        category_id: &str,
        title: &str,
    ) -> TestResponse {
        self.send(
            "POST",
            "/api/v1/posts",
            Some(access_token),
            Some(json!({ "title": title, "content": "Body text", "categoryId": category_id })),
        )
        .await
    }

    pub async fn list_posts(&self, query: &str) -> TestResponse {
        self.send("GET", &format!("/api/v1/posts{}", query), None, None)
            .await
    }
}
