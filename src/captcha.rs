use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::RecaptchaConfig;

pub const VERIFIED_COOKIE: &str = "recaptcha_verified";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Please complete the reCAPTCHA.")]
    Missing,
    #[error("reCAPTCHA verification failed.")]
    Failed,
    #[error("Failed to verify reCAPTCHA. Please try again later.")]
    UpstreamUnavailable,
}

/// Proof of a passed challenge; rendered into the `Set-Cookie` header of the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCookie {
    max_age: Duration,
}

impl VerifiedCookie {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn header_value(&self) -> String {
        format!(
            "{VERIFIED_COOKIE}=true; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.max_age.as_secs()
        )
    }
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: Option<&str>) -> Result<VerifiedCookie, GateError>;
}

pub struct RecaptchaClient {
    http: Client,
    config: RecaptchaConfig,
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

impl RecaptchaClient {
    pub fn new(http: Client, config: RecaptchaConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaClient {
    async fn verify(&self, token: Option<&str>) -> Result<VerifiedCookie, GateError> {
        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(GateError::Missing),
        };

        let response = self
            .http
            .post(&self.config.verify_url)
            .timeout(self.config.timeout)
            .form(&[
                ("secret", self.config.secret_key.as_str()),
                ("response", token),
            ])
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(target: "captcha", error = %err, "siteverify request failed");
                GateError::UpstreamUnavailable
            })?;

        if !response.status().is_success() {
            tracing::warn!(
                target: "captcha",
                status = response.status().as_u16(),
                "siteverify returned non-success status"
            );
            return Err(GateError::Failed);
        }

        let result: SiteVerifyResponse = response.json().await.map_err(|err| {
            tracing::warn!(target: "captcha", error = %err, "unreadable siteverify response");
            GateError::UpstreamUnavailable
        })?;

        if result.success {
            tracing::info!(target: "captcha", "client verified");
            Ok(VerifiedCookie::new(self.config.cookie_max_age))
        } else {
            tracing::info!(target: "captcha", errors = ?result.error_codes, "verification rejected");
            Err(GateError::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::post, Form, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    use super::*;

    async fn siteverify(
        Form(form): Form<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if form.get("secret").map(String::as_str) != Some("captcha-secret") {
            return (
                StatusCode::OK,
                Json(json!({ "success": false, "error-codes": ["invalid-input-secret"] })),
            );
        }
        match form.get("response").map(String::as_str) {
            Some("good-token") => (StatusCode::OK, Json(json!({ "success": true }))),
            Some("broken-upstream") => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
            _ => (
                StatusCode::OK,
                Json(json!({ "success": false, "error-codes": ["invalid-input-response"] })),
            ),
        }
    }

    fn client_for(verify_url: String) -> RecaptchaClient {
        let mut config = crate::config::AppConfig::for_tests().recaptcha;
        config.verify_url = verify_url;
        config.timeout = Duration::from_secs(2);
        RecaptchaClient::new(Client::builder().no_proxy().build().unwrap(), config)
    }

    async fn spawn_siteverify() -> String {
        let app = Router::new().route("/siteverify", post(siteverify));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/siteverify")
    }

    #[tokio::test]
    async fn missing_token_never_calls_upstream() {
        let client = client_for("http://127.0.0.1:9/unused".to_string());
        assert_eq!(client.verify(None).await, Err(GateError::Missing));
        assert_eq!(client.verify(Some("")).await, Err(GateError::Missing));
    }

    #[tokio::test]
    async fn accepted_token_yields_cookie() {
        let client = client_for(spawn_siteverify().await);
        let cookie = client.verify(Some("good-token")).await.unwrap();
        assert_eq!(
            cookie.header_value(),
            "recaptcha_verified=true; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
    }

    #[tokio::test]
    async fn rejected_token_and_error_status_fail() {
        let client = client_for(spawn_siteverify().await);
        assert_eq!(client.verify(Some("bad-token")).await, Err(GateError::Failed));
        assert_eq!(
            client.verify(Some("broken-upstream")).await,
            Err(GateError::Failed)
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_upstream_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}/siteverify"));
        assert_eq!(
            client.verify(Some("good-token")).await,
            Err(GateError::UpstreamUnavailable)
        );
    }
}
