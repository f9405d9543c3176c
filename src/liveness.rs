use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::{config::LivenessConfig, domain::LivenessOutcome};

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn check(&self, raw_url: &str) -> LivenessOutcome;
}

pub struct HttpLivenessProbe {
    client: Client,
    timeout: Duration,
}

impl HttpLivenessProbe {
    pub fn new(client: Client, config: &LivenessConfig) -> Self {
        Self {
            client,
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl LivenessProbe for HttpLivenessProbe {
    async fn check(&self, raw_url: &str) -> LivenessOutcome {
        let url = match Url::parse(raw_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                debug!(target: "liveness", url = raw_url, "not an http(s) url");
                return LivenessOutcome::Unreachable;
            }
        };

        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(
                    target: "liveness",
                    url = raw_url,
                    timeout = err.is_timeout(),
                    error = %err,
                    "probe failed"
                );
                return LivenessOutcome::Unreachable;
            }
        };

        match response.status() {
            StatusCode::OK => LivenessOutcome::Ok,
            status => {
                debug!(target: "liveness", url = raw_url, status = status.as_u16(), "non-200 status");
                LivenessOutcome::NonOkStatus(status.as_u16())
            }
        }
    }
}
