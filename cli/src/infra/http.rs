//! HTTP infrastructure — implements `HttpProbe` with reqwest.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{HttpProbe, HttpResponse};
use crate::domain::ProbeError;

/// Production probe. Each request is bounded by the client timeout so a
/// hung endpoint counts as one failed attempt.
pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lambda-api-verify/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::UnreadableBody {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        tracing::debug!(url, status, "probe response");
        Ok(HttpResponse { status, body })
    }
}
