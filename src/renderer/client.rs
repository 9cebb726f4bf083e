use super::view::RenderOutcome;
use crate::error::Result;
use crate::service::SearchRequest;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the `/events` endpoint.
pub struct EventsClient {
    client: Client,
    base_url: String,
}

impl EventsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("psyfinder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query string for `request`; blank parameters are left out.
    pub fn query_pairs(request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for (name, value) in [
            ("query", &request.filter.query),
            ("location", &request.filter.location),
            ("genre", &request.filter.genre),
            ("source", &request.source),
        ] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((name, value.to_string()));
            }
        }
        if request.force_refresh {
            pairs.push(("force_refresh", "true".to_string()));
        }
        if let Some(psy) = request.psy {
            pairs.push(("psy", psy.to_string()));
        }
        pairs
    }

    /// Run one query. Transport and decoding failures become an error
    /// outcome; this never returns `Err`.
    pub async fn fetch(&self, request: &SearchRequest) -> RenderOutcome {
        let url = format!("{}/events", self.base_url);
        let response = match self
            .client
            .get(&url)
            .query(&Self::query_pairs(request))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                return RenderOutcome::error(format!("Could not reach the event service: {e}"));
            }
        };

        let status = response.status();
        debug!("GET {} -> {}", url, status);
        match response.json::<serde_json::Value>().await {
            Ok(body) => RenderOutcome::from_body(&body),
            Err(e) => {
                warn!("Undecodable response from {} ({}): {}", url, status, e);
                RenderOutcome::error(format!("Unexpected response from the event service ({status})"))
            }
        }
    }
}
