use super::file::raw_records;
use super::EventSource;
use crate::adapters::{adapt_batch, RawEventData};
use crate::error::{FinderError, Result};
use crate::types::EventRecord;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Pulls a collection from an upstream service that speaks the same
/// `/events` contract (a cache-backed collector service, or another
/// instance of this one).
pub struct RemoteSource {
    name: String,
    label: String,
    events_url: String,
    /// Name the upstream knows the collection by
    upstream_source: String,
    client: reqwest::Client,
}

impl RemoteSource {
    pub fn new(
        name: &str,
        label: &str,
        base_url: &str,
        upstream_source: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("psyfinder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            name: name.to_string(),
            label: label.to_string(),
            events_url: format!("{}/events", base_url.trim_end_matches('/')),
            upstream_source: upstream_source.to_string(),
            client,
        })
    }
}

#[async_trait]
impl EventSource for RemoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self), fields(source = %self.name, upstream = %self.upstream_source, url = %self.events_url))]
    async fn fetch_events(&self, force_refresh: bool) -> Result<Vec<EventRecord>> {
        let force = if force_refresh { "true" } else { "false" };
        let response = self
            .client
            .get(&self.events_url)
            .query(&[("source", self.upstream_source.as_str()), ("force_refresh", force)])
            .send()
            .await
            .map_err(|e| FinderError::upstream(&self.name, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FinderError::upstream(
                &self.name,
                format!("upstream answered {status}"),
            ));
        }

        let document: RawEventData = response
            .json()
            .await
            .map_err(|e| FinderError::upstream(&self.name, format!("malformed response: {e}")))?;
        if document["success"].as_bool() == Some(false) {
            let reason = document["error"].as_str().unwrap_or("upstream reported failure");
            return Err(FinderError::upstream(&self.name, reason));
        }

        let raws = raw_records(document)
            .ok_or_else(|| FinderError::upstream(&self.name, "response has no event list"))?;
        let batch = adapt_batch(&raws);
        for (index, reason) in &batch.rejected {
            warn!("Skipping upstream record {}: {}", index, reason);
        }
        debug!("Fetched {} events from upstream", batch.records.len());
        Ok(batch.records)
    }
}
