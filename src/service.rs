//! Query service: resolve a source, acquire its collection, filter, and wrap
//! the result in a response envelope.

use crate::cache::{CacheInfo, EventCache, EventCollection};
use crate::constants::{FALLBACK_SUFFIX, MAX_PARAM_LEN, STALE_SUFFIX};
use crate::envelope::{timestamp_now, HealthEnvelope, ResponseEnvelope};
use crate::error::{FinderError, Result};
use crate::filter::{filter_events, filter_psy_events, FilterParams};
use crate::metrics;
use crate::refresh::Refresher;
use crate::sources::{ConfiguredSource, SourceRegistry};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Query string as received, every field optional and unparsed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchParams {
    pub query: Option<String>,
    pub location: Option<String>,
    pub genre: Option<String>,
    pub source: Option<String>,
    pub force_refresh: Option<String>,
    pub psy: Option<String>,
}

/// Validated query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub filter: FilterParams,
    pub source: Option<String>,
    pub force_refresh: bool,
    /// Override the source's Psy keyword screen; `None` keeps its default.
    pub psy: Option<bool>,
}

impl TryFrom<RawSearchParams> for SearchRequest {
    type Error = FinderError;

    fn try_from(raw: RawSearchParams) -> Result<Self> {
        for (name, value) in [
            ("query", &raw.query),
            ("location", &raw.location),
            ("genre", &raw.genre),
            ("source", &raw.source),
        ] {
            if let Some(value) = value {
                check_text(name, value)?;
            }
        }
        let force_refresh = match raw.force_refresh.as_deref() {
            Some(value) => parse_flag("force_refresh", value)?,
            None => false,
        };
        let psy = raw
            .psy
            .as_deref()
            .map(|value| parse_flag("psy", value))
            .transpose()?;
        Ok(Self {
            filter: FilterParams {
                query: raw.query,
                location: raw.location,
                genre: raw.genre,
            },
            source: raw.source,
            force_refresh,
            psy,
        })
    }
}

fn check_text(name: &str, value: &str) -> Result<()> {
    if value.chars().count() > MAX_PARAM_LEN {
        return Err(FinderError::Validation(format!(
            "{name} is longer than {MAX_PARAM_LEN} characters"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(FinderError::Validation(format!(
            "{name} contains control characters"
        )));
    }
    Ok(())
}

/// Boolean query flag; an empty value counts as "set".
pub fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(FinderError::Validation(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

/// Where an answer's collection came from.
struct Acquired {
    events: EventCollection,
    cached: bool,
    label_suffix: Option<&'static str>,
    warning: Option<String>,
}

pub struct QueryService {
    registry: Arc<SourceRegistry>,
    cache: Arc<EventCache>,
    refresher: Refresher,
}

impl QueryService {
    pub fn new(registry: SourceRegistry, cache: EventCache) -> Self {
        Self {
            registry: Arc::new(registry),
            cache: Arc::new(cache),
            refresher: Refresher::new(),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Answer one query.
    #[instrument(skip(self, request), fields(request_id = %uuid::Uuid::new_v4()))]
    pub async fn search(&self, request: SearchRequest) -> Result<ResponseEnvelope> {
        let source = match self.registry.resolve(request.source.as_deref()) {
            Ok(source) => source,
            Err(e) => {
                metrics::record_validation_error();
                return Err(e);
            }
        };
        metrics::record_query(source.name());

        let acquired = self.collection(&source, request.force_refresh).await?;

        let psy_screen = request.psy.unwrap_or(source.settings().psy_only);
        let events = if psy_screen {
            filter_events(&filter_psy_events(&acquired.events), &request.filter)
        } else {
            filter_events(&acquired.events, &request.filter)
        };
        info!(
            source = source.name(),
            total = events.len(),
            "Returning {} of {} events",
            events.len(),
            acquired.events.len()
        );

        let label = match acquired.label_suffix {
            Some(suffix) => format!("{}{}", source.label(), suffix),
            None => source.label().to_string(),
        };
        let mut envelope = ResponseEnvelope::new(events, label).with_cached(acquired.cached);
        if let Some(warning) = acquired.warning {
            envelope = envelope.with_warning(warning);
        }
        Ok(envelope)
    }

    async fn collection(&self, source: &ConfiguredSource, force_refresh: bool) -> Result<Acquired> {
        let name = source.name();
        if !force_refresh {
            if let Some(events) = self.cache.get(name) {
                metrics::record_cache(name, true);
                return Ok(Acquired {
                    events,
                    cached: true,
                    label_suffix: None,
                    warning: None,
                });
            }
            metrics::record_cache(name, false);
        }

        match source.acquire(force_refresh).await {
            Ok(events) => {
                let events: EventCollection = Arc::new(events);
                self.cache.put(name, events.clone(), source.settings().ttl);
                Ok(Acquired {
                    events,
                    cached: false,
                    label_suffix: None,
                    warning: None,
                })
            }
            Err(e) => self.degrade(source, e),
        }
    }

    /// Answer from a stale copy or the fallback dataset after a failed
    /// acquisition, or give up.
    fn degrade(&self, source: &ConfiguredSource, error: FinderError) -> Result<Acquired> {
        let name = source.name();
        warn!(source = name, error = %error, "Acquisition failed");

        if let Some(events) = self.cache.get_stale(name) {
            metrics::record_fallback(name);
            return Ok(Acquired {
                events,
                cached: true,
                label_suffix: Some(STALE_SUFFIX),
                warning: Some(format!("Error occurred, returning cached data: {error}")),
            });
        }
        if let Some(events) = source.fallback_events() {
            metrics::record_fallback(name);
            return Ok(Acquired {
                events: Arc::new(events),
                cached: false,
                label_suffix: Some(FALLBACK_SUFFIX),
                warning: Some(format!("Error occurred, returning fallback data: {error}")),
            });
        }

        metrics::record_failure(name);
        Err(match error {
            e @ FinderError::UpstreamUnavailable { .. } => e,
            other => FinderError::upstream(name, other.to_string()),
        })
    }

    /// Reacquire one source (or all), returning how many were refreshed.
    /// A failed source keeps its previous cache entry for stale answers.
    pub async fn refresh(&self, selector: Option<&str>) -> Result<usize> {
        let targets: Vec<Arc<ConfiguredSource>> = match selector {
            Some(name) => vec![self.registry.resolve(Some(name))?],
            None => self.registry.all().cloned().collect(),
        };

        let mut refreshed = 0;
        for source in targets {
            match source.acquire(true).await {
                Ok(events) => {
                    info!("Refreshed {} with {} events", source.name(), events.len());
                    self.cache
                        .put(source.name(), Arc::new(events), source.settings().ttl);
                    refreshed += 1;
                }
                Err(e) => warn!("Refresh of {} failed: {}", source.name(), e),
            }
        }
        Ok(refreshed)
    }

    /// Schedule a background refresh. Returns whether a new job started;
    /// unknown source names are rejected before anything is scheduled.
    pub fn trigger_refresh(self: &Arc<Self>, selector: Option<String>) -> Result<bool> {
        let selector = selector.filter(|s| !s.trim().is_empty());
        if let Some(name) = selector.as_deref() {
            self.registry.resolve(Some(name))?;
        }
        let service = Arc::clone(self);
        let scheduled = self.refresher.trigger(async move {
            if let Err(e) = service.refresh(selector.as_deref()).await {
                warn!("Background refresh failed: {}", e);
            }
        });
        if scheduled {
            metrics::record_refresh_started();
        }
        Ok(scheduled)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresher.is_running()
    }

    pub fn cache_info(&self) -> CacheInfo {
        self.cache.info()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn health(&self) -> HealthEnvelope {
        HealthEnvelope {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: timestamp_now(),
            events_cached: self.cache.cached_event_count(),
            refresh_active: self.is_refreshing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(force_refresh: Option<&str>) -> RawSearchParams {
        RawSearchParams {
            force_refresh: force_refresh.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn flags_accept_common_spellings() {
        for (value, want) in [("true", true), ("1", true), ("YES", true), ("", true), ("false", false), ("0", false)] {
            assert_eq!(parse_flag("force_refresh", value).unwrap(), want, "{value}");
        }
        assert!(parse_flag("force_refresh", "maybe").is_err());
    }

    #[test]
    fn malformed_force_refresh_is_a_validation_error() {
        assert!(matches!(
            SearchRequest::try_from(raw(Some("sometimes"))),
            Err(FinderError::Validation(_))
        ));
        assert!(!SearchRequest::try_from(raw(None)).unwrap().force_refresh);
    }

    #[test]
    fn psy_screen_override_is_parsed() {
        let off = RawSearchParams {
            psy: Some("false".into()),
            ..Default::default()
        };
        assert_eq!(SearchRequest::try_from(off).unwrap().psy, Some(false));
        assert_eq!(SearchRequest::try_from(raw(None)).unwrap().psy, None);

        let bad = RawSearchParams {
            psy: Some("maybe".into()),
            ..Default::default()
        };
        match SearchRequest::try_from(bad) {
            Err(FinderError::Validation(message)) => assert!(message.contains("psy")),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn overlong_text_is_rejected() {
        let params = RawSearchParams {
            query: Some("x".repeat(MAX_PARAM_LEN + 1)),
            ..Default::default()
        };
        assert!(SearchRequest::try_from(params).is_err());
    }

    #[test]
    fn control_characters_are_rejected() {
        let params = RawSearchParams {
            location: Some("Tokyo\u{0}".into()),
            ..Default::default()
        };
        assert!(SearchRequest::try_from(params).is_err());
    }
}
