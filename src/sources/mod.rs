//! Event sources: the strategies a `source` selector resolves to.

pub mod builtin;
pub mod file;
pub mod remote;

use crate::config::{Config, SourceBackend, SourceConfig};
use crate::constants::get_supported_sources;
use crate::error::{FinderError, Result};
use crate::types::EventRecord;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

pub use builtin::BuiltinSource;
pub use file::FileSource;
pub use remote::RemoteSource;

/// Core trait that all event data sources must implement
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Name callers select this source by
    fn name(&self) -> &str;

    /// Identifier reported in the response envelope
    fn label(&self) -> &str;

    /// Produce the full, unfiltered collection. `force_refresh` asks any
    /// upstream cache to be bypassed as well.
    async fn fetch_events(&self, force_refresh: bool) -> Result<Vec<EventRecord>>;
}

/// Per-source policy layered over a strategy.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub ttl: Option<Duration>,
    pub psy_only: bool,
    pub fallback: bool,
    pub limit: Option<usize>,
    /// Built-in dataset used as fallback; `None` means the source name
    pub dataset: Option<String>,
}

impl From<&SourceConfig> for SourceSettings {
    fn from(config: &SourceConfig) -> Self {
        Self {
            ttl: config.ttl_secs.map(Duration::from_secs),
            psy_only: config.psy_only,
            fallback: config.fallback,
            limit: config.limit,
            dataset: config.dataset.clone(),
        }
    }
}

pub struct ConfiguredSource {
    strategy: Box<dyn EventSource>,
    settings: SourceSettings,
}

impl ConfiguredSource {
    pub fn new(strategy: Box<dyn EventSource>, settings: SourceSettings) -> Self {
        Self { strategy, settings }
    }

    pub fn name(&self) -> &str {
        self.strategy.name()
    }

    pub fn label(&self) -> &str {
        self.strategy.label()
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    /// Acquire and prepare the collection.
    pub async fn acquire(&self, force_refresh: bool) -> Result<Vec<EventRecord>> {
        let events = self.strategy.fetch_events(force_refresh).await?;
        Ok(prepare_collection(events, self.settings.limit))
    }

    /// Built-in replacement data, when this source allows falling back.
    pub fn fallback_events(&self) -> Option<Vec<EventRecord>> {
        if !self.settings.fallback {
            return None;
        }
        let dataset = self.settings.dataset.as_deref().unwrap_or(self.name());
        builtin::dataset_for(dataset).map(|events| prepare_collection(events, self.settings.limit))
    }
}

/// Drop repeated `(title, date)` pairs, order by date (stable for equal
/// dates) and cap the length.
pub fn prepare_collection(events: Vec<EventRecord>, limit: Option<usize>) -> Vec<EventRecord> {
    let mut seen = HashSet::new();
    let mut unique: Vec<EventRecord> = Vec::with_capacity(events.len());
    for event in events {
        let (title, date) = event.identity();
        if seen.insert((title.to_string(), date)) {
            unique.push(event);
        }
    }
    unique.sort_by_key(|event| event.date());
    if let Some(limit) = limit {
        unique.truncate(limit);
    }
    unique
}

/// Named sources plus the default used when a request names none.
pub struct SourceRegistry {
    sources: BTreeMap<String, Arc<ConfiguredSource>>,
    default_source: String,
}

impl SourceRegistry {
    pub fn new(default_source: &str) -> Self {
        Self {
            sources: BTreeMap::new(),
            default_source: default_source.to_string(),
        }
    }

    pub fn register(&mut self, source: ConfiguredSource) {
        self.sources
            .insert(source.name().to_string(), Arc::new(source));
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new(&config.query.default_source);
        for (name, source_config) in &config.sources {
            let label = source_config.label.clone().unwrap_or_else(|| name.clone());
            if let Some(dataset) = &source_config.dataset {
                if builtin::dataset_for(dataset).is_none() {
                    return Err(FinderError::Config(format!(
                        "source '{name}' names unknown dataset '{dataset}'; built-in datasets: {}",
                        get_supported_sources().join(", ")
                    )));
                }
            }
            let strategy: Box<dyn EventSource> = match source_config.backend {
                SourceBackend::Builtin => {
                    let dataset = source_config.dataset.as_deref().unwrap_or(name);
                    if builtin::dataset_for(dataset).is_none() {
                        return Err(FinderError::Config(format!(
                            "builtin source '{name}' has no dataset; set `dataset` to one of: {}",
                            get_supported_sources().join(", ")
                        )));
                    }
                    Box::new(BuiltinSource::new(name, &label, dataset))
                }
                SourceBackend::File => {
                    let path = source_config.path.clone().ok_or_else(|| {
                        FinderError::Config(format!("source '{name}' has no path"))
                    })?;
                    Box::new(FileSource::new(name, &label, path))
                }
                SourceBackend::Remote => {
                    let url = source_config.url.clone().ok_or_else(|| {
                        FinderError::Config(format!("source '{name}' has no url"))
                    })?;
                    let upstream_source = source_config.upstream_source.as_deref().unwrap_or(name);
                    Box::new(RemoteSource::new(
                        name,
                        &label,
                        &url,
                        upstream_source,
                        Duration::from_secs(source_config.timeout_secs),
                    )?)
                }
            };
            registry.register(ConfiguredSource::new(
                strategy,
                SourceSettings::from(source_config),
            ));
        }
        if !registry.sources.contains_key(&registry.default_source) {
            return Err(FinderError::Config(format!(
                "default source '{}' is not configured",
                registry.default_source
            )));
        }
        Ok(registry)
    }

    /// Resolve a selector. Absent or blank means the default source; an
    /// unknown name is rejected.
    pub fn resolve(&self, selector: Option<&str>) -> Result<Arc<ConfiguredSource>> {
        let name = selector
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_source);
        self.sources.get(name).cloned().ok_or_else(|| {
            FinderError::Validation(format!(
                "source '{}' is not recognized; expected one of: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<ConfiguredSource>> {
        self.sources.values()
    }

    pub fn default_source(&self) -> &str {
        &self.default_source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventDraft;

    fn event(title: &str, date: &str) -> EventRecord {
        EventRecord::try_from(EventDraft {
            title: title.into(),
            date: date.into(),
            url: "#".into(),
            image: "https://placehold.co/600x400".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn prepare_dedupes_sorts_and_caps() {
        let events = vec![
            event("C", "2025-03-01"),
            event("A", "2025-01-01"),
            event("C", "2025-03-01"),
            event("B", "2025-02-01"),
            event("B2", "2025-02-01"),
        ];
        let prepared = prepare_collection(events, Some(3));
        let titles: Vec<_> = prepared.iter().map(|e| e.title()).collect();
        assert_eq!(titles, vec!["A", "B", "B2"]);
    }

    #[test]
    fn registry_resolves_default_and_rejects_unknown() {
        let registry = SourceRegistry::from_config(&Config::default()).unwrap();
        assert_eq!(registry.resolve(None).unwrap().name(), "clubberia");
        assert_eq!(registry.resolve(Some("  ")).unwrap().name(), "clubberia");
        assert_eq!(registry.resolve(Some("major")).unwrap().label(), "major_festivals");
        assert!(matches!(
            registry.resolve(Some("eventbrite")),
            Err(FinderError::Validation(_))
        ));
    }

    #[test]
    fn builtin_source_without_dataset_is_rejected() {
        let config = Config::from_toml(
            r#"
            [query]
            default_source = "tokyo"

            [sources.tokyo]
            backend = "builtin"
            "#,
        )
        .unwrap();
        assert!(matches!(
            SourceRegistry::from_config(&config),
            Err(FinderError::Config(_))
        ));
    }

    #[test]
    fn builtin_source_can_name_its_dataset() {
        let config = Config::from_toml(
            r#"
            [query]
            default_source = "tokyo"

            [sources.tokyo]
            backend = "builtin"
            dataset = "psytrance"
            "#,
        )
        .unwrap();
        let registry = SourceRegistry::from_config(&config).unwrap();
        let tokyo = registry.resolve(None).unwrap();
        assert_eq!(tokyo.fallback_events().unwrap().len(), 8);
    }

    #[test]
    fn unknown_fallback_dataset_is_rejected() {
        let config = Config::from_toml(
            r#"
            [query]
            default_source = "local"

            [sources.local]
            backend = "file"
            path = "data/local.json"
            dataset = "nowhere"
            "#,
        )
        .unwrap();
        assert!(SourceRegistry::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn named_dataset_is_served() {
        let config = Config::from_toml(
            r#"
            [query]
            default_source = "tokyo"

            [sources.tokyo]
            backend = "builtin"
            dataset = "featured"
            "#,
        )
        .unwrap();
        let registry = SourceRegistry::from_config(&config).unwrap();
        let events = registry.resolve(None).unwrap().acquire(false).await.unwrap();
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn fallback_respects_setting() {
        let mut config = Config::default();
        config.sources.get_mut("major").unwrap().fallback = false;
        let registry = SourceRegistry::from_config(&config).unwrap();
        assert!(registry.resolve(Some("major")).unwrap().fallback_events().is_none());
        assert_eq!(
            registry.resolve(Some("clubberia")).unwrap().fallback_events().unwrap().len(),
            8
        );
    }
}
