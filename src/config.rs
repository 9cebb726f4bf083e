use crate::constants::{
    CLUBBERIA_CACHE_TTL_SECS, CLUBBERIA_LABEL, CLUBBERIA_SOURCE, DEFAULT_CACHE_TTL_SECS,
    FEATURED_LABEL, FEATURED_SOURCE, MAJOR_LABEL, MAJOR_SOURCE, PSYTRANCE_LABEL, PSYTRANCE_SOURCE,
};
use crate::error::{FinderError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub query: QueryConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    pub sources: BTreeMap<String, SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for every path the API does not claim
    pub static_dir: PathBuf,
    /// Run one refresh of every source before accepting requests
    pub warm_up: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_source: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub default_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
    pub default_directive: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceBackend {
    Builtin,
    File,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub backend: SourceBackend,
    /// Value reported in the envelope's `source` field
    pub label: Option<String>,
    /// Built-in dataset served by the `builtin` backend and used as fallback
    /// data; defaults to the source name
    pub dataset: Option<String>,
    /// JSON file for the `file` backend
    pub path: Option<PathBuf>,
    /// Base URL of an upstream service for the `remote` backend
    pub url: Option<String>,
    /// Source name to request upstream; defaults to the local name
    pub upstream_source: Option<String>,
    pub ttl_secs: Option<u64>,
    #[serde(default)]
    pub psy_only: bool,
    #[serde(default = "default_true")]
    pub fallback: bool,
    pub limit: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    15
}

impl SourceConfig {
    pub fn builtin(label: &str) -> Self {
        Self {
            backend: SourceBackend::Builtin,
            label: Some(label.to_string()),
            dataset: None,
            path: None,
            url: None,
            upstream_source: None,
            ttl_secs: None,
            psy_only: false,
            fallback: true,
            limit: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("public"),
            warm_up: true,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_source: CLUBBERIA_SOURCE.to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "psyfinder.log".to_string(),
            default_directive: "psyfinder=info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut sources = BTreeMap::new();

        let mut clubberia = SourceConfig::builtin(CLUBBERIA_LABEL);
        clubberia.psy_only = true;
        clubberia.ttl_secs = Some(CLUBBERIA_CACHE_TTL_SECS);
        clubberia.limit = Some(50);
        sources.insert(CLUBBERIA_SOURCE.to_string(), clubberia);

        let mut major = SourceConfig::builtin(MAJOR_LABEL);
        major.limit = Some(30);
        sources.insert(MAJOR_SOURCE.to_string(), major);

        let mut psytrance = SourceConfig::builtin(PSYTRANCE_LABEL);
        psytrance.limit = Some(10);
        sources.insert(PSYTRANCE_SOURCE.to_string(), psytrance);

        sources.insert(
            FEATURED_SOURCE.to_string(),
            SourceConfig::builtin(FEATURED_LABEL),
        );

        Self {
            server: ServerConfig::default(),
            query: QueryConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            sources,
        }
    }
}

impl Config {
    /// Load `config.toml` (or `$PSYFINDER_CONFIG`), then apply environment
    /// overrides. A missing file means built-in defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("PSYFINDER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            info!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FinderError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if config.sources.is_empty() {
            config.sources = Config::default().sources;
        }
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| FinderError::Config(format!("PORT '{port}' is not a port number")))?;
        }
        if let Ok(url) = std::env::var("PSYFINDER_UPSTREAM_URL") {
            self.use_upstream(&url);
        }
        Ok(())
    }

    /// Point every source at an upstream service speaking the same contract.
    pub fn use_upstream(&mut self, base_url: &str) {
        for source in self.sources.values_mut() {
            source.backend = SourceBackend::Remote;
            source.url = Some(base_url.to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sources.contains_key(&self.query.default_source) {
            return Err(FinderError::Config(format!(
                "default source '{}' is not configured",
                self.query.default_source
            )));
        }
        for (name, source) in &self.sources {
            match source.backend {
                SourceBackend::File if source.path.is_none() => {
                    return Err(FinderError::Config(format!(
                        "source '{name}' uses the file backend but has no path"
                    )))
                }
                SourceBackend::Remote if source.url.is_none() => {
                    return Err(FinderError::Config(format!(
                        "source '{name}' uses the remote backend but has no url"
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }
}
