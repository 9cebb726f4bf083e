use anyhow::Context;
use clap::{Parser, Subcommand};
use psyfinder::cache::EventCache;
use psyfinder::constants::DEBOUNCE_MILLIS;
use psyfinder::config::Config;
use psyfinder::filter::FilterParams;
use psyfinder::renderer::{EventsClient, Renderer};
use psyfinder::server::start_server;
use psyfinder::service::{QueryService, SearchRequest};
use psyfinder::sources::SourceRegistry;
use psyfinder::{logging, metrics};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "psyfinder")]
#[command(about = "Psytrance event finder: query service and terminal client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP query service
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides config and $PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Query a running service and print the result as cards
    Query {
        /// Free text matched against title and description
        #[arg(long, short)]
        query: Option<String>,
        /// Matched against the event place
        #[arg(long, short)]
        location: Option<String>,
        /// Matched against the event genre
        #[arg(long, short)]
        genre: Option<String>,
        /// Named event collection
        #[arg(long, short)]
        source: Option<String>,
        /// Bypass the service cache
        #[arg(long)]
        force: bool,
        /// Override the source's Psy keyword screen
        #[arg(long)]
        psy: Option<bool>,
        /// Service base URL
        #[arg(long, default_value = "http://localhost:8000")]
        url: String,
    },
    /// Interactive search: each line typed on stdin is a location query,
    /// loaded once typing pauses
    Browse {
        /// Named event collection
        #[arg(long, short)]
        source: Option<String>,
        /// Service base URL
        #[arg(long, default_value = "http://localhost:8000")]
        url: String,
    },
    /// List configured sources
    Sources,
}

async fn serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::load().context("loading configuration")?;
    let _guard = logging::init_logging(&config.logging)?;
    metrics::init_metrics();

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let registry = SourceRegistry::from_config(&config)?;
    info!(
        "Sources: {} (default: {})",
        registry.names().join(", "),
        registry.default_source()
    );
    let cache = EventCache::new(Duration::from_secs(config.cache.default_ttl_secs));
    let service = Arc::new(QueryService::new(registry, cache));

    if config.server.warm_up {
        match service.trigger_refresh(None) {
            Ok(_) => info!("Warm-up refresh scheduled"),
            Err(e) => warn!("Warm-up refresh not scheduled: {}", e),
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    start_server(service, addr, Some(config.server.static_dir.clone())).await
}

async fn query(request: SearchRequest, url: &str) -> anyhow::Result<()> {
    logging::init_console_logging("psyfinder=warn");
    let client = EventsClient::new(url, Duration::from_secs(30))?;
    let renderer = Renderer::new(client);

    if let Some(outcome) = renderer.load(&request, request.force_refresh).await {
        print!("{outcome}");
        if outcome.is_error() {
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn browse(source: Option<String>, url: &str) -> anyhow::Result<()> {
    logging::init_console_logging("psyfinder=warn");
    let client = EventsClient::new(url, Duration::from_secs(30))?;
    let renderer = Arc::new(Renderer::new(client));
    let (input, mut outcomes) = renderer.debounced(Duration::from_millis(DEBOUNCE_MILLIS));

    let printer = tokio::spawn(async move {
        while let Some(outcome) = outcomes.recv().await {
            print!("{outcome}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let request = SearchRequest {
            filter: FilterParams {
                location: Some(line),
                ..Default::default()
            },
            source: source.clone(),
            ..Default::default()
        };
        if !input.trigger(request) {
            break;
        }
    }
    // The last input fires after the quiet period; dropping the debouncer
    // then lets the printer drain whatever load is still running.
    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MILLIS + 50)).await;
    drop(input);
    printer.await?;
    Ok(())
}

fn list_sources() -> anyhow::Result<()> {
    let config = Config::load()?;
    let registry = SourceRegistry::from_config(&config)?;
    for source in registry.all() {
        let settings = source.settings();
        let marker = if source.name() == registry.default_source() {
            " (default)"
        } else {
            ""
        };
        println!(
            "{}{}: label={} psy_only={} fallback={} limit={}",
            source.name(),
            marker,
            source.label(),
            settings.psy_only,
            settings.fallback,
            settings
                .limit
                .map(|l| l.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => serve(host, port).await,
        Commands::Query {
            query: text,
            location,
            genre,
            source,
            force,
            psy,
            url,
        } => {
            let request = SearchRequest {
                filter: FilterParams {
                    query: text,
                    location,
                    genre,
                },
                source,
                force_refresh: force,
                psy,
            };
            query(request, &url).await
        }
        Commands::Browse { source, url } => browse(source, &url).await,
        Commands::Sources => list_sources(),
    }
}
