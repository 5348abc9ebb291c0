//! agritrack-ui - haul logging service
//!
//! Serves the record store, dashboard and entry surfaces to the browser
//! front end, with AI-assisted entry and summaries and a music panel.

use std::path::PathBuf;
use std::sync::Arc;

use agritrack_common::config::{self, TomlConfig};
use agritrack_common::events::EventBus;
use agritrack_common::prefs::{KeyValueStore, TomlKvStore};
use agritrack_common::{record, time, RecordStore};
use agritrack_ui::playback::{spawn_playback_poller, PlaybackControl, PlaybackSession};
use agritrack_ui::services::gemini::GeminiClient;
use agritrack_ui::services::summary::spawn_summary_refresher;
use agritrack_ui::{build_router, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

const EVENT_BUS_CAPACITY: usize = 256;

/// Command-line arguments for agritrack-ui
#[derive(Parser, Debug)]
#[command(name = "agritrack-ui")]
#[command(about = "Harvest haul logging service")]
#[command(version)]
struct Args {
    /// Config file (overrides AGRITRACK_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "AGRITRACK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AGRITRACK_PORT")]
    port: Option<u16>,

    /// Start with an empty record store
    #[arg(long)]
    no_seed: bool,
}

/// Fold command-line overrides into the file config
fn apply_args(mut config: TomlConfig, args: &Args) -> TomlConfig {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.no_seed {
        config.seed_demo_data = false;
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first so its log level can seed the filter; RUST_LOG still wins
    let config = config::load_config(args.config.as_deref()).context("Failed to load config")?;
    let config = apply_args(config, &args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .init();

    info!("Starting AgriTrack (agritrack-ui) v{}", env!("CARGO_PKG_VERSION"));
    match config::resolve_config_path(args.config.as_deref()) {
        Some(path) if path.exists() => info!("Config: {}", path.display()),
        _ => info!("Config: built-in defaults"),
    }

    let prefs_path = config.prefs_path();
    let prefs: Arc<dyn KeyValueStore> = Arc::new(
        TomlKvStore::open(&prefs_path)
            .with_context(|| format!("Failed to open preferences at {}", prefs_path.display()))?,
    );

    let store = if config.seed_demo_data {
        let seeded = RecordStore::with_seed(record::demo_records(time::now()))?;
        info!("Seeded {} demo records", seeded.len());
        seeded
    } else {
        RecordStore::new()
    };

    let gemini = Arc::new(GeminiClient::new(&config.gemini, config.gemini_api_key())?);

    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);

    let redirect_uri = config
        .spotify
        .redirect_uri
        .clone()
        .unwrap_or_else(|| format!("http://{}", config.bind_addr()));
    let playback: Arc<dyn PlaybackControl> = Arc::new(PlaybackSession::new(
        config.spotify.clone(),
        redirect_uri,
        prefs.clone(),
        event_bus.clone(),
    )?);

    let state = AppState::new(
        store,
        event_bus,
        gemini.clone(),
        gemini,
        playback.clone(),
        prefs,
    )
    .with_summary_limit(config.summary_record_limit);

    spawn_summary_refresher(state.clone(), time::millis_to_duration(config.summary_debounce_ms));
    spawn_playback_poller(playback, time::millis_to_duration(config.playback_poll_ms));

    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("agritrack-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
