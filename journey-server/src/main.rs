use std::error::Error;

use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use journey_server::cache::CachedGeocoder;
use journey_server::config::{AppConfig, BackendKind};
use journey_server::geocode::NominatimClient;
use journey_server::journal::JournalService;
use journey_server::supabase::{Backend, MemoryStore, SupabaseClient};
use journey_server::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "journey_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env()?;

    let backend: Backend = match (config.backend, &config.supabase) {
        (BackendKind::Supabase, Some(supabase)) => {
            info!(url = %supabase.url, key = %supabase.redacted_key(), "using Supabase store");
            SupabaseClient::new(supabase.clone())?.into()
        }
        _ => match &config.snapshot {
            Some(path) => {
                info!(path = %path.display(), "using in-memory store with snapshot");
                MemoryStore::open(path)?.into()
            }
            None => {
                info!("using in-memory demo store");
                MemoryStore::demo().into()
            }
        },
    };

    let geocoder = CachedGeocoder::new(NominatimClient::new(config.geocoder.clone())?, &config.cache);
    info!(url = %config.geocoder.base_url, "geocoder ready");

    let journal = JournalService::new(backend);
    info!(backend = journal.backend().name(), "journal store ready");

    let mut state = AppState::new(journal, geocoder);
    if let Some(supabase) = &config.supabase {
        state = state.with_sign_in(supabase.clone());
    }

    let app = create_router(state, &config.static_dir).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Journey listening on http://{}", config.bind_addr);
    info!("  GET    /               - Journal page");
    info!("  GET    /health         - Health check");
    info!("  GET    /api/stops      - Stops, map and total distance");
    info!("  POST   /api/stops      - Add a stop");
    info!("  PATCH  /api/stops/:id  - Edit a stop");
    info!("  DELETE /api/stops/:id  - Delete a stop");
    info!("  GET    /api/geocode    - Place search");
    info!("  GET    /api/distance   - Distance between two points");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
