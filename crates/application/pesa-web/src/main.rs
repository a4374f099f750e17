//! WatchPesa web app: watch videos, earn shillings.
//!
//! With a configured backend every read and write goes through the hosted
//! gateway. Without one the app runs on a seeded in-memory store so the
//! whole flow can be exercised locally.

mod routes;
mod state;

use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use pesa_config::PesaConfig;
use pesa_gateway::{AuthClient, DataStore, MemoryStore, SupabaseStore};

use state::{AppState, CurrentUser};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = PesaConfig::load();

    let mut supabase: Option<Arc<SupabaseStore>> = None;
    let mut auth: Option<AuthClient> = None;
    let mut user: Option<CurrentUser> = None;

    let store: Arc<dyn DataStore> = if config.is_configured() {
        let rest = Arc::new(SupabaseStore::new(&config.backend_url, &config.anon_key)?);
        auth = Some(AuthClient::new(&config.backend_url, &config.anon_key)?);
        supabase = Some(Arc::clone(&rest));
        tracing::info!(backend = %config.backend_url, "using hosted backend");
        rest
    } else {
        // Demo mode: a seeded catalog and an auto-signed-in user.
        let demo_id = Uuid::new_v4();
        user = Some(CurrentUser {
            id: demo_id,
            name: "demo".to_string(),
        });
        tracing::warn!("no backend configured, running on the seeded demo store");
        Arc::new(MemoryStore::seeded(demo_id))
    };

    let state = Arc::new(AppState {
        config,
        store,
        supabase,
        auth,
        user: RwLock::new(user),
        watch: RwLock::new(None),
        notice: RwLock::new(None),
    });

    let app = Router::new()
        .merge(routes::dashboard::router())
        .merge(routes::catalog::router())
        .merge(routes::watch::router())
        .merge(routes::withdraw::router())
        .merge(routes::admin::router())
        .merge(routes::auth::router())
        .merge(routes::health::router())
        .merge(routes::popup::router())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let bind = state.config.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, "pesa-web listening");
    axum::serve(listener, app).await?;
    Ok(())
}
