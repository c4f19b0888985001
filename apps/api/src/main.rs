mod auth;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod questions;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{Authenticator, HeaderAuthenticator, SupabaseAuthenticator};
use crate::config::Config;
use crate::db::create_store;
use crate::generation::generator::QuestionGenerator;
use crate::questions::memory::InMemoryQuestionStore;
use crate::questions::store::QuestionStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting InterviewPrep API v{}", env!("CARGO_PKG_VERSION"));

    // Question store: PostgreSQL when configured, in-memory otherwise
    let store: Arc<dyn QuestionStore> = match &config.database_url {
        Some(url) => Arc::new(create_store(url).await?),
        None => {
            warn!("DATABASE_URL not set; questions are kept in memory and lost on restart");
            Arc::new(InMemoryQuestionStore::new())
        }
    };

    // Authentication: Supabase when configured, trusted header otherwise
    let auth: Arc<dyn Authenticator> = match (&config.supabase_url, &config.supabase_anon_key) {
        (Some(url), Some(anon_key)) => {
            info!("Authenticating requests against {url}");
            Arc::new(SupabaseAuthenticator::new(url, anon_key.clone())?)
        }
        _ => {
            warn!("Supabase not configured; trusting the x-user-id header (development only)");
            Arc::new(HeaderAuthenticator)
        }
    };

    // Question generator: live or demo, decided once here
    let generator = Arc::new(QuestionGenerator::from_config(&config.generator_config())?);

    let state = AppState {
        store,
        generator,
        auth,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to APP_URL once the frontend origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
