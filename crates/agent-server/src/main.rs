//! reno-agent HTTP Server
//!
//! Axum-based server providing the renovation assessment form UI and a JSON
//! API. Each browser session gets its own house store.

mod config;
mod handlers;
mod render;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::LlmProvider;
use agent_runtime::{OllamaProvider, OpenAiProvider, openai::OpenAiConfig};
use reno_advisor::{RefinerOptions, RenovationAgent, refiner_agent_with};

use crate::config::{ProviderKind, ServerConfig};
use crate::handlers::{
    health_check, index, list_houses, run_form, run_task, save_house, save_house_form,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let (provider, agent) = build_agent(&config).await?;

    match provider.health_check().await {
        Ok(true) => tracing::info!(provider = provider.name(), "✓ Provider reachable"),
        Ok(false) | Err(_) => {
            tracing::warn!(provider = provider.name(), "⚠ Provider not reachable - runs will fail");
        }
    }

    let state = AppState::new(provider, agent, config.model.clone());
    spawn_session_pruner(&state, config.session_idle_minutes);

    let addr = config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 reno-agent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /            - Renovation form");
    tracing::info!("  GET  /health      - Health check");
    tracing::info!("  GET  /api/houses  - List session houses");
    tracing::info!("  POST /api/houses  - Save a house");
    tracing::info!("  POST /api/run     - Run an assessment");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Provider for the configured backend, plus the agent when it can run
async fn build_agent(
    config: &ServerConfig,
) -> anyhow::Result<(Arc<dyn LlmProvider>, Option<Arc<RenovationAgent>>)> {
    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::OpenAi => {
            let key = config.openai_api_key.clone().unwrap_or_default();
            let openai = OpenAiConfig::new(key).with_base_url(&config.openai_base_url);
            Arc::new(OpenAiProvider::from_config(openai)?)
        }
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(&config.ollama_host, config.ollama_port)),
    };

    if !config.credential_configured() {
        tracing::warn!("⚠ OPENAI_API_KEY not set - assessments are disabled");
        tracing::warn!("  Set it in the environment or .env and restart");
        return Ok((provider, None));
    }

    let native_tools = provider.info().await.is_ok_and(|info| info.supports_tools);
    let agent = refiner_agent_with(
        provider.clone(),
        RefinerOptions {
            model: config.model.clone(),
            inject_tool_descriptions: !native_tools,
            ..RefinerOptions::default()
        },
    )?;
    tracing::info!(provider = provider.name(), model = %config.model, "✓ Renovation agent ready");

    Ok((provider, Some(Arc::new(agent))))
}

/// Drop idle sessions in the background
fn spawn_session_pruner(state: &AppState, idle_minutes: i64) {
    let sessions = state.sessions.clone();
    let max_idle = chrono::Duration::minutes(idle_minutes);

    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            let removed = sessions.prune_idle(max_idle).await;
            if removed > 0 {
                tracing::debug!(removed, "Pruned idle sessions");
            }
        }
    });
}

fn app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Form UI
        .route("/", get(index))
        .route("/run", post(run_form))
        .route("/houses", post(save_house_form))

        // Health & API
        .route("/health", get(health_check))
        .route("/api/houses", get(list_houses).post(save_house))
        .route("/api/run", post(run_task))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
