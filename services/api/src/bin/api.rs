//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{WordListAdapter, WordnikAdapter},
    config::{Config, WordSourceKind},
    error::ApiError,
    web::{
        action_handler, create_session_handler, rest::ApiDoc, score_handler,
        state::{AppState, SessionStore},
        ws_handler,
    },
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    routing::{get, post},
    Router,
};
use letter_jumble_core::{GameEngine, WordSource};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Word Source Adapter ---
    let word_source: Arc<dyn WordSource> = match &config.word_source {
        WordSourceKind::WordList { path } => {
            info!("Using word list at {}", path.display());
            let adapter = WordListAdapter::from_file(path, config.candidate_limit)?;
            if adapter.is_empty() {
                return Err(ApiError::Internal(format!(
                    "Word list {} contains no words",
                    path.display()
                )));
            }
            Arc::new(adapter)
        }
        WordSourceKind::Wordnik { api_key, base_url } => {
            info!("Using Wordnik at {}", base_url);
            Arc::new(WordnikAdapter::new(
                api_key.clone(),
                base_url.clone(),
                config.candidate_limit,
            )?)
        }
    };

    // --- 3. Build the Shared AppState ---
    let engine = Arc::new(GameEngine::new(word_source, config.game));
    let sessions = SessionStore::new();
    let _sweeper = sessions.spawn_sweeper(config.session_ttl);
    info!("Idle sessions expire after {:?}", config.session_ttl);
    let app_state = Arc::new(AppState { engine, sessions });

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/sessions/{session_id}/actions", post(action_handler))
        .route("/sessions/{session_id}/score", get(score_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
