//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        storage::{DraftStoreAdapter, FileBackend, MemoryBackend, ScriptStoreAdapter},
        OpenAiAnalysisAdapter, OpenAiScriptAdapter,
    },
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, state::AppState, ws_handler},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
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

    // --- 2. Open the Stores ---
    // Durable scripts live on disk; the draft slot is per-process, matching
    // its session-scoped lifetime.
    let durable = Arc::new(FileBackend::new(config.data_dir.clone())?);
    let scripts = Arc::new(ScriptStoreAdapter::new(durable));
    let drafts = Arc::new(DraftStoreAdapter::new(Arc::new(MemoryBackend::new())));
    info!("Durable store opened at {}", config.data_dir.display());

    // --- 3. Initialize the AI Gateway Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let analysis_service = Arc::new(OpenAiAnalysisAdapter::new(
        openai_client.clone(),
        config.analysis_model.clone(),
        config.response_language.clone(),
    ));
    let generation_service = Arc::new(OpenAiScriptAdapter::new(
        openai_client.clone(),
        config.script_model.clone(),
        config.response_language.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        analysis_service,
        generation_service,
        scripts,
        drafts,
    });

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:5173"))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/scripts", get(api_lib::web::list_scripts_handler))
        .route(
            "/scripts/{id}",
            get(api_lib::web::get_script_handler).delete(api_lib::web::delete_script_handler),
        )
        .route("/draft", get(api_lib::web::get_draft_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
