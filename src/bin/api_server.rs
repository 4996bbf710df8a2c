// src/bin/api_server.rs

use shipledger::infra::config::{ConfigError, LIVE_MODE_GUIDANCE};
use shipledger::infra::ledger::ledger_from_config;
use shipledger::storage::open_store;
use shipledger::transport::http::{create_router, ApiDoc, AppState};
use shipledger::{AppConfig, RecordHashService, Repository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e @ ConfigError::MissingLedgerSettings(_)) => {
            eprintln!("> {}\n\n{}", e, LIVE_MODE_GUIDANCE);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    // --- Store ---
    let store = open_store(config.database_url.as_deref(), config.db_max_connections).await?;
    let repo = Repository::new(store);

    // --- Ledger ---
    let ledger = ledger_from_config(&config, repo.clone())?;
    let records = RecordHashService::new(repo.clone(), ledger);
    if config.demo_mode {
        warn!("DEMO_MODE is on: ledger receipts are simulated and nothing leaves this process");
    } else {
        info!(mode = records.mode(), "ledger client ready");
    }

    let app_state = AppState::new(repo, records, config.admin_ids.clone());

    // --- API Server ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}
