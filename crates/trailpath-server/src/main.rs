mod config;
mod http;
mod telemetry;

use std::sync::Arc;

use config::ServiceConfig;
use http::AppState;
use tracing::{error, info};
use trailpath_domain::{ActivityService, IngestService};
use trailpath_postgres::{PostgresActivityRepository, PostgresClient, PostgresConfig};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    telemetry::init_telemetry(&config.log_level);

    info!(
        http_host = %config.http_host,
        http_port = config.http_port,
        "Starting trailpath server"
    );

    let repository = match init_repository(&config).await {
        Ok(repo) => Arc::new(repo),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        ingest: Arc::new(IngestService::new(repository.clone())),
        activities: Arc::new(ActivityService::new(repository)),
    };

    let app = http::router(state, config.max_upload_bytes);

    let addr = format!("{}:{}", config.http_host, config.http_port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "Listening for uploads");

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn init_repository(config: &ServiceConfig) -> anyhow::Result<PostgresActivityRepository> {
    let client = PostgresClient::new(&PostgresConfig {
        host: config.postgres_host.clone(),
        port: config.postgres_port,
        database: config.postgres_database.clone(),
        username: config.postgres_username.clone(),
        password: config.postgres_password.clone(),
        max_pool_size: config.postgres_max_pool_size,
    })?;

    client.ping().await?;

    let repository = PostgresActivityRepository::new(client);
    repository.ensure_schema().await?;

    Ok(repository)
}
