mod api_doc;
mod config;
mod dispatcher;
mod error;
mod handlers;
mod lambda;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Context;
use config::{Config, RuntimeMode};
use dispatcher::Dispatcher;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; deployed functions get real variables
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("kv-gateway-handler starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store = store::connect(&config).await?;
    let dispatcher = Dispatcher::new(store);

    match config.runtime {
        RuntimeMode::Lambda(_) => lambda::run(&dispatcher)
            .await
            .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e)),
        RuntimeMode::Http => {
            let addr = format!("{}:{}", config.service_host, config.service_port);
            let app = routes::router(AppState {
                dispatcher,
                config: Arc::new(config),
            });

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on {}", addr);

            axum::serve(listener, app).await.context("Server error")
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // CloudWatch adds its own timestamps and shows raw escape codes
    let in_lambda = std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some();

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if in_lambda {
        builder.with_ansi(false).without_time().init();
    } else {
        builder.init();
    }
}
