mod admin;
mod appointments;
mod auth;
mod chat;
mod config;
mod doctors;
mod error;
mod profile;
mod routes;
mod state;
mod store;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use config::{generate_config_template, Config};
use store::memory::MemStorage;
use store::SharedStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "medilink_server=info".parse().expect("valid filter")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "medilink_server=info".parse().expect("valid filter")),
            )
            .init();
    }

    tracing::info!("medilink server v{} starting", env!("CARGO_PKG_VERSION"));

    // In-memory entity store; state does not survive a restart.
    let storage: SharedStorage = Arc::new(MemStorage::new());

    if config.seed_demo_data {
        store::seed::seed_demo_data(storage.as_ref())?;
    }

    let jwt_secret = match &config.jwt_secret {
        Some(hex_secret) => hex::decode(hex_secret)?,
        None => {
            tracing::info!("no JWT secret configured, generating a per-boot key");
            auth::jwt::generate_jwt_secret()
        }
    };

    let app_state = state::AppState {
        store: storage,
        connections: ws::new_connection_registry(),
        jwt_secret,
        token_ttl_hours: config.token_ttl_hours,
    };

    let app = routes::build_router(app_state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
