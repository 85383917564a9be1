use demand_forecast::data::DataLoader;
use forecast_server::{app, AppState};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DATA_PATH: &str = "data/historical_data.csv";

#[tokio::main]
async fn main() {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_server=info,tower_http=info".into()),
        )
        .init();

    // Load the historical dataset once; a missing or corrupt dataset is
    // fatal at startup
    let data_path = env::var("DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
    let data = match DataLoader::from_csv(&data_path) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!(path = %data_path, error = %e, "Failed to load historical dataset");
            std::process::exit(1);
        }
    };
    tracing::info!(
        records = data.len(),
        items = data.items().len(),
        path = %data_path,
        "Historical dataset loaded"
    );

    let state = AppState::new(Arc::new(data));
    let router = app(state);

    // Server configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST:PORT configuration");

    tracing::info!("forecast_server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, router).await.expect("Server error");
}
