use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::Level;

#[macro_use]
extern crate tracing;

mod config;
mod error;
mod healthz;
mod middleware;
mod model;
mod pay;
mod protocol;
mod signing;
mod transaction;

use config::{ConfigError, GatewayConfig};
use protocol::GatewayClient;
use transaction::TransactionIdGenerator;

pub const PAY_ROUTE: &str = "/api/phonepe-pay";

pub struct AppState {
    pub config: GatewayConfig,
    pub gateway: GatewayClient,
    pub transaction_ids: TransactionIdGenerator,
    pub allowed_origin: HeaderValue,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("ALLOWED_ORIGIN is not a valid header value: {0}")]
    Origin(#[from] InvalidHeaderValue),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let gateway = GatewayClient::new(
            &config.base_url,
            &config.merchant_id,
            &config.salt_key,
            &config.salt_index,
            config.timeout,
        )?;
        let allowed_origin = HeaderValue::from_str(&config.allowed_origin)?;
        Ok(Self {
            config,
            gateway,
            transaction_ids: TransactionIdGenerator::new(),
            allowed_origin,
        })
    }
}

pub fn app(state: SharedState) -> Router {
    let routes = Router::new()
        .route("/healthz", get(healthz::service_info))
        .route(
            PAY_ROUTE,
            post(pay::initiate)
                .options(pay::preflight)
                .fallback(pay::method_not_allowed),
        )
        .layer(axum::middleware::from_fn(middleware::log_request));

    middleware::with_cors(routes, state.allowed_origin.clone()).with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = GatewayConfig::from_env().map_err(|e| {
        error!("FATAL: {}", e);
        e
    })?;
    info!("Loaded config: {:?}", config);

    let port = config.port;
    let state = Arc::new(AppState::new(config)?);

    info!("Listening on port {}", port);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app(state).into_make_service()).await?;
    Ok(())
}
