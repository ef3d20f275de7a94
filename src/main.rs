use std::net::SocketAddr;

use tokio::net::TcpListener;

use folio_advisor::app::create_app;
use folio_advisor::logging::{init_logging, LoggingConfig};
use folio_advisor::services::auth_service::AuthService;
use folio_advisor::state::AppState;

/// Dev-only mock auth server. Users live in an in-process map and vanish on
/// restart; tokens are HMAC-signed and expire after 24 hours.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())?;

    let state = AppState::new(AuthService::from_env());
    let app = create_app(state);

    let port: u16 = std::env::var("MOCK_AUTH_PORT")
        .unwrap_or_else(|_| "4000".to_string())
        .parse()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Mock auth server running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
