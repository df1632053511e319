use tracing::info;
use tracing_subscriber::EnvFilter;

use oebb_proxy::chain::SourceChain;
use oebb_proxy::config::{ProxyConfig, default_routes};
use oebb_proxy::coordinator::FetchCoordinator;
use oebb_proxy::upstream::HttpTransport;
use oebb_proxy::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ProxyConfig::from_env()?;

    let transport = HttpTransport::new(&config.upstream)?;
    let chain = SourceChain::new(transport, config.hafas_aid.clone());
    if !chain.has_credential() {
        info!("HAFAS_AID not set, mgate source disabled");
    }
    let coordinator = FetchCoordinator::new(chain, default_routes()?);
    let app = create_router(AppState::new(coordinator, config.fallback));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        fallback = ?config.fallback,
        "ÖBB proxy listening"
    );
    info!("  GET /api/trains/stpoelten-linz");
    info!("  GET /api/trains/linz-stpoelten");

    axum::serve(listener, app).await?;
    Ok(())
}
