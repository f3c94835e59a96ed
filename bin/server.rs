// Domain Portfolio - API Server
// JSON API over an in-memory portfolio (nothing is persisted)

use anyhow::{Context, Result};
use domain_portfolio::api::{router, AppState};
use domain_portfolio::{logging, AppConfig, PortfolioStore};

#[tokio::main]
async fn main() -> Result<()> {
    println!("🌐 Domain Portfolio - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Config comes from DOMAIN_PORTFOLIO_CONFIG when set
    let config = AppConfig::load(None).context("Failed to load configuration")?;
    let _guard = logging::init(&logging::resolve_filter(config.log_filter.as_deref()), None)?;

    let store = if config.seed_demo_data {
        PortfolioStore::with_demo_data("api").context("Failed to seed demo data")?
    } else {
        PortfolioStore::with_actor("api")
    };
    println!("✓ Portfolio ready: {} domains", store.domains().len());

    let addr = config.server_addr.clone();
    let app = router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/domains", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
