use std::sync::Arc;

use bloodbank_api::config::AppConfig;
use bloodbank_api::geo::StaticGeocoder;
use bloodbank_api::store::PgStore;
use bloodbank_api::AppState;
use bloodbank_shared::clients::db::create_pool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bloodbank_shared::middleware::init_tracing("bloodbank-api");

    let config = AppConfig::load()?;
    let port = config.port;

    // Set JWT_SECRET env var for the auth extractor middleware
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let pool = create_pool(&config.database_url, config.db_pool_size)?;
    let metrics_handle = bloodbank_shared::middleware::init_metrics()?;

    let state = Arc::new(AppState {
        store: Arc::new(PgStore::new(pool)),
        geocoder: Arc::new(StaticGeocoder::new(config.campus())),
        config,
        metrics_handle: Some(metrics_handle),
    });

    let app = bloodbank_api::app(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "bloodbank-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
