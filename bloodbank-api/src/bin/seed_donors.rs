use bloodbank_api::config::AppConfig;
use bloodbank_api::geo::StaticGeocoder;
use bloodbank_api::seed::seed_sample_donors;
use bloodbank_api::store::PgStore;
use bloodbank_shared::clients::db::create_pool;

fn main() -> anyhow::Result<()> {
    bloodbank_shared::middleware::init_tracing("seed-donors");

    let config = AppConfig::load()?;
    let pool = create_pool(&config.database_url, 2)?;
    let store = PgStore::new(pool);
    let geocoder = StaticGeocoder::new(config.campus());

    let created = seed_sample_donors(&store, &geocoder)?;
    tracing::info!(created, "sample donors added");

    Ok(())
}
