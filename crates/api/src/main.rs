use std::sync::Arc;

use dukaan_api::app::services::AppServices;
use dukaan_api::config::AppConfig;
use dukaan_infra::repos::Datastore;
use dukaan_infra::{
    spawn_dispatcher, spawn_khata_sweep, FixedTranscriber, InMemoryStore, KeywordClassifier,
    PgStore, TracingSender,
};
use dukaan_messaging::NotificationSender;

#[tokio::main]
async fn main() {
    dukaan_observability::init();

    let config = AppConfig::from_env();

    let db: Arc<dyn Datastore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.expect("failed to connect to postgres");
            store.ensure_schema().await.expect("failed to ensure schema");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; running against the in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    // The real channel/model vendors plug in here; the defaults log outbound
    // messages and classify by keyword so the pipeline works end to end
    // without credentials.
    let sender: Arc<dyn NotificationSender> = Arc::new(TracingSender);
    let (nudges, _dispatcher) = spawn_dispatcher(sender.clone());
    let _sweep = spawn_khata_sweep(
        db.clone(),
        nudges,
        std::time::Duration::from_secs(config.khata_sweep_hours * 3600),
        config.khata_overdue_days,
    );

    let mut services = AppServices::new(
        db,
        Arc::new(KeywordClassifier::new()),
        Arc::new(FixedTranscriber::unavailable()),
        sender,
    )
    .with_alert_threshold(config.alert_threshold);
    if let Some(velocity) = config.demand_velocity {
        services = services.with_velocity(velocity);
    }
    let services = Arc::new(services);

    let app = dukaan_api::app::build_app(services, config.verify_token.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
