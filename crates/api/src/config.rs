//! Environment-driven runtime configuration.

use dukaan_demand::DEFAULT_ALERT_THRESHOLD;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Shared secret echoed back during webhook subscription handshakes.
    pub verify_token: String,
    /// When unset, the process runs against the in-memory store.
    pub database_url: Option<String>,
    pub alert_threshold: f64,
    /// Overrides the placeholder sales-velocity input when set.
    pub demand_velocity: Option<f64>,
    pub khata_overdue_days: i64,
    pub khata_sweep_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let verify_token = std::env::var("WEBHOOK_VERIFY_TOKEN").unwrap_or_else(|_| {
            tracing::warn!("WEBHOOK_VERIFY_TOKEN not set; using insecure dev default");
            "dev-verify-token".to_string()
        });

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            verify_token,
            database_url: std::env::var("DATABASE_URL").ok(),
            alert_threshold: std::env::var("DEMAND_ALERT_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ALERT_THRESHOLD),
            demand_velocity: std::env::var("DEMAND_VELOCITY")
                .ok()
                .and_then(|v| v.parse().ok()),
            khata_overdue_days: std::env::var("KHATA_OVERDUE_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            khata_sweep_hours: std::env::var("KHATA_SWEEP_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
        }
    }
}
