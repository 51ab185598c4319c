use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub planning_horizon_days: i64,
    pub avg_service_minutes: i32,
    pub service_area_radius_km: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_addr: env::var("CLINIC_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jwt_secret: env::var("CLINIC_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            planning_horizon_days: env::var("CLINIC_PLANNING_HORIZON_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(14),
            avg_service_minutes: env::var("CLINIC_AVG_SERVICE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            service_area_radius_km: env::var("CLINIC_SERVICE_AREA_RADIUS_KM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100.0),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            jwt_secret: String::new(),
            planning_horizon_days: 14,
            avg_service_minutes: 15,
            service_area_radius_km: 100.0,
        }
    }
}
