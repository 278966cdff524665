use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Upper bound applied to client-supplied page_size
    pub max_page_size: i64,
    pub default_page_size: i64,
    /// Concurrency bound for bulk notification fan-out
    pub broadcast_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// URLs and static API keys for dependent services and inbound webhooks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub crm_url: String,
    pub crm_api_key: String,
    pub meet_url: String,
    pub meet_api_key: String,
    pub zalo_url: String,
    pub zalo_api_key: String,
    pub payment_api_key: String,
    /// Timeout applied to every outbound HTTP call, in seconds
    pub outbound_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("API_BROADCAST_CONCURRENCY") {
            self.api.broadcast_concurrency = v.parse().unwrap_or(self.api.broadcast_concurrency);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        if let Ok(v) = env::var("CRM_URL") {
            self.services.crm_url = v;
        }
        if let Ok(v) = env::var("CRM_API_KEY") {
            self.services.crm_api_key = v;
        }
        if let Ok(v) = env::var("MEET_URL") {
            self.services.meet_url = v;
        }
        if let Ok(v) = env::var("MEET_API_KEY") {
            self.services.meet_api_key = v;
        }
        if let Ok(v) = env::var("ZALO_URL") {
            self.services.zalo_url = v;
        }
        if let Ok(v) = env::var("ZALO_API_KEY") {
            self.services.zalo_api_key = v;
        }
        if let Ok(v) = env::var("PAYMENT_API_KEY") {
            self.services.payment_api_key = v;
        }
        if let Ok(v) = env::var("OUTBOUND_TIMEOUT_SECS") {
            self.services.outbound_timeout_secs =
                v.parse().unwrap_or(self.services.outbound_timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                max_page_size: 100,
                default_page_size: 20,
                broadcast_concurrency: 8,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-do-not-use-in-production".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            services: ServicesConfig {
                crm_url: "http://localhost:8801".to_string(),
                crm_api_key: "dev-crm-key".to_string(),
                meet_url: "http://localhost:8802".to_string(),
                meet_api_key: "dev-meet-key".to_string(),
                zalo_url: "http://localhost:8803".to_string(),
                zalo_api_key: "dev-zalo-key".to_string(),
                payment_api_key: "dev-payment-key".to_string(),
                outbound_timeout_secs: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                max_page_size: 100,
                default_page_size: 20,
                broadcast_concurrency: 8,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from env
                jwt_expiry_hours: 24,
            },
            services: ServicesConfig {
                crm_url: String::new(),
                crm_api_key: String::new(),
                meet_url: String::new(),
                meet_api_key: String::new(),
                zalo_url: String::new(),
                zalo_api_key: String::new(),
                payment_api_key: String::new(),
                outbound_timeout_secs: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                max_page_size: 50,
                default_page_size: 20,
                broadcast_concurrency: 8,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from env
                jwt_expiry_hours: 4,
            },
            services: ServicesConfig {
                crm_url: String::new(),
                crm_api_key: String::new(),
                meet_url: String::new(),
                meet_api_key: String::new(),
                zalo_url: String::new(),
                zalo_api_key: String::new(),
                payment_api_key: String::new(),
                outbound_timeout_secs: 10,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.api.default_page_size, 20);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn production_requires_env_secret() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.api.max_page_size, 50);
    }
}
