/// Configuration management for the Upskill server
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub authentication: AuthConfig,
    pub payment: PaymentConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Session token lifetime in hours
    pub token_ttl_hours: i64,
    /// Out-of-band secret allowing administrator signup; absent means
    /// administrator accounts can only be created by an existing admin
    pub admin_signup_secret: Option<String>,
}

/// UPI payment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Merchant virtual payment address (the `pa` parameter)
    pub merchant_vpa: String,
    /// Merchant display name (the `pn` parameter)
    pub merchant_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("UPSKILL_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("UPSKILL_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;
        let version = env::var("UPSKILL_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ApiError::Validation("DATABASE_URL required".to_string()))?;
        let max_connections = env::var("UPSKILL_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);
        let connect_timeout_secs = env::var("UPSKILL_DB_CONNECT_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Signing secret is mandatory; the process must not come up without it
        let jwt_secret = env::var("UPSKILL_JWT_SECRET")
            .map_err(|_| ApiError::Validation("JWT secret required".to_string()))?;
        let token_ttl_hours = env::var("UPSKILL_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);
        let admin_signup_secret = env::var("UPSKILL_ADMIN_SIGNUP_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let merchant_vpa = env::var("UPSKILL_UPI_MERCHANT_VPA")
            .unwrap_or_else(|_| "upskill@upi".to_string());
        let merchant_name =
            env::var("UPSKILL_UPI_MERCHANT_NAME").unwrap_or_else(|_| "Upskill".to_string());

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                connect_timeout_secs,
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_hours,
                admin_signup_secret,
            },
            payment: PaymentConfig {
                merchant_vpa,
                merchant_name,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(ApiError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ApiError::Validation(
                "Connection pool must allow at least one connection".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".into(),
                port: 8080,
                version: "0.1.0".into(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/upskill".into(),
                max_connections: 20,
                connect_timeout_secs: 30,
            },
            authentication: AuthConfig {
                jwt_secret: "0123456789abcdef0123456789abcdef".into(),
                token_ttl_hours: 24,
                admin_signup_secret: None,
            },
            payment: PaymentConfig {
                merchant_vpa: "upskill@upi".into(),
                merchant_name: "Upskill".into(),
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = sample_config();
        config.authentication.jwt_secret = "short".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_pool_rejected() {
        let mut config = sample_config();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
