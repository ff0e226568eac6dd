use std::env;

use crate::modules::email::smtp::SmtpConfig;
use crate::{DEFAULT_SWEEP_INTERVAL, TODOS_FILE, USERS_FILE};

/// Immutable application configuration, built once at process start.
///
/// Every service takes the pieces it needs from here at construction
/// time; business logic never reads the environment on its own.
#[derive(Debug)]
pub struct AppConfig {
    pub signing_key: Vec<u8>,
    pub hash_iterations: u32,
    pub smtp: SmtpConfig,
    pub base_url: String,
    pub sweep_interval_secs: u64,
    pub users_file: String,
    pub todos_file: String,
}

/// Default PBKDF2 iteration count when HASH_ITERATIONS is not set
const DEFAULT_HASH_ITERATIONS: u32 = 100_000;

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Required: JWT_SECRET, SMTP_HOST, EMAIL_USER, EMAIL_PASSWORD.
    /// All missing required variables are reported together so a broken
    /// deployment fails once with the complete list.
    pub fn from_env() -> Result<Self, String> {
        let required = ["JWT_SECRET", "SMTP_HOST", "EMAIL_USER", "EMAIL_PASSWORD"];
        let missing: Vec<&str> = required
            .iter()
            .filter(|name| env::var(name).map(|v| v.is_empty()).unwrap_or(true))
            .copied()
            .collect();

        if !missing.is_empty() {
            return Err(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        let port = match env::var("SMTP_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| format!("SMTP_PORT is not a valid port number: {}", value))?,
            Err(_) => 587,
        };

        let sweep_interval_secs = match env::var("SWEEP_INTERVAL_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| format!("SWEEP_INTERVAL_SECS is not a valid number: {}", value))?,
            Err(_) => DEFAULT_SWEEP_INTERVAL,
        };

        let hash_iterations = match env::var("HASH_ITERATIONS") {
            Ok(value) => value
                .parse::<u32>()
                .map_err(|_| format!("HASH_ITERATIONS is not a valid number: {}", value))?,
            Err(_) => DEFAULT_HASH_ITERATIONS,
        };

        Ok(Self {
            signing_key: env::var("JWT_SECRET").unwrap().into_bytes(),
            hash_iterations,
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap(),
                port,
                username: env::var("EMAIL_USER").unwrap(),
                password: env::var("EMAIL_PASSWORD").unwrap(),
                from_name: env::var("EMAIL_FROM_NAME")
                    .unwrap_or_else(|_| "Taskwarden".to_string()),
            },
            base_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            sweep_interval_secs,
            users_file: env::var("USERS_FILE").unwrap_or_else(|_| USERS_FILE.to_string()),
            todos_file: env::var("TODOS_FILE").unwrap_or_else(|_| TODOS_FILE.to_string()),
        })
    }
}
