use anyhow::{Context, Result};
use std::env;
use std::fmt;

/// Environment name that hides internal error messages from clients
pub const PRODUCTION: &str = "production";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub environment: RuntimeEnvironment,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Runtime environment name, captured once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEnvironment(String);

impl RuntimeEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_production(&self) -> bool {
        self.0 == PRODUCTION
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `APP_ENV` is required
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("APP_ENV").context("APP_ENV must be set")?;

        Ok(Config {
            server: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: lookup("API_PORT")
                    .unwrap_or_else(|| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
            environment: RuntimeEnvironment::new(environment),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
