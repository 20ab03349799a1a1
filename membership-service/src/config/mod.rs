use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("MEMBERSHIP_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("MEMBERSHIP_SERVICE_PORT")
            .unwrap_or_else(|_| "3004".to_string())
            .parse()
            .context("MEMBERSHIP_SERVICE_PORT must be a valid port number")?;

        let db_url =
            env::var("MEMBERSHIP_DATABASE_URL").context("MEMBERSHIP_DATABASE_URL must be set")?;
        let db_name = env::var("MEMBERSHIP_DATABASE_NAME")
            .unwrap_or_else(|_| "membership_db".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            service_name: "membership-service".to_string(),
        })
    }
}
