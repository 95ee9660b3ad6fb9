//! Process configuration read from the environment.

use std::net::SocketAddr;

use anyhow::{Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Load a small demo dataset at startup.
    pub seed_demo: bool,
}

impl ApiConfig {
    /// Read configuration, loading `.env` first when one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("FELLOWSHIP_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("Invalid FELLOWSHIP_BIND_ADDR")?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let seed_demo = match lookup("FELLOWSHIP_SEED_DEMO") {
            Some(raw) => raw.trim().parse().context("Invalid FELLOWSHIP_SEED_DEMO")?,
            None => false,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            seed_demo,
        })
    }
}
