use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use url::Url;

pub const LISTEN_ADDR_ENV: &str = "APP_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "APP_STORAGE_BACKEND";
pub const REDIS_ADDR_ENV: &str = "APP_REDIS_ADDR";
pub const REDIS_PASSWORD_ENV: &str = "APP_REDIS_PASSWD";
pub const REDIS_DB_ENV: &str = "APP_REDIS_DB";
pub const PUBLIC_BASE_URL_ENV: &str = "APP_PUBLIC_BASE_URL";
pub const LOG_FORMAT_ENV: &str = "APP_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_REDIS_ADDR: &str = "localhost:6379";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "redis")]
    Redis,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Redis => write!(f, "redis"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "snip-gateway", about = "HTTP front end of the Snip URL shortener")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Redis
    )]
    pub storage: StorageBackendArg,

    /// Redis `host:port`.
    #[arg(long, env = REDIS_ADDR_ENV, default_value = DEFAULT_REDIS_ADDR)]
    pub redis_addr: String,

    #[arg(long, env = REDIS_PASSWORD_ENV, hide_env_values = true)]
    pub redis_password: Option<String>,

    #[arg(long, env = REDIS_DB_ENV, default_value_t = 0)]
    pub redis_db: u32,

    /// Base URL short links are served under, used to build `shortUrl`.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CLI {
    /// Assembles the Redis connection URL from address, password and database.
    pub fn redis_url(&self) -> anyhow::Result<Url> {
        let mut url = Url::parse(&format!("redis://{}/{}", self.redis_addr, self.redis_db))
            .with_context(|| format!("invalid redis address '{}'", self.redis_addr))?;

        if let Some(password) = self.redis_password.as_deref().filter(|p| !p.is_empty()) {
            url.set_password(Some(password))
                .map_err(|()| anyhow!("cannot attach a password to '{}'", self.redis_addr))?;
        }

        Ok(url)
    }
}
