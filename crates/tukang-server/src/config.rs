use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("TUKANG_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("TUKANG_JWT_SECRET is unset or still a placeholder; set it in .env and restart");
        }

        let db_path = lookup("TUKANG_DB_PATH").unwrap_or_else(|| "tukang.db".into()).into();
        let host = lookup("TUKANG_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("TUKANG_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("TUKANG_PORT is not a valid port: {raw}"))?,
            None => 3000,
        };
        let upload_dir = lookup("TUKANG_UPLOAD_DIR").unwrap_or_else(|| "./uploads".into()).into();
        let public_base_url = lookup("TUKANG_PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        Ok(Self {
            jwt_secret,
            db_path,
            host,
            port,
            upload_dir,
            public_base_url,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().with_context(|| format!("invalid listen address {addr}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = config(&[("TUKANG_JWT_SECRET", "a-real-secret")]).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("tukang.db"));
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(cfg.public_base_url, "http://0.0.0.0:3000");
        assert_eq!(cfg.addr().unwrap().port(), 3000);
    }

    #[test]
    fn missing_or_placeholder_secret_is_refused() {
        assert!(config(&[]).is_err());
        assert!(config(&[("TUKANG_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn overrides_are_read() {
        let cfg = config(&[
            ("TUKANG_JWT_SECRET", "a-real-secret"),
            ("TUKANG_HOST", "127.0.0.1"),
            ("TUKANG_PORT", "8080"),
            ("TUKANG_PUBLIC_BASE_URL", "https://api.tukang.id"),
        ])
        .unwrap();
        assert_eq!(cfg.addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.public_base_url, "https://api.tukang.id");
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(config(&[("TUKANG_JWT_SECRET", "a-real-secret"), ("TUKANG_PORT", "http")]).is_err());
    }
}
