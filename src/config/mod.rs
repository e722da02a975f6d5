//! Service configuration, loaded once at startup and handed to the
//! components that need it.

use std::path::{Path, PathBuf};

use serde::Deserialize;

mod config_dir;
pub use config_dir::{find_config_file, read_config, read_config_from};

mod error;
pub use error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    auth: Auth,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default)]
    cors_origins: Vec<String>,
}

/// Token verification settings. Either `secret` (HS256) or
/// `public_key_path` (RS256 PEM) must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    secret: Option<String>,
    public_key_path: Option<PathBuf>,
    issuer: Option<String>,
    audience: Option<String>,
}

impl Config {
    #[tracing::instrument]
    pub fn load(use_local: bool) -> ConfigResult<Self> {
        let bytes = read_config(use_local)?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        config.auth.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn auth(&self) -> &Auth {
        &self.auth
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }
}

impl Auth {
    pub fn with_secret<S: Into<String>>(secret: S) -> Self {
        Self {
            secret: Some(secret.into()),
            public_key_path: None,
            issuer: None,
            audience: None,
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.secret.as_deref().is_none_or(str::is_empty) && self.public_key_path.is_none() {
            return Err(ConfigError::InvalidAuth(
                "either `secret` or `public_key_path` is required",
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }

    #[inline]
    pub fn public_key_path(&self) -> Option<&Path> {
        self.public_key_path.as_deref()
    }

    #[inline]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    #[inline]
    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }
}

impl Config {
    /// In-process configuration for tests and tooling.
    pub fn local(auth: Auth) -> Self {
        Self {
            host: Host {
                bindto: "127.0.0.1:0".to_string(),
            },
            app: App {
                database_uri: String::new(),
                docs: false,
                cors_origins: vec![],
            },
            auth,
        }
    }
}
