use nestdoc_core::{driver::ConnectOptions, schema::DEFAULT_REPOSITORY, Result};
use serde::Deserialize;
use url::Url;

/// Adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the adapter instance, also the repository used to resolve
    /// collection names
    pub name: String,

    pub host: String,

    pub port: u16,

    pub database: String,

    /// Overrides `database` when set
    pub path: Option<String>,
}

impl Config {
    pub const DEFAULT_PORT: u16 = 27017;

    /// Parses a `mongodb://host[:port][/database]` URL.
    pub fn from_url(url: &str) -> Result<Config> {
        let url = Url::parse(url).map_err(anyhow::Error::from)?;

        if url.scheme() != "mongodb" {
            nestdoc_core::bail!("connection URL does not have a `mongodb` scheme; url={url}");
        }

        let mut config = Config::default();

        if let Some(host) = url.host_str() {
            config.host = host.to_string();
        }

        if let Some(port) = url.port() {
            config.port = port;
        }

        let database = url.path().trim_start_matches('/');
        if !database.is_empty() {
            config.database = database.to_string();
        }

        Ok(config)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Options for opening a physical connection. The database is the
    /// `path` override if set.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            host: self.host.clone(),
            port: self.port,
            database: self.path.clone().unwrap_or_else(|| self.database.clone()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: DEFAULT_REPOSITORY.to_string(),
            host: "localhost".to_string(),
            port: Config::DEFAULT_PORT,
            database: "nestdoc".to_string(),
            path: None,
        }
    }
}
