use crate::error::Result;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// Production API base address
pub const PRODUCTION_URL: &str = "https://cloud.feedly.com/";

/// Sandbox API base address
pub const SANDBOX_URL: &str = "https://sandbox.feedly.com/";

/// Create the HTTP client owned by a Feedly client for its whole lifetime.
///
/// No request timeout is set: the caller's cancellation token is the only
/// deadline a request has.
pub fn create_http_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Configuration for the Feedly API client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address relative request paths are resolved against
    pub base_url: Url,
    /// User agent sent with every request
    pub user_agent: String,
    /// Log raw request and response bodies
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: Url::parse(PRODUCTION_URL).expect("production URL is valid"),
            user_agent: default_user_agent(),
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with the given base address
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Config {
            base_url: normalize_base(Url::parse(base_url)?),
            user_agent: default_user_agent(),
            debug: false,
        })
    }

    /// Configuration targeting the sandbox environment
    pub fn sandbox() -> Self {
        Config {
            base_url: Url::parse(SANDBOX_URL).expect("sandbox URL is valid"),
            ..Config::default()
        }
    }

    /// Set debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolve a request path against the base address.
    ///
    /// Absolute URLs are returned as-is; a leading `/` on a relative path is
    /// ignored so the base address prefix is kept.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        if let Ok(absolute) = Url::parse(path) {
            return Ok(absolute);
        }
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

// `Url::join` drops the last segment of a base without a trailing slash
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
