//! Gateway configuration.
//!
//! Sources, lowest precedence first:
//! - built-in defaults
//! - a TOML file (`gateway.toml`, or the path in `GATEWAY_CONFIG_FILE`)
//! - `GATEWAY__SECTION__KEY` environment variables
//! - the flat variables older deployments use (`PORT`, `API_URL`, `DEV`, ...)

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, info};

const MIN_SESSION_SECRET_BYTES: usize = 32;
const MAX_STATE_TTL_SECONDS: u64 = 3600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub downstream: DownstreamSection,
    pub session: SessionSection,
    pub oauth2: OAuth2Section,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Relaxes the session cookie flags for plain-HTTP local testing.
    #[serde(default)]
    pub dev: bool,

    /// Externally visible base URL, used to build OAuth2 callback URLs.
    /// Defaults to `http://localhost:<port>`.
    #[serde(default)]
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownstreamSection {
    #[serde(default)]
    pub api_url: String,

    /// Pre-shared key sent with sign-in and sign-provider calls.
    #[serde(default)]
    pub api_key_token: String,

    #[serde(default = "default_downstream_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Signs the short-lived OAuth2 state cookie.
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_remember_me_ttl")]
    pub remember_me_ttl_seconds: i64,

    #[serde(default = "default_standard_ttl")]
    pub standard_ttl_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuth2Section {
    #[serde(default = "default_state_ttl")]
    pub state_ttl_seconds: u64,

    #[serde(default = "default_oauth2_http_timeout")]
    pub http_timeout_seconds: u64,

    #[serde(default)]
    pub google: ProviderCredentials,

    #[serde(default)]
    pub github: ProviderCredentials,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl ProviderCredentials {
    /// Both halves, if the provider is configured.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (non_empty(&self.client_id), non_empty(&self.client_secret)) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }

    fn is_partial(&self) -> bool {
        non_empty(&self.client_id).is_some() != non_empty(&self.client_secret).is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    8000
}

fn default_downstream_timeout() -> u64 {
    10
}

fn default_remember_me_ttl() -> i64 {
    30 * 24 * 60 * 60
}

fn default_standard_ttl() -> i64 {
    2 * 60 * 60
}

fn default_state_ttl() -> u64 {
    600
}

fn default_oauth2_http_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dev: false,
            public_url: None,
        }
    }
}

impl Default for DownstreamSection {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key_token: String::new(),
            timeout_seconds: default_downstream_timeout(),
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            secret: String::new(),
            remember_me_ttl_seconds: default_remember_me_ttl(),
            standard_ttl_seconds: default_standard_ttl(),
        }
    }
}

impl Default for OAuth2Section {
    fn default() -> Self {
        Self {
            state_ttl_seconds: default_state_ttl(),
            http_timeout_seconds: default_oauth2_http_timeout(),
            google: ProviderCredentials::default(),
            github: ProviderCredentials::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from file and environment, then validate it.
    pub fn load() -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_path =
            std::env::var("GATEWAY_CONFIG_FILE").unwrap_or_else(|_| "gateway.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            info!("Loading configuration from {}", config_path);
            builder = builder.add_source(File::with_name(&config_path));
        } else {
            debug!("No config file found at {}, using defaults", config_path);
        }

        // e.g. GATEWAY__DOWNSTREAM__API_URL
        builder = builder.add_source(
            Environment::with_prefix("GATEWAY")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut settings: GatewayConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;

        Ok(settings)
    }

    /// Apply the flat legacy variables, looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().context("Invalid PORT value")?;
        }

        if let Some(dev) = lookup("DEV") {
            self.server.dev = matches!(dev.to_ascii_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Some(api_url) = lookup("API_URL") {
            self.downstream.api_url = api_url;
        }

        if let Some(api_key_token) = lookup("API_KEY_TOKEN") {
            self.downstream.api_key_token = api_key_token;
        }

        if let Some(secret) = lookup("SESSION_SECRET") {
            self.session.secret = secret;
        }

        let providers = [
            ("GOOGLE_CLIENT_ID", &mut self.oauth2.google.client_id),
            ("GOOGLE_CLIENT_SECRET", &mut self.oauth2.google.client_secret),
            ("GITHUB_CLIENT_ID", &mut self.oauth2.github.client_id),
            ("GITHUB_CLIENT_SECRET", &mut self.oauth2.github.client_secret),
        ];
        for (key, slot) in providers {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }

        if let Some(log_level) = lookup("RUST_LOG") {
            self.logging.level = log_level;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.downstream.api_url.is_empty() {
            anyhow::bail!("Downstream API url is required (API_URL)");
        }
        let api_url = reqwest::Url::parse(&self.downstream.api_url)
            .with_context(|| format!("Invalid downstream API url '{}'", self.downstream.api_url))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            anyhow::bail!("Downstream API url must use http or https");
        }

        if self.downstream.api_key_token.is_empty() {
            anyhow::bail!("Downstream API key token is required (API_KEY_TOKEN)");
        }

        if self.session.secret.len() < MIN_SESSION_SECRET_BYTES {
            anyhow::bail!(
                "Session secret must be at least {} bytes (SESSION_SECRET)",
                MIN_SESSION_SECRET_BYTES
            );
        }

        if self.downstream.timeout_seconds == 0 {
            anyhow::bail!("Downstream timeout must be positive");
        }
        if self.session.remember_me_ttl_seconds <= 0 || self.session.standard_ttl_seconds <= 0 {
            anyhow::bail!("Session TTLs must be positive");
        }
        if self.oauth2.state_ttl_seconds == 0 || self.oauth2.http_timeout_seconds == 0 {
            anyhow::bail!("OAuth2 state TTL and HTTP timeout must be positive");
        }
        if self.oauth2.state_ttl_seconds > MAX_STATE_TTL_SECONDS {
            anyhow::bail!(
                "OAuth2 state TTL must be at most {} seconds",
                MAX_STATE_TTL_SECONDS
            );
        }

        for (name, provider) in [("google", &self.oauth2.google), ("github", &self.oauth2.github)] {
            if provider.is_partial() {
                anyhow::bail!(
                    "OAuth2 provider '{}' needs both a client id and a client secret",
                    name
                );
            }
        }

        // Full filter directives are passed through to EnvFilter untouched.
        if !self.is_filter_directive() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            let level_lower = self.logging.level.to_lowercase();
            if !valid_levels.contains(&level_lower.as_str()) {
                anyhow::bail!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level,
                    valid_levels
                );
            }
        }

        let valid_formats = ["pretty", "json", "compact"];
        let format_lower = self.logging.format.to_lowercase();
        if !valid_formats.contains(&format_lower.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.server.host, self.server.port))
    }

    pub fn public_url(&self) -> String {
        match &self.server.public_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://localhost:{}", self.server.port),
        }
    }

    /// Where a provider sends the user agent back to.
    pub fn callback_url(&self, provider: &str) -> String {
        format!("{}/auth/{}/callback", self.public_url(), provider)
    }

    fn is_filter_directive(&self) -> bool {
        self.logging.level.contains('=') || self.logging.level.contains(',')
    }

    /// Get the log filter string for tracing
    pub fn log_filter(&self) -> String {
        if self.is_filter_directive() {
            self.logging.level.clone()
        } else {
            let level = self.logging.level.to_lowercase();
            format!(
                "gateway_server={level},gateway_identity_session={level},\
                 gateway_identity_oauth2={level},gateway_downstream={level},\
                 tower_http={level},{level}"
            )
        }
    }
}
