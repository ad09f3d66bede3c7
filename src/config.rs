//! Gateway configuration

use crate::error::ConfigError;
use std::path::Path;
use std::time::Duration;

/// Default TCP port the gateway listens on
pub const DEFAULT_PORT: u16 = 7300;

/// Default feed list file, one URL per line
pub const DEFAULT_FEED_FILE: &str = "rssfeed.url";

/// Default upper bound for a single feed retrieval
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of headlines shown per page (fits 24x80 with header/footer)
pub const DEFAULT_MAX_HEADLINES: usize = 18;

/// Default budget for telnet option negotiation
pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway configuration
///
/// # Example
///
/// ```
/// use rss3270::GatewayConfig;
///
/// let config = GatewayConfig::on_port(2323);
/// assert_eq!(config.listen_addr(), "0.0.0.0:2323");
/// ```
#[must_use]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GatewayConfig {
    /// Interface to bind (e.g., "0.0.0.0")
    pub bind: String,

    /// Listen port
    pub port: u16,

    /// Path of the newline-separated feed list
    pub feed_file: String,

    /// Upper bound for one feed retrieval
    pub fetch_timeout: Duration,

    /// Maximum number of headlines fetched per refresh
    pub max_headlines: usize,

    /// Upper bound for telnet negotiation with a new client
    pub negotiation_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            feed_file: DEFAULT_FEED_FILE.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_headlines: DEFAULT_MAX_HEADLINES,
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Default configuration listening on `port`
    pub fn on_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Socket address string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Check values that would make the gateway unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero headline limit or a
    /// zero fetch timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_headlines == 0 {
            return Err(ConfigError::InvalidValue(
                "max_headlines must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "fetch_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse feed list text: one URL per line, blank lines and `#` comments skipped
pub fn parse_feed_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read the feed list file
///
/// # Errors
///
/// - [`ConfigError::Unreadable`] if the file cannot be read
/// - [`ConfigError::EmptyRegistry`] if it contains no URLs
pub fn load_feed_urls(path: impl AsRef<Path>) -> Result<Vec<String>, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let urls = parse_feed_urls(&content);
    if urls.is_empty() {
        return Err(ConfigError::EmptyRegistry);
    }
    Ok(urls)
}
