//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_TOKEN_SECRET` - Session token signing secret (min 32 chars, high entropy)
//! - `PAYMENT_CALLBACK_TOKEN` - Shared token the payment simulator sends back
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SUPER_ADMIN_EMAILS` - Comma-separated admins allowed to manage other admins
//! - `PAYMENT_SANDBOX_URL` - Base of generated payment links (default: <https://sandbox.xendit.co/pay>)
//! - `AUTH_RATE_LIMIT_BURST` - Register/login attempts allowed back to back per client (default: 5)
//! - `AUTH_RATE_LIMIT_REPLENISH_SECS` - Seconds until one more attempt is allowed (default: 6)
//! - `STOREFRONT_TRUST_PROXY` - Key the rate limiter on proxy headers such as
//!   `X-Forwarded-For` instead of the TCP peer (default: false). Only enable
//!   behind a proxy that overwrites them.
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Fraction of errors sent to Sentry (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of transactions traced (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use aneka_citra_core::Email;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_SANDBOX_URL: &str = "https://sandbox.xendit.co/pay";
const DEFAULT_AUTH_BURST: &str = "5";
const DEFAULT_AUTH_REPLENISH_SECS: &str = "6";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session token signing secret
    pub token_secret: SecretString,
    /// Admins allowed to list and create other admins
    pub super_admins: Vec<Email>,
    /// Payment simulator configuration
    pub payment: PaymentConfig,
    /// Limits on the credential endpoints
    pub rate_limit: RateLimitConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Payment simulator configuration.
///
/// Implements `Debug` manually to redact the callback token.
#[derive(Clone)]
pub struct PaymentConfig {
    /// Base URL invoice ids are appended to
    pub sandbox_url: String,
    /// Token the simulator must echo in `x-callback-token`
    pub callback_token: SecretString,
}

/// Rate limits applied to register and login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Attempts a client may make back to back
    pub burst: u32,
    /// Seconds until one more attempt is allowed
    pub replenish_secs: u64,
    /// Whether client IPs come from proxy headers rather than the TCP peer
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 5,
            replenish_secs: 6,
            trust_proxy_headers: false,
        }
    }
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("sandbox_url", &self.sandbox_url)
            .field("callback_token", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let token_secret = get_validated_secret("STOREFRONT_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "STOREFRONT_TOKEN_SECRET")?;

        let super_admins = parse_email_list(
            &get_env_or_default("SUPER_ADMIN_EMAILS", ""),
            "SUPER_ADMIN_EMAILS",
        )?;
        let payment = PaymentConfig::from_env()?;
        let rate_limit = RateLimitConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_sample_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            token_secret,
            super_admins,
            payment,
            rate_limit,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Whether `email` is on the super admin allow-list.
    #[must_use]
    pub fn is_super_admin(&self, email: &Email) -> bool {
        self.super_admins.contains(email)
    }
}

impl PaymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sandbox_url = get_env_or_default("PAYMENT_SANDBOX_URL", DEFAULT_SANDBOX_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            sandbox_url,
            callback_token: get_validated_secret("PAYMENT_CALLBACK_TOKEN")?,
        })
    }
}

impl RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            burst: get_positive("AUTH_RATE_LIMIT_BURST", DEFAULT_AUTH_BURST)?,
            replenish_secs: get_positive(
                "AUTH_RATE_LIMIT_REPLENISH_SECS",
                DEFAULT_AUTH_REPLENISH_SECS,
            )?,
            trust_proxy_headers: get_flag("STOREFRONT_TRUST_PROXY")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a sampling fraction in `0.0..=1.0`.
fn get_sample_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let raw = get_env_or_default(key, default);
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{raw} is not between 0.0 and 1.0"),
        ));
    }
    Ok(rate)
}

/// Parse a non-zero integer.
fn get_positive<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + From<u8>,
    T::Err: std::fmt::Display,
{
    parse_positive(&get_env_or_default(key, default), key)
}

fn parse_positive<T>(raw: &str, key: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + From<u8>,
    T::Err: std::fmt::Display,
{
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value == T::from(0) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than 0".to_string(),
        ));
    }
    Ok(value)
}

/// Parse a boolean flag. Unset means false.
fn get_flag(key: &str) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(false), |raw| parse_flag(&raw, key))
}

fn parse_flag(raw: &str, key: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{other} is not a boolean"),
        )),
    }
}

/// Parse a comma-separated email list. Blank entries are skipped.
fn parse_email_list(raw: &str, var_name: &str) -> Result<Vec<Email>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            Email::parse(entry).map_err(|e| {
                ConfigError::InvalidEnvVar(var_name.to_string(), format!("{entry}: {e}"))
            })
        })
        .collect()
}

/// Validate that a token secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A config suitable for handler tests. Nothing here touches the network.
    pub(crate) fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/aneka_citra_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            token_secret: SecretString::from("k7Vq2pXz9LmN4rTb8WcY1sHd6FgJ3eAu"),
            super_admins: vec![Email::parse("admin@anekacitra.com").unwrap()],
            payment: PaymentConfig {
                sandbox_url: DEFAULT_SANDBOX_URL.to_string(),
                callback_token: SecretString::from("cb_Q8m2Zr5Kx1Lw7Pn4Tj9Vd3Hs6"),
            },
            rate_limit: RateLimitConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-token-secret-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_token_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_token_secret(&secret, "TEST_TOKEN").is_err());
    }

    #[test]
    fn test_parse_email_list() {
        let admins =
            parse_email_list(" Admin@AnekaCitra.com, ,owner@anekacitra.com ", "TEST").unwrap();
        assert_eq!(admins.len(), 2);
        assert_eq!(admins[0].as_str(), "admin@anekacitra.com");

        assert!(parse_email_list("", "TEST").unwrap().is_empty());
        assert!(matches!(
            parse_email_list("not-an-email", "TEST"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive::<u32>(" 50 ", "TEST").unwrap(), 50);
        assert!(matches!(
            parse_positive::<u32>("0", "TEST"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_positive::<u64>("-1", "TEST").is_err());
        assert!(parse_positive::<u64>("six", "TEST").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true", "TEST").unwrap());
        assert!(parse_flag(" On ", "TEST").unwrap());
        assert!(!parse_flag("0", "TEST").unwrap());
        assert!(parse_flag("maybe", "TEST").is_err());
    }

    #[test]
    fn test_rate_limit_defaults() {
        let limits = RateLimitConfig::default();
        assert_eq!((limits.burst, limits.replenish_secs), (5, 6));
        assert!(!limits.trust_proxy_headers);
    }

    #[test]
    fn test_super_admin_check() {
        let config = test_config();
        assert!(config.is_super_admin(&Email::parse("ADMIN@anekacitra.com").unwrap()));
        assert!(!config.is_super_admin(&Email::parse("staff@anekacitra.com").unwrap()));
    }

    #[test]
    fn test_secure_cookies_follow_scheme() {
        let mut config = test_config();
        assert!(!config.secure_cookies());
        config.base_url = "https://anekacitra.com".to_string();
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_payment_config_debug_redacts_token() {
        let debug_output = format!("{:?}", test_config().payment);
        assert!(debug_output.contains("sandbox.xendit.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("cb_Q8m2"));
    }
}
