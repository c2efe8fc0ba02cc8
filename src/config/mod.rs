//! Configuration handling for the digest service.
//!
//! Everything is read from the environment once at process start and then
//! shared read-only. `Config::from_env` applies development defaults for
//! everything except the reply sender address.

use std::collections::BTreeSet;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;
use std::time::Duration;

use url::Url;

/// Environment variable names. Keeping them public lets tests refer to them.
pub const ENV_FROM_ADDRESS: &str = "FROM_ADDRESS";
pub const ENV_EMAIL_DOMAIN: &str = "EMAIL_DOMAIN";
pub const ENV_ACCEPTED_LANGUAGES: &str = "ACCEPTED_LANGUAGES";
pub const ENV_LISTING_BASE_URL: &str = "LISTING_BASE_URL";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_RUN_DEADLINE_SECS: &str = "RUN_DEADLINE_SECS";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_MESSAGE_STORE_ROOT: &str = "MESSAGE_STORE_ROOT";
pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_SMTP_USERNAME: &str = "SMTP_USERNAME";
pub const ENV_SMTP_PASSWORD: &str = "SMTP_PASSWORD";

/// Default development values used when environment variables are absent.
pub const DEFAULT_LISTING_BASE_URL: &str = "https://www.linkedin.com/comm/jobs/view/";
const DEFAULT_ACCEPTED_LANGUAGES: &str = "en";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RUN_DEADLINE_SECS: u64 = 300;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_MESSAGE_STORE_ROOT: &str = "./mail";
const DEFAULT_SMTP_HOST: &str = "localhost";
const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP relay settings for the outgoing reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    from_address: String,
    email_domain: Option<String>,
    accepted_languages: BTreeSet<String>,
    listing_base_url: Url,
    fetch_timeout: Duration,
    run_deadline: Duration,
    bind_addr: String,
    message_store_root: String,
    smtp: SmtpSettings,
}

impl Config {
    /// Create a config with development defaults and the given sender address.
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            email_domain: None,
            accepted_languages: parse_languages(DEFAULT_ACCEPTED_LANGUAGES),
            listing_base_url: default_listing_base_url(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            run_deadline: Duration::from_secs(DEFAULT_RUN_DEADLINE_SECS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            message_store_root: DEFAULT_MESSAGE_STORE_ROOT.to_string(),
            smtp: SmtpSettings::default(),
        }
    }

    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let from_address = env::var(ENV_FROM_ADDRESS)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing {
                field: ENV_FROM_ADDRESS,
            })?;

        let email_domain = env::var(ENV_EMAIL_DOMAIN)
            .ok()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty());

        let accepted_languages = parse_languages(
            &env::var(ENV_ACCEPTED_LANGUAGES)
                .unwrap_or_else(|_| DEFAULT_ACCEPTED_LANGUAGES.to_string()),
        );

        let listing_base_url = match env::var(ENV_LISTING_BASE_URL) {
            Ok(raw) => parse_base_url(&raw)?,
            Err(_) => default_listing_base_url(),
        };

        let fetch_timeout = Duration::from_secs(parse_number(
            ENV_FETCH_TIMEOUT_SECS,
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?);
        let run_deadline = Duration::from_secs(parse_number(
            ENV_RUN_DEADLINE_SECS,
            DEFAULT_RUN_DEADLINE_SECS,
        )?);

        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let message_store_root = env::var(ENV_MESSAGE_STORE_ROOT)
            .unwrap_or_else(|_| DEFAULT_MESSAGE_STORE_ROOT.to_string());

        let smtp = SmtpSettings {
            host: env::var(ENV_SMTP_HOST).unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string()),
            port: parse_number(ENV_SMTP_PORT, DEFAULT_SMTP_PORT)?,
            username: env::var(ENV_SMTP_USERNAME).ok(),
            password: env::var(ENV_SMTP_PASSWORD).ok(),
        };

        Ok(Self {
            from_address,
            email_domain,
            accepted_languages,
            listing_base_url,
            fetch_timeout,
            run_deadline,
            bind_addr,
            message_store_root,
            smtp,
        })
    }

    pub fn with_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.email_domain = Some(domain.into().to_lowercase());
        self
    }

    pub fn with_accepted_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_listing_base_url(mut self, base: &str) -> Result<Self, ConfigError> {
        self.listing_base_url = parse_base_url(base)?;
        Ok(self)
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_run_deadline(mut self, deadline: Duration) -> Self {
        self.run_deadline = deadline;
        self
    }

    /// Address the digest reply is sent from.
    pub fn from_address(&self) -> &str {
        &self.from_address
    }
    /// Sender domain notifications must come from, if restricted.
    pub fn email_domain(&self) -> Option<&str> {
        self.email_domain.as_deref()
    }
    /// Language codes a listing description must be written in.
    pub fn accepted_languages(&self) -> &BTreeSet<String> {
        &self.accepted_languages
    }
    /// Prefix used both to recognise listing links and to fetch listings.
    /// Always ends with a `/`.
    pub fn listing_base_url(&self) -> &Url {
        &self.listing_base_url
    }
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    pub fn run_deadline(&self) -> Duration {
        self.run_deadline
    }
    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Directory holding stored raw messages, laid out as `<bucket>/<key>`.
    pub fn message_store_root(&self) -> &str {
        &self.message_store_root
    }
    pub fn smtp(&self) -> &SmtpSettings {
        &self.smtp
    }
}

static DEFAULT_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(DEFAULT_LISTING_BASE_URL).expect("Failed to parse default listing url")
});

fn default_listing_base_url() -> Url {
    DEFAULT_BASE_URL.clone()
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::InvalidValue {
        field: ENV_LISTING_BASE_URL,
        reason: e.to_string(),
    })
}

fn parse_languages(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_number<T: std::str::FromStr>(field: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    match env::var(field) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                field,
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is absent or empty.
    Missing { field: &'static str },
    /// A variable is present but cannot be parsed.
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing { field } => write!(f, "missing required '{}'", field),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
