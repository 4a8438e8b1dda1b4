//! Configuration for the seeding run.

use std::fmt;

use reqwest::Url;
use thiserror::Error;

/// Environment variable holding the Supabase project URL.
pub const BASE_URL_VAR: &str = "NEXT_PUBLIC_SUPABASE_URL";

/// Environment variable holding the service-role key.
pub const SERVICE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Environment variable overriding the user whose stats are seeded.
pub const USER_EMAIL_VAR: &str = "SEED_USER_EMAIL";

/// The demo player account the dashboard is checked against.
pub const DEFAULT_USER_EMAIL: &str = "player@matchday.com";

/// Dotenv files read at startup, in precedence order.
const DOTENV_FILES: [&str; 2] = [".env.local", ".env"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Loads `.env.local` and `.env` from the working directory.
///
/// Variables already present in the process environment win, and the
/// first file wins over the second. Missing files are ignored.
pub fn load_dotenv() {
    for name in DOTENV_FILES {
        dotenvy::from_filename(name).ok();
    }
}

/// Connection settings and target user for one seeding run.
#[derive(Clone)]
pub struct SeedConfig {
    /// Project URL without the `/rest/v1` suffix or trailing slash.
    pub base_url: String,
    /// Service-role key, sent as both `apikey` and bearer token.
    pub service_key: String,
    /// Email of the user to seed stats for.
    pub user_email: String,
}

impl SeedConfig {
    /// Builds a config from possibly-unset values, rejecting blanks.
    pub fn resolve(
        base_url: Option<String>,
        service_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = non_blank(base_url).ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        let service_key = non_blank(service_key).ok_or(ConfigError::Missing(SERVICE_KEY_VAR))?;

        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url,
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url,
            service_key: service_key.trim().to_string(),
            user_email: DEFAULT_USER_EMAIL.to_string(),
        })
    }

    /// Sets the user to seed stats for.
    pub fn with_user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = email.into();
        self
    }
}

impl fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"<redacted>")
            .field("user_email", &self.user_email)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
