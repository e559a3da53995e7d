//! Signer configuration.
//!
//! A [`Config`] is assembled once at startup, usually from the process
//! environment, and handed to [`Signer::new`](crate::Signer::new). There is no
//! ambient configuration: everything the signer needs is in this struct.

use serde::{Deserialize, Serialize};

use crate::address::{Address, Resolver};
use crate::error::ConfigError;

/// Environment variable holding the access key ID.
pub const ACCESS_KEY_ID_VAR: &str = "STORAGE_ACCESS_KEY_ID";
/// Environment variable holding the secret access key.
pub const SECRET_ACCESS_KEY_VAR: &str = "STORAGE_SECRET_ACCESS_KEY";
/// Environment variable holding an optional session token.
pub const SESSION_TOKEN_VAR: &str = "STORAGE_SESSION_TOKEN";
/// Environment variable holding the signing region.
pub const REGION_VAR: &str = "STORAGE_REGION";
/// Environment variable holding the base endpoint URL.
pub const ENDPOINT_VAR: &str = "STORAGE_ENDPOINT";
/// Environment variable holding the bucket name.
pub const BUCKET_VAR: &str = "STORAGE_BUCKET";
/// Environment variable forcing path-style (`true`) or virtual-hosted (`false`) URLs.
pub const PATH_STYLE_VAR: &str = "STORAGE_PATH_STYLE";

/// Region used when [`REGION_VAR`] is not set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Long-lived access credentials.
///
/// `Debug` never prints the secret or the session token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Access Key ID
    access_key_id: String,
    /// Secret Access Key
    secret_access_key: String,
    /// Session token for temporary credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_token: Option<String>,
}

impl Credentials {
    /// Create credentials from an access key pair.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token, as issued with temporary credentials.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Get the access key ID.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub(crate) fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Get the session token, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Everything needed to presign requests for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bucket location
    pub address: Address,
    /// Signing credentials
    pub credentials: Credentials,
    /// Force path-style (`Some(true)`) or virtual-hosted (`Some(false)`)
    /// addressing. `None` picks path-style for IP and localhost endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_style: Option<bool>,
}

impl Config {
    /// Create a configuration from an address and credentials.
    pub fn new(address: Address, credentials: Credentials) -> Self {
        Self {
            address,
            credentials,
            path_style: None,
        }
    }

    /// Set whether to use path-style URLs.
    pub fn with_path_style(mut self, path_style: bool) -> Self {
        self.path_style = Some(path_style);
        self
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use storage_presign::Config;
    ///
    /// let vars = HashMap::from([
    ///     ("STORAGE_ACCESS_KEY_ID", "AKIDEXAMPLE"),
    ///     ("STORAGE_SECRET_ACCESS_KEY", "secret"),
    ///     ("STORAGE_ENDPOINT", "https://s3.amazonaws.com"),
    ///     ("STORAGE_BUCKET", "examplebucket"),
    /// ]);
    /// let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
    /// assert_eq!(config.address.region(), "us-east-1");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let access_key_id = required(ACCESS_KEY_ID_VAR)?;
        let secret_access_key = required(SECRET_ACCESS_KEY_VAR)?;
        let endpoint = required(ENDPOINT_VAR)?;
        let bucket = required(BUCKET_VAR)?;
        let region = lookup(REGION_VAR).unwrap_or_else(|| {
            tracing::warn!(region = DEFAULT_REGION, "{REGION_VAR} not set, using default");
            DEFAULT_REGION.to_string()
        });

        let mut credentials = Credentials::new(access_key_id, secret_access_key);
        if let Some(token) = lookup(SESSION_TOKEN_VAR).filter(|t| !t.is_empty()) {
            credentials = credentials.with_session_token(token);
        }

        let path_style = match lookup(PATH_STYLE_VAR) {
            None => None,
            Some(value) => Some(parse_flag(PATH_STYLE_VAR, &value)?),
        };

        let config = Self {
            address: Address::new(endpoint, region, bucket),
            credentials,
            path_style,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can produce valid signed URLs.
    ///
    /// # Errors
    ///
    /// Returns an error for blank credentials, an unparseable endpoint, or a
    /// bucket name that cannot be used in a host name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolver().map(|_| ())
    }

    pub(crate) fn resolver(&self) -> Result<Resolver, ConfigError> {
        if self.credentials.access_key_id.trim().is_empty() {
            return Err(ConfigError::Empty("access_key_id"));
        }
        if self.credentials.secret_access_key.is_empty() {
            return Err(ConfigError::Empty("secret_access_key"));
        }
        self.address.resolver(self.path_style)
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
