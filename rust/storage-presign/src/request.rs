//! Presign request description and input validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SigningError;

/// Default URL expiration: 1 hour.
pub const DEFAULT_EXPIRES: u64 = 3600;

/// Longest validity window a SigV4 verifier accepts: 7 days.
pub const MAX_EXPIRES: u64 = 604_800;

/// HTTP methods a presigned URL can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Download an object
    Get,
    /// Upload an object
    Put,
    /// Remove an object
    Delete,
}

impl Method {
    /// The method as it appears on the wire and in the canonical request.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = SigningError;

    /// Parses `GET`, `PUT` or `DELETE`. Matching is case-sensitive, as HTTP
    /// methods are.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(SigningError::InvalidMethod(other.to_string())),
        }
    }
}

/// A request to presign.
///
/// ```
/// use storage_presign::{Method, SigningRequest};
///
/// let upload = SigningRequest::new(Method::Put, "avatars/me.png")
///     .with_content_type("image/png")
///     .with_expires(600);
/// assert_eq!(upload.expires(), 600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningRequest {
    method: Method,
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(default = "default_expires")]
    expires: u64,
}

fn default_expires() -> u64 {
    DEFAULT_EXPIRES
}

impl SigningRequest {
    /// Create a request for `key` valid for [`DEFAULT_EXPIRES`] seconds.
    pub fn new(method: Method, key: impl Into<String>) -> Self {
        Self {
            method,
            key: key.into(),
            content_type: None,
            expires: DEFAULT_EXPIRES,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(key: impl Into<String>) -> Self {
        Self::new(Method::Get, key)
    }

    /// Shorthand for a PUT request.
    pub fn put(key: impl Into<String>) -> Self {
        Self::new(Method::Put, key)
    }

    /// Shorthand for a DELETE request.
    pub fn delete(key: impl Into<String>) -> Self {
        Self::new(Method::Delete, key)
    }

    /// Sign a `content-type` header, which the client must then send verbatim.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the validity window in seconds.
    pub fn with_expires(mut self, expires: u64) -> Self {
        self.expires = expires;
        self
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Object key, unescaped.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Content type to sign, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Validity window in seconds.
    pub fn expires(&self) -> u64 {
        self.expires
    }

    /// Reject input that cannot produce a usable URL.
    ///
    /// # Errors
    ///
    /// See [`validate_key`] for key rules. `expires` must lie in
    /// `1..=`[`MAX_EXPIRES`]. A content type must be non-blank and free of
    /// control characters.
    pub fn validate(&self) -> Result<(), SigningError> {
        validate_key(&self.key)?;

        if self.expires == 0 || self.expires > MAX_EXPIRES {
            return Err(SigningError::InvalidExpires(self.expires));
        }

        if let Some(content_type) = &self.content_type {
            if content_type.trim().is_empty() || content_type.chars().any(char::is_control) {
                return Err(SigningError::InvalidContentType(content_type.clone()));
            }
        }

        Ok(())
    }
}

/// Check that `key` names an object inside the bucket.
///
/// Nested prefixes (`a/b/c`) are allowed. Rejected are: the empty key, a
/// leading `/`, empty segments (`a//b`), `.` and `..` segments, and control
/// characters.
///
/// ```
/// use storage_presign::request::validate_key;
///
/// assert!(validate_key("blog/2024/cover.jpg").is_ok());
/// assert!(validate_key("../etc/passwd").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<(), SigningError> {
    let invalid = |reason| {
        Err(SigningError::InvalidKey {
            key: key.to_string(),
            reason,
        })
    };

    if key.is_empty() {
        return invalid("key is empty");
    }
    if key.starts_with('/') {
        return invalid("key must be relative to the bucket root");
    }
    if key.chars().any(char::is_control) {
        return invalid("key contains control characters");
    }

    let segments: Vec<&str> = key.split('/').collect();
    let last = segments.len() - 1;
    for (index, segment) in segments.iter().enumerate() {
        match *segment {
            "." | ".." => return invalid("key contains a relative path segment"),
            // A trailing slash addresses a "directory" marker object
            "" if index != last => return invalid("key contains an empty path segment"),
            _ => {}
        }
    }

    Ok(())
}
