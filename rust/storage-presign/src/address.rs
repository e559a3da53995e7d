//! Bucket address and object URL resolution.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::canonical::canonical_uri;
use crate::error::ConfigError;

/// Address of a bucket on S3-compatible storage.
///
/// Combines endpoint, region, and bucket into a plain data struct that works
/// with any S3-compatible service (AWS S3, Cloudflare R2, MinIO, etc.).
///
/// # Examples
///
/// ```
/// use storage_presign::Address;
///
/// // AWS S3
/// let addr = Address::new("https://s3.amazonaws.com", "us-east-1", "my-bucket");
///
/// // Cloudflare R2
/// let addr = Address::new("https://account-id.r2.cloudflarestorage.com", "auto", "my-bucket");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    /// The S3-compatible endpoint URL (e.g., "https://s3.amazonaws.com")
    endpoint: String,
    /// Region for signing (e.g., "us-east-1", "auto" for R2)
    region: String,
    /// Bucket name
    bucket: String,
}

impl Address {
    /// Create a new address with the given endpoint, region, and bucket.
    ///
    /// This is infallible. Validation happens when a [`Signer`](crate::Signer) is built.
    pub fn new(
        endpoint: impl Into<String>,
        region: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: region.into(),
            bucket: bucket.into(),
        }
    }

    /// Get the endpoint URL string.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Validate the address and prepare it for building object URLs.
    ///
    /// Everything that depends only on configuration is resolved here: the
    /// bucket name, the endpoint, the addressing style and the `host` header.
    /// Building an object URL afterwards cannot fail.
    pub(crate) fn resolver(&self, path_style: Option<bool>) -> Result<Resolver, ConfigError> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::Empty("region"));
        }
        validate_bucket(&self.bucket)?;

        let endpoint =
            Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;
        let Some(host) = endpoint.host_str() else {
            return Err(ConfigError::InvalidEndpoint(format!(
                "{} has no host",
                self.endpoint
            )));
        };

        let path_style = path_style.unwrap_or_else(|| is_path_style_default(&endpoint));

        let mut base = endpoint.clone();
        base.set_query(None);
        base.set_fragment(None);
        if !path_style {
            if !matches!(endpoint.host(), Some(Host::Domain(_))) {
                return Err(ConfigError::InvalidEndpoint(format!(
                    "{} has no domain name to prefix with the bucket, use path-style addressing",
                    self.endpoint
                )));
            }
            base.set_host(Some(&format!("{}.{}", self.bucket, host)))
                .map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;
        }

        Ok(Resolver {
            host: extract_host(&base)?,
            base,
            bucket: self.bucket.clone(),
            path_style,
        })
    }
}

/// Check `bucket` against S3 bucket naming rules.
///
/// Names are 3 to 63 characters of lowercase letters, digits, `-` and `.`.
/// Every dot-separated label is non-empty and starts and ends with a letter
/// or digit. Names formatted as an IPv4 address are rejected.
///
/// ```
/// use storage_presign::address::validate_bucket;
///
/// assert!(validate_bucket("my-site.assets").is_ok());
/// assert!(validate_bucket("..").is_err());
/// assert!(validate_bucket("192.168.0.1").is_err());
/// ```
pub fn validate_bucket(bucket: &str) -> Result<(), ConfigError> {
    let invalid = || Err(ConfigError::InvalidBucket(bucket.to_string()));

    if !(3..=63).contains(&bucket.len()) {
        return invalid();
    }
    if !bucket
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return invalid();
    }
    for label in bucket.split('.') {
        let (Some(first), Some(last)) = (label.bytes().next(), label.bytes().last()) else {
            return invalid();
        };
        if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
            return invalid();
        }
    }
    if bucket.parse::<Ipv4Addr>().is_ok() {
        return invalid();
    }

    Ok(())
}

/// Builds object URLs for one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolver {
    base: Url,
    host: String,
    bucket: String,
    path_style: bool,
}

impl Resolver {
    /// Whether objects are addressed as `endpoint/bucket/key`.
    pub(crate) fn path_style(&self) -> bool {
        self.path_style
    }

    /// The `host` header value, port included when it is not the default.
    pub(crate) fn host(&self) -> &str {
        &self.host
    }

    /// Resolve `key` to an object URL.
    ///
    /// - path-style: `https://endpoint/bucket/key`
    /// - virtual-hosted style: `https://bucket.endpoint/key`
    ///
    /// The path is set to its canonical encoding, so the URL a client
    /// requests carries exactly the path that was signed.
    pub(crate) fn resolve(&self, key: &str) -> Url {
        let mut url = self.base.clone();
        if self.path_style {
            url.set_path(&canonical_uri(&format!("{}/{}", self.bucket, key)));
        } else {
            url.set_path(&canonical_uri(key));
        }
        url
    }
}

/// Determine if path-style URLs should be used by default for this endpoint.
///
/// Returns true for IP addresses and localhost, since virtual-hosted style
/// URLs require DNS resolution of `{bucket}.{host}`.
pub fn is_path_style_default(endpoint: &Url) -> bool {
    match endpoint.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => domain == "localhost",
        None => false,
    }
}

/// Extract the `host` header value from a URL, including non-default ports.
pub(crate) fn extract_host(url: &Url) -> Result<String, ConfigError> {
    let hostname = url
        .host_str()
        .ok_or_else(|| ConfigError::InvalidEndpoint(format!("{url} has no host")))?;

    Ok(match url.port() {
        Some(port) => format!("{}:{}", hostname, port),
        None => hostname.to_string(),
    })
}
