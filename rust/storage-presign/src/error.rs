//! Error types for configuration and signing.

use thiserror::Error;

/// Errors raised while assembling a [`Config`](crate::Config).
///
/// These are fatal at startup: a [`Signer`](crate::Signer) can only be built
/// from a configuration that passed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing configuration variable: {0}")]
    Missing(&'static str),
    /// A required field is present but blank.
    #[error("configuration field is empty: {0}")]
    Empty(&'static str),
    /// The endpoint could not be parsed, has no host, or cannot be
    /// prefixed with the bucket for virtual-hosted addressing.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// The bucket name breaks S3 naming rules.
    #[error("invalid bucket name: {0}")]
    InvalidBucket(String),
    /// A boolean flag could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidFlag {
        /// Variable name
        name: &'static str,
        /// Rejected value
        value: String,
    },
}

/// Errors that can occur while presigning a request.
///
/// Every variant describes rejected input. Signing itself is pure computation
/// over validated input and has no failure modes of its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// The object key is empty or would escape the bucket root.
    #[error("invalid object key {key:?}: {reason}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// Why it was rejected
        reason: &'static str,
    },
    /// The validity window is zero or longer than the protocol allows.
    #[error("invalid expiry of {0} seconds (must be between 1 and 604800)")]
    InvalidExpires(u64),
    /// The HTTP method is not one of GET, PUT or DELETE.
    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),
    /// The content type is blank or contains characters that would corrupt
    /// the canonical header block.
    #[error("invalid content type: {0:?}")]
    InvalidContentType(String),
}
