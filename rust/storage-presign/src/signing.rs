//! String-to-sign construction, key derivation and the final HMAC signature.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Algorithm identifier carried in the string-to-sign and `X-Amz-Algorithm`.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Terminator of every credential scope.
pub const KEY_TYPE_IDENTIFIER: &str = "aws4_request";

/// Service name used for S3-compatible storage.
pub const SERVICE: &str = "s3";

/// ISO 8601 basic format used for `X-Amz-Date`.
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A single instant formatted the two ways the protocol needs it.
///
/// Capture one per signing call so that the query, the scope and the
/// string-to-sign can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    /// `YYYYMMDDTHHMMSSZ`
    timestamp: String,
}

impl Timestamp {
    /// Format `time` at second precision.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// The full `YYYYMMDDTHHMMSSZ` form.
    pub fn as_str(&self) -> &str {
        &self.timestamp
    }

    /// The `YYYYMMDD` date stamp.
    pub fn date(&self) -> &str {
        &self.timestamp[0..8]
    }
}

/// Build the credential scope `YYYYMMDD/region/service/aws4_request`.
pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{}/{}/{}/{}", date, region, service, KEY_TYPE_IDENTIFIER)
}

/// Build the string-to-sign for a canonical request.
///
/// ```
/// use storage_presign::signing::string_to_sign;
///
/// let payload = string_to_sign("20130524T000000Z", "20130524/us-east-1/s3/aws4_request", "");
/// assert!(payload.starts_with("AWS4-HMAC-SHA256\n20130524T000000Z\n"));
/// ```
pub fn string_to_sign(timestamp: &str, scope: &str, canonical_request: &str) -> String {
    let digest = Sha256::digest(canonical_request.as_bytes());
    format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        timestamp,
        scope,
        hex_encode(&digest)
    )
}

/// AWS SigV4 signing key derived from credentials.
///
/// The key is derived through an HMAC chain:
/// `HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
///
/// Keys are derived per request and never cached; a key is only valid for
/// the date and region it was derived for.
#[derive(Clone)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// Derive a signing key using the AWS4 key derivation algorithm.
    pub fn derive(secret: &str, date: &str, region: &str, service: &str) -> Self {
        let secret = format!("AWS4{}", secret);
        let k_date = hmac(secret.as_bytes(), date.as_bytes());
        let k_region = hmac(&k_date, region.as_bytes());
        let k_service = hmac(&k_region, service.as_bytes());
        Self(hmac(&k_service, KEY_TYPE_IDENTIFIER.as_bytes()))
    }

    /// Sign data using this key.
    pub fn sign(&self, data: &[u8]) -> Signature {
        Signature(hmac(&self.0, data))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// HMAC-SHA256 signature bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature([u8; 32]);

impl std::fmt::Display for Signature {
    /// Displays hex encoded representation of the signature
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex_encode(&self.0))
    }
}

/// Compute HMAC-SHA256.
fn hmac(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Encode bytes as lowercase hexadecimal string.
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(s, "{:02x}", byte);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn it_hex_encodes_bytes() {
        assert_eq!(hex_encode(&[0x01, 0x02, 0x03, 0x0A, 0x0F]), "0102030a0f");
    }

    #[test]
    fn it_formats_timestamp_and_date_from_one_instant() {
        let time = Utc.with_ymd_and_hms(2013, 5, 24, 0, 0, 0).unwrap();
        let timestamp = Timestamp::new(time);
        assert_eq!(timestamp.as_str(), "20130524T000000Z");
        assert_eq!(timestamp.date(), "20130524");
    }

    #[test]
    fn it_drops_subsecond_precision() {
        let time = Utc.with_ymd_and_hms(2025, 5, 7, 5, 48, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(Timestamp::new(time).as_str(), "20250507T054859Z");
    }

    #[test]
    fn it_builds_credential_scope() {
        assert_eq!(
            credential_scope("20130524", "us-east-1", SERVICE),
            "20130524/us-east-1/s3/aws4_request"
        );
    }

    #[test]
    fn it_derives_signing_key_through_hmac_chain() {
        let key = SigningKey::derive("secret", "20130524", "us-east-1", SERVICE);
        assert_eq!(
            hex_encode(key.as_bytes()),
            "44c395e2497dc4996718788a26e654fdd0c19437edb8be81a63066316823ab85"
        );
    }

    #[test]
    fn it_hashes_canonical_request_into_string_to_sign() {
        let payload = string_to_sign("20130524T000000Z", "20130524/us-east-1/s3/aws4_request", "");
        assert_eq!(
            payload,
            "AWS4-HMAC-SHA256\n20130524T000000Z\n20130524/us-east-1/s3/aws4_request\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn it_signs_deterministically() {
        let key = SigningKey::derive("secret", "20130524", "us-east-1", SERVICE);
        let first = key.sign(b"payload");
        let second = key.sign(b"payload");
        assert_eq!(first, second);
        assert_eq!(first.to_string().len(), 64);
    }

    #[test]
    fn it_does_not_leak_key_in_debug() {
        let key = SigningKey::derive("secret", "20130524", "us-east-1", SERVICE);
        assert_eq!(format!("{:?}", key), "SigningKey(..)");
    }
}
