//! Canonical request construction for AWS Signature Version 4.
//!
//! The canonical request is the newline separated form:
//!
//! ```text
//! HTTPMethod
//! CanonicalURI
//! CanonicalQueryString
//! CanonicalHeaders (each line terminated by \n)
//! SignedHeaders
//! HashedPayload
//! ```
//!
//! Everything here is a pure function over strings. The verifying server
//! rebuilds the same bytes from the request it receives, so any divergence in
//! ordering, escaping or whitespace surfaces as a signature mismatch.

use std::fmt::Write;

/// Payload hash placeholder used by presigned URLs. The body is never signed.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Percent-encode a string according to RFC 3986.
///
/// Unreserved characters (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) are not encoded.
/// All other bytes are encoded as `%XX` where XX is the uppercase hex value,
/// so a space becomes `%20` (never `+`) and `/`, `:`, `=` are escaped.
///
/// ```
/// use storage_presign::canonical::percent_encode;
///
/// assert_eq!(percent_encode("a b+c/d"), "a%20b%2Bc%2Fd");
/// ```
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                // Writing into a String cannot fail.
                let _ = write!(result, "%{:02X}", byte);
            }
        }
    }
    result
}

/// Build the canonical URI for an object path.
///
/// Each `/` separated segment is encoded individually and the separators are
/// preserved. The result always starts with `/`.
///
/// ```
/// use storage_presign::canonical::canonical_uri;
///
/// assert_eq!(canonical_uri("test.txt"), "/test.txt");
/// assert_eq!(canonical_uri("photos/my cat.png"), "/photos/my%20cat.png");
/// assert_eq!(canonical_uri(""), "/");
/// ```
pub fn canonical_uri(path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    let mut uri = String::with_capacity(path.len() + 1);
    for segment in path.split('/') {
        uri.push('/');
        uri.push_str(&percent_encode(segment));
    }
    uri
}

/// Build the canonical query string from key/value pairs.
///
/// Pairs are sorted by encoded key, then by encoded value, and joined as
/// `key=value` with `&`. The output does not depend on input order. Empty
/// input yields an empty string.
///
/// ```
/// use storage_presign::canonical::canonical_query_string;
///
/// assert_eq!(canonical_query_string([("b", "2"), ("a", "x/y")]), "a=x%2Fy&b=2");
/// ```
pub fn canonical_query_string<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (percent_encode(k.as_ref()), percent_encode(v.as_ref())))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical header block and the matching signed header list.
///
/// Both fields are produced from a single sorted traversal, so the order of
/// names in [`signed_headers`](Self::signed_headers) always matches the order
/// of lines in [`block`](Self::block).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHeaders {
    /// `name:value\n` per header, trailing newline included
    pub block: String,
    /// Header names joined with `;`
    pub signed_headers: String,
}

/// Canonicalize a set of headers.
///
/// Header names are expected to be lowercase already. Values are trimmed and
/// runs of whitespace inside them collapse to a single space. Duplicate names
/// are not merged.
///
/// ```
/// use storage_presign::canonical::canonical_headers;
///
/// let headers = canonical_headers([("b", "2  3"), ("a", " 1 ")]);
/// assert_eq!(headers.block, "a:1\nb:2 3\n");
/// assert_eq!(headers.signed_headers, "a;b");
/// ```
pub fn canonical_headers<I, K, V>(headers: I) -> CanonicalHeaders
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut sorted: Vec<(K, V)> = headers.into_iter().collect();
    sorted.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

    let mut block = String::new();
    let mut names = Vec::with_capacity(sorted.len());
    for (name, value) in &sorted {
        block.push_str(name.as_ref());
        block.push(':');
        block.push_str(&value.as_ref().split_whitespace().collect::<Vec<_>>().join(" "));
        block.push('\n');
        names.push(name.as_ref());
    }

    CanonicalHeaders {
        block,
        signed_headers: names.join(";"),
    }
}

/// Assemble the canonical request from its six components.
///
/// The header block already ends with a newline, which yields the blank line
/// between the headers and the signed header list.
pub fn canonical_request(
    method: &str,
    uri: &str,
    query: &str,
    headers: &CanonicalHeaders,
    payload_hash: &str,
) -> String {
    [
        method,
        uri,
        query,
        headers.block.as_str(),
        headers.signed_headers.as_str(),
        payload_hash,
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn it_percent_encodes_strings() {
        assert_eq!(percent_encode("abc123-_.~"), "abc123-_.~");
        assert_eq!(percent_encode("a b+c"), "a%20b%2Bc");
        assert_eq!(percent_encode("test/path"), "test%2Fpath");
        assert_eq!(percent_encode("k:v=w;x"), "k%3Av%3Dw%3Bx");
    }

    #[test]
    fn it_percent_encodes_multibyte_characters() {
        assert_eq!(percent_encode("é"), "%C3%A9");
    }

    #[test]
    fn it_builds_canonical_uri_per_segment() {
        assert_eq!(canonical_uri("a/b c/d+e"), "/a/b%20c/d%2Be");
        assert_eq!(canonical_uri("/already/rooted"), "/already/rooted");
    }

    #[test]
    fn it_keeps_trailing_slash_in_uri() {
        assert_eq!(canonical_uri("prefix/"), "/prefix/");
    }

    #[test]
    fn it_returns_empty_query_for_no_params() {
        let params: [(&str, &str); 0] = [];
        assert_eq!(canonical_query_string(params), "");
    }

    #[test]
    fn it_sorts_query_by_key_then_value() {
        assert_eq!(
            canonical_query_string([("b", "2"), ("a", "2"), ("a", "1")]),
            "a=1&a=2&b=2"
        );
    }

    #[test]
    fn it_sorts_query_bytewise() {
        // Uppercase sorts before lowercase
        assert_eq!(
            canonical_query_string([("x-amz-acl", "private"), ("X-Amz-Date", "d")]),
            "X-Amz-Date=d&x-amz-acl=private"
        );
    }

    #[test]
    fn it_canonicalizes_headers_in_sorted_order() {
        let headers = canonical_headers([("b", "2"), ("a", "1")]);
        assert_eq!(headers.block, "a:1\nb:2\n");
        assert_eq!(headers.signed_headers, "a;b");
    }

    #[test]
    fn it_collapses_inner_whitespace_in_header_values() {
        let headers = canonical_headers([("content-type", " text/plain;  charset=utf-8 ")]);
        assert_eq!(headers.block, "content-type:text/plain; charset=utf-8\n");

        let headers = canonical_headers([("x-amz-meta-note", "a \t  b")]);
        assert_eq!(headers.block, "x-amz-meta-note:a b\n");
    }

    #[test]
    fn it_does_not_deduplicate_headers() {
        let headers = canonical_headers([("a", "1"), ("a", "2")]);
        assert_eq!(headers.block, "a:1\na:2\n");
        assert_eq!(headers.signed_headers, "a;a");
    }

    #[test]
    fn it_assembles_canonical_request() {
        let headers = canonical_headers([("host", "examplebucket.s3.amazonaws.com")]);
        let request = canonical_request("GET", "/test.txt", "a=1", &headers, UNSIGNED_PAYLOAD);
        assert_eq!(
            request,
            "GET\n/test.txt\na=1\nhost:examplebucket.s3.amazonaws.com\n\nhost\nUNSIGNED-PAYLOAD"
        );
    }

    fn query_params() -> impl Strategy<Value = Vec<(String, String)>> {
        proptest::collection::vec(("[A-Za-z0-9 /:=+-]{0,8}", "[ -~]{0,12}"), 0..8)
    }

    fn header_map() -> impl Strategy<Value = std::collections::BTreeMap<String, String>> {
        proptest::collection::btree_map("[a-z][a-z-]{0,10}", "[ -~&&[^:]]{0,12}", 1..6)
    }

    proptest! {
        #[test]
        fn it_ignores_query_insertion_order(
            (params, shuffled) in query_params()
                .prop_flat_map(|params| (Just(params.clone()), Just(params).prop_shuffle()))
        ) {
            prop_assert_eq!(
                canonical_query_string(shuffled),
                canonical_query_string(params)
            );
        }

        #[test]
        fn it_lists_signed_headers_in_block_order(headers in header_map()) {
            let mut reversed: Vec<(String, String)> = headers.clone().into_iter().collect();
            reversed.reverse();
            let canonical = canonical_headers(reversed);
            let names_from_block: Vec<&str> = canonical
                .block
                .lines()
                .filter_map(|line| line.split(':').next())
                .collect();
            prop_assert_eq!(names_from_block.join(";"), canonical.signed_headers);
        }
    }
}
