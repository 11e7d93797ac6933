//! Query component encoding.
//!
//! Titles become the raw query string of `/search?<query>`, so every byte
//! outside the URL unreserved set (`A-Z a-z 0-9 - _ . ~`) is percent-encoded.

use std::borrow::Cow;

/// Percent-encodes a title for use as a URL query component.
///
/// The empty string encodes to itself.
pub fn encode_query(title: &str) -> Cow<'_, str> {
    urlencoding::encode(title)
}

/// Inverse of [`encode_query`].
pub fn decode_query(query: &str) -> anyhow::Result<String> {
    Ok(urlencoding::decode(query)?.into_owned())
}
