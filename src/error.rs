//! Error types for the Quandl client.

use crate::params::AUTH_TOKEN_PARAM;
use crate::request::Format;
use thiserror::Error;

const REDACTED: &str = "***REDACTED***";

/// Result type for Quandl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Quandl client.
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,

    /// The cache collaborator failed to store or read an entry.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The response body could not be decoded into the requested type.
    ///
    /// The literal server response is kept so that provider-side errors
    /// (which are not JSON-schema conformant) can be inspected.
    #[error("JSON decode error for {url}\nRESPONSE:\n{body}\n\nERROR:\n{source}")]
    Decode {
        /// URL the payload was fetched from
        url: String,
        /// Raw response body
        body: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Decoding was requested for a payload that is not JSON.
    #[error("Cannot decode a {0} payload, only json responses are decoded")]
    UnsupportedFormat(Format),

    /// A data matrix or key list does not have the expected dimensions.
    #[error("Shape error: {0}")]
    Shape(String),

    /// A cell did not hold the variant a typed column conversion asked for.
    #[error("Type mismatch at row {index}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Row index of the offending cell
        index: usize,
        /// Requested cell type
        expected: &'static str,
        /// Actual cell type
        found: &'static str,
    },

    /// A text cell could not be parsed as a `YYYY-MM-DD` date.
    #[error("Invalid date {value:?} at row {index}: {source}")]
    InvalidDate {
        /// Row index of the offending cell
        index: usize,
        /// The unparsable text
        value: String,
        /// Underlying parse error
        #[source]
        source: chrono::ParseError,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a JSON failure together with the payload that caused it.
    ///
    /// The API token is masked in the stored URL.
    pub(crate) fn decode(url: &str, body: &[u8], source: serde_json::Error) -> Self {
        Error::Decode {
            url: redact_url(url),
            body: String::from_utf8_lossy(body).into_owned(),
            source,
        }
    }
}

/// Mask every `auth_token` query value in `raw`.
///
/// Unparsable input is reduced to its path, so a token can never leak
/// through a malformed URL.
pub(crate) fn redact_url(raw: &str) -> String {
    let mut url = match url::Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return raw.split('?').next().unwrap_or_default().to_string(),
    };
    if !url.query_pairs().any(|(k, _)| k == AUTH_TOKEN_PARAM) {
        return raw.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == AUTH_TOKEN_PARAM {
                REDACTED.to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_embeds_body() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = Error::decode("https://example.test/x.json", b"{oops", source);

        let message = err.to_string();
        assert!(message.contains("RESPONSE:\n{oops"));
        assert!(message.contains("https://example.test/x.json"));
        match err {
            Error::Decode { body, .. } => assert_eq!(body, "{oops"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_masks_token() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = Error::decode(
            "https://example.test/api/v1/datasets/WIKI/AAPL.json?column=4&auth_token=s3cr3t",
            b"{oops",
            source,
        );

        let message = err.to_string();
        assert!(!message.contains("s3cr3t"));
        assert!(message.contains("auth_token=***REDACTED***"));
        assert!(message.contains("column=4"));
    }

    #[test]
    fn test_redact_url_without_token_is_unchanged() {
        let url = "https://example.test/api/v1/datasets.json?query=*&page=1";
        assert_eq!(redact_url(url), url);
    }

    #[test]
    fn test_redact_url_unparsable_drops_query() {
        assert_eq!(redact_url("not a url?auth_token=s3cr3t"), "not a url");
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::TypeMismatch {
            index: 2,
            expected: "number",
            found: "text",
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch at row 2: expected number, found text"
        );
    }
}
