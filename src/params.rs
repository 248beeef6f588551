//! Query parameters sent with every Quandl request.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Name of the query parameter carrying the API token.
pub const AUTH_TOKEN_PARAM: &str = "auth_token";

/// Additional parameters for a Quandl request, such as `trim_start`,
/// `column` or `sort_order`.
///
/// Keys are unique and kept sorted, so two option sets holding the same
/// pairs always encode to the same query string regardless of the order
/// in which they were set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, String>,
}

impl Options {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parameter set from `(key, value)` pairs.
    ///
    /// Later pairs overwrite earlier ones with the same key.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect()
    }

    /// Register a `key=value` pair, replacing any previous value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style variant of [`Options::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Get the value registered for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as a URL query string, keys in sorted order.
    ///
    /// When `token` is given it is sent as `auth_token`, unless the caller
    /// already set that parameter explicitly.
    pub fn encode(&self, token: Option<&str>) -> String {
        let mut pairs: BTreeMap<&str, &str> = self.iter().collect();
        if let Some(token) = token {
            pairs.entry(AUTH_TOKEN_PARAM).or_insert(token);
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Options
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Options::new();
        for (key, value) in iter {
            options.set(key, value);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let mut o = Options::new();
        o.set("column", "4");
        o.set("column", "11");
        assert_eq!(o.len(), 1);
        assert_eq!(o.get("column"), Some("11"));
    }

    #[test]
    fn test_encode_is_sorted_and_order_independent() {
        let mut a = Options::new();
        a.set("trim_start", "2014-01-06")
            .set("trim_end", "2014-01-08")
            .set("column", "4");

        let b = Options::from_pairs(&[
            ("column", "4"),
            ("trim_end", "2014-01-08"),
            ("trim_start", "2014-01-06"),
        ]);

        assert_eq!(a.encode(None), b.encode(None));
        assert_eq!(
            a.encode(None),
            "column=4&trim_end=2014-01-08&trim_start=2014-01-06"
        );
    }

    #[test]
    fn test_encode_escapes_values() {
        let o = Options::new().with("query", "google stock & co");
        assert_eq!(o.encode(None), "query=google+stock+%26+co");
    }

    #[test]
    fn test_encode_injects_token() {
        let o = Options::new().with("page", "1");
        assert_eq!(o.encode(Some("secret")), "auth_token=secret&page=1");
        assert_eq!(Options::new().encode(Some("secret")), "auth_token=secret");
        // the caller's own value is never replaced
        assert!(o.get(AUTH_TOKEN_PARAM).is_none());
    }

    #[test]
    fn test_encode_keeps_caller_token() {
        let o = Options::new().with(AUTH_TOKEN_PARAM, "mine");
        assert_eq!(o.encode(Some("global")), "auth_token=mine");
    }

    #[test]
    fn test_empty_encodes_to_empty_string() {
        assert_eq!(Options::new().encode(None), "");
    }

    #[test]
    fn test_from_pairs_last_wins() {
        let o = Options::from_pairs(&[("a", "1"), ("a", "2")]);
        assert_eq!(o.get("a"), Some("2"));
    }
}
