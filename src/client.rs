//! Main Quandl client implementation.

use crate::cache::Cache;
use crate::error::{redact_url, Error, Result};
use crate::params::Options;
use crate::request::{Format, Request};
use crate::types::*;
use crate::version::build_user_agent;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://www.quandl.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API token.
pub const API_TOKEN_ENV: &str = "QUANDL_KEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "QUANDL_BASE_URL";

/// Builder for constructing a [`Client`].
pub struct ClientBuilder {
    api_token: Option<String>,
    base_url: String,
    timeout: Duration,
    cache: Option<Arc<dyn Cache>>,
    user_agent_suffix: Option<String>,
}

impl ClientBuilder {
    /// Create a new client builder without a token or cache.
    pub fn new() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache: None,
            user_agent_suffix: None,
        }
    }

    /// Create a builder configured from `QUANDL_KEY` and `QUANDL_BASE_URL`.
    ///
    /// Unset or empty variables leave the defaults in place.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Some(token) = std::env::var(API_TOKEN_ENV).ok().filter(|v| !v.is_empty()) {
            builder = builder.api_token(token);
        }
        if let Some(url) = std::env::var(BASE_URL_ENV).ok().filter(|v| !v.is_empty()) {
            builder = builder.base_url(url);
        }
        builder
    }

    /// Set the API token sent as `auth_token` with every request.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Serve and store responses through `cache`.
    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set a custom User-Agent suffix.
    pub fn user_agent_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.user_agent_suffix = Some(suffix.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base URL is required".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", self.base_url, e)))?;

        // Warn about insecure connections, the token travels in the query string
        if self.api_token.is_some() && !self.base_url.starts_with("https://") {
            warn!(
                base_url = %self.base_url,
                "API base URL is not using HTTPS. This is insecure."
            );
        }

        let user_agent = build_user_agent(self.user_agent_suffix.as_deref());
        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(user_agent)
            .build()
            .map_err(Error::Http)?;

        Ok(Client {
            api_token: self.api_token,
            base_url: self.base_url,
            http_client,
            cache: self.cache,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The Quandl API client.
///
/// Configuration is fixed at build time, so a client can be shared between
/// tasks without one request's settings leaking into another's.
///
/// # Example
///
/// ```rust,no_run
/// use quandl::{Client, Options};
///
/// #[tokio::main]
/// async fn main() -> Result<(), quandl::Error> {
///     let client = Client::builder().api_token("your-token").build()?;
///
///     let params = Options::new()
///         .with("trim_start", "2014-01-06")
///         .with("trim_end", "2014-01-08")
///         .with("column", "4");
///     let aapl = client.get_symbol("WIKI/AAPL", &params).await?;
///
///     for row in &aapl.data {
///         println!("{} {}", row[0], row[1]);
///     }
///     Ok(())
/// }
/// ```
pub struct Client {
    api_token: Option<String>,
    base_url: String,
    http_client: reqwest::Client,
    cache: Option<Arc<dyn Cache>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_token", &self.api_token.as_ref().map(|_| "***REDACTED***"))
            .field("base_url", &self.base_url)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The URL this client fetches for `request`, token included.
    pub fn url_for(&self, request: &Request) -> String {
        request.url(&self.base_url, self.api_token.as_deref())
    }

    // === Typed ===

    /// Get the data of a single symbol, e.g. `WIKI/AAPL`.
    pub async fn get_symbol(&self, symbol: &str, params: &Options) -> Result<SymbolResponse> {
        let raw = self.get_symbol_raw(symbol, Format::Json, params).await?;
        let response: SymbolResponse = raw.decode()?;
        check_row_widths(response.column_names(), &response.data)?;
        Ok(response)
    }

    /// Get the joined data of several symbols, e.g. `["WIKI/AAPL.4", "WIKI/CSCO.4"]`.
    pub async fn get_symbols<S: AsRef<str>>(
        &self,
        symbols: &[S],
        params: &Options,
    ) -> Result<SymbolsResponse> {
        let raw = self.get_symbols_raw(symbols, Format::Json, params).await?;
        let response: SymbolsResponse = raw.decode()?;
        check_row_widths(&response.column_names, &response.data)?;
        Ok(response)
    }

    /// List the datasets published by `source`.
    pub async fn get_list(&self, source: &str, page: u32, per_page: u32) -> Result<ListResponse> {
        self.get_list_raw(source, Format::Json, page, per_page)
            .await?
            .decode()
    }

    /// Search for datasets.
    pub async fn get_search(&self, query: &str, page: u32, per_page: u32) -> Result<SearchResponse> {
        self.get_search_raw(query, Format::Json, page, per_page)
            .await?
            .decode()
    }

    // === Raw ===

    /// Get a single symbol in the given format, undecoded.
    pub async fn get_symbol_raw(
        &self,
        symbol: &str,
        format: Format,
        params: &Options,
    ) -> Result<RawResponse> {
        self.fetch(&Request::symbol(symbol, format, params.clone()))
            .await
    }

    /// Get several symbols in the given format, undecoded.
    pub async fn get_symbols_raw<S: AsRef<str>>(
        &self,
        symbols: &[S],
        format: Format,
        params: &Options,
    ) -> Result<RawResponse> {
        self.fetch(&Request::symbols(symbols, format, params.clone()))
            .await
    }

    /// List the datasets of `source` in the given format, undecoded.
    pub async fn get_list_raw(
        &self,
        source: &str,
        format: Format,
        page: u32,
        per_page: u32,
    ) -> Result<RawResponse> {
        self.fetch(&Request::list(source, format, page, per_page))
            .await
    }

    /// Search in the given format, undecoded. CSV is served as JSON.
    pub async fn get_search_raw(
        &self,
        query: &str,
        format: Format,
        page: u32,
        per_page: u32,
    ) -> Result<RawResponse> {
        self.fetch(&Request::search(query, format, page, per_page))
            .await
    }

    /// Resolve `request` to its raw payload, from the cache when possible.
    ///
    /// A network response with a success status is written to the cache
    /// before it is returned; if that write fails, the fetch fails.
    pub async fn fetch(&self, request: &Request) -> Result<RawResponse> {
        let token = self.api_token.as_deref();
        let url = request.url(&self.base_url, token);
        let format = request.format();
        let key = request.cache_key(&self.base_url, token);
        let log_url = redact_url(&url);

        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(&key) {
                debug!(operation = %request.operation(), url = %log_url, bytes = body.len(), "Cache hit");
                return Ok(RawResponse {
                    url,
                    format,
                    status: None,
                    body,
                });
            }
            debug!(operation = %request.operation(), url = %log_url, "Cache miss");
        }

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?.to_vec();
        debug!(url = %log_url, status = %status, bytes = body.len(), "Fetched");

        if !status.is_success() {
            warn!(url = %log_url, status = %status, "Quandl returned an error status, response not cached");
        } else if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &body) {
                warn!(url = %log_url, error = %e, "Failed to cache response");
                return Err(e);
            }
        }

        Ok(RawResponse {
            url,
            format,
            status: Some(status.as_u16()),
            body,
        })
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout
    } else {
        Error::Http(e)
    }
}
