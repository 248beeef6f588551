//! Request building: URL templates, formats and cache keys.

use crate::cache::hash_string;
use crate::params::Options;
use std::fmt;
use tracing::debug;

/// Response format requested from Quandl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// JSON, the only format the client decodes.
    #[default]
    Json,
    /// Comma separated values.
    Csv,
    /// XML.
    Xml,
}

impl Format {
    /// The URL extension for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kinds of request the Quandl API serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A single dataset, e.g. `WIKI/AAPL`.
    Symbol,
    /// Several datasets joined into one table.
    Symbols,
    /// The datasets published by one source.
    List,
    /// Full text search over datasets.
    Search,
}

impl Operation {
    /// Stable name used in cache keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Symbol => "symbol",
            Operation::Symbols => "symbols",
            Operation::List => "list",
            Operation::Search => "search",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully described request: operation, target, format and parameters.
///
/// The URL is only resolved against a base URL and token by the client, so
/// the same `Request` can be reused across clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    operation: Operation,
    format: Format,
    /// Symbol code for `Symbol`, joined column list for `Symbols`.
    target: Option<String>,
    params: Options,
}

impl Request {
    /// Request a single dataset such as `WIKI/AAPL`.
    pub fn symbol(symbol: impl Into<String>, format: Format, params: Options) -> Self {
        Self {
            operation: Operation::Symbol,
            format,
            target: Some(symbol.into()),
            params,
        }
    }

    /// Request several datasets at once, e.g. `["WIKI/AAPL.4", "WIKI/CSCO.4"]`.
    pub fn symbols<S: AsRef<str>>(symbols: &[S], format: Format, params: Options) -> Self {
        Self {
            operation: Operation::Symbols,
            format,
            target: Some(symbols_to_columns(symbols)),
            params,
        }
    }

    /// Request one page of the datasets published by `source`.
    pub fn list(source: &str, format: Format, page: u32, per_page: u32) -> Self {
        let params = Options::new()
            .with("query", "*")
            .with("source_code", source)
            .with("per_page", per_page.to_string())
            .with("page", page.to_string());

        Self {
            operation: Operation::List,
            format,
            target: None,
            params,
        }
    }

    /// Request one page of search results.
    ///
    /// The search endpoint does not serve CSV; such requests are sent as JSON.
    pub fn search(query: &str, format: Format, page: u32, per_page: u32) -> Self {
        let format = if format == Format::Csv {
            debug!(query = query, "search does not support csv, requesting json");
            Format::Json
        } else {
            format
        };

        let params = Options::new()
            .with("query", query)
            .with("per_page", per_page.to_string())
            .with("page", page.to_string());

        Self {
            operation: Operation::Search,
            format,
            target: None,
            params,
        }
    }

    /// The operation kind.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The requested format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// The query parameters, without the token.
    pub fn params(&self) -> &Options {
        &self.params
    }

    /// Resolve the full request URL.
    pub fn url(&self, base_url: &str, token: Option<&str>) -> String {
        let query = self.params.encode(token);
        let format = self.format.as_str();
        let target = self.target.as_deref().unwrap_or_default();

        let url = match self.operation {
            Operation::Symbol => {
                format!("{base_url}/api/v1/datasets/{target}.{format}?{query}")
            }
            Operation::Symbols => {
                format!("{base_url}/api/v1/multisets.{format}?columns={target}&{query}")
            }
            Operation::Search => format!("{base_url}/api/v1/datasets.{format}?{query}"),
            Operation::List => format!("{base_url}/api/v2/datasets.{format}?{query}"),
        };

        url.trim_end_matches(['&', '?']).to_string()
    }

    /// Cache key for this request.
    ///
    /// Derived from the base URL, operation, target, format and the sorted
    /// parameters (token included), so it does not depend on how the query
    /// string is spelled. Clients pointed at different hosts never share
    /// entries.
    pub fn cache_key(&self, base_url: &str, token: Option<&str>) -> String {
        let normalized = format!(
            "{}\n{}\n{}\n{}\n{}",
            base_url.trim_end_matches('/'),
            self.operation,
            self.target.as_deref().unwrap_or_default(),
            self.format,
            self.params.encode(token)
        );
        hash_string(&normalized)
    }
}

/// Convert symbols to the `columns` argument of a multiset request:
/// `WIKI/AAPL.4` becomes `WIKI.AAPL.4`, entries joined with commas.
pub fn symbols_to_columns<S: AsRef<str>>(symbols: &[S]) -> String {
    symbols
        .iter()
        .map(|s| s.as_ref().replace('/', "."))
        .collect::<Vec<_>>()
        .join(",")
}
