//! Response types for the Quandl API.

use crate::error::{Error, Result};
use crate::request::Format;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of a data matrix.
///
/// Quandl does not fix a type per column, so every cell is tagged when the
/// response is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A numeric value.
    Number(f64),
    /// A text value, e.g. a `YYYY-MM-DD` date.
    Text(String),
    /// A missing value.
    Null,
}

impl CellValue {
    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
            CellValue::Null => "null",
        }
    }

    /// The numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The text value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the cell is null.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// A row-major data matrix.
pub type Rows = Vec<Vec<CellValue>>;

/// Dataset metadata, returned for symbol requests, listings and searches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Dataset ID.
    pub id: i64,
    /// Dataset code, e.g. `AAPL`.
    pub dataset_code: String,
    /// Database code, e.g. `WIKI`.
    pub database_code: String,
    /// Display name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// When the dataset was last refreshed.
    pub refreshed_at: Option<String>,
    /// Newest date with data.
    pub newest_available_date: Option<String>,
    /// Oldest date with data.
    pub oldest_available_date: Option<String>,
    /// Column headers, first one is usually `Date`.
    pub column_names: Vec<String>,
    /// Data frequency, e.g. `daily`.
    pub frequency: Option<String>,
    /// Dataset type.
    #[serde(rename = "type")]
    pub dataset_type: Option<String>,
    /// Whether the dataset requires a subscription.
    pub premium: bool,
    /// Row limit applied to the request.
    pub limit: Option<u64>,
    /// Transformation applied to the request.
    pub transform: Option<String>,
    /// Single column selected by the request.
    pub column_index: Option<u32>,
    /// First date returned.
    pub start_date: Option<String>,
    /// Last date returned.
    pub end_date: Option<String>,
    /// Frequency collapse applied to the request.
    pub collapse: Option<String>,
    /// Row order, `asc` or `desc`.
    pub order: Option<String>,
    /// Database ID.
    pub database_id: Option<u64>,
}

/// Response for a single symbol request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolResponse {
    /// Dataset metadata.
    #[serde(flatten)]
    pub dataset: Dataset,
    /// Row-major data, one row per date.
    pub data: Rows,
}

impl SymbolResponse {
    /// Column headers of [`SymbolResponse::data`].
    pub fn column_names(&self) -> &[String] {
        &self.dataset.column_names
    }
}

/// Response for a multiple symbols request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolsResponse {
    /// Column headers of [`SymbolsResponse::data`].
    pub column_names: Vec<String>,
    /// The requested columns, as echoed by the API.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Row-major joined data.
    pub data: Rows,
}

/// Pagination metadata of list and search responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMeta {
    /// Results per page.
    pub per_page: u32,
    /// The query that was run.
    pub query: Option<String>,
    /// Current page, 1-based.
    pub current_page: u32,
    /// Previous page, if any.
    pub prev_page: Option<u32>,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of results.
    pub total_count: u64,
    /// Next page, if any.
    pub next_page: Option<u32>,
    /// Index of the first item on this page.
    pub current_first_item: Option<u64>,
    /// Index of the last item on this page.
    pub current_last_item: Option<u64>,
}

/// Response for a list request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResponse {
    /// Datasets on this page.
    #[serde(alias = "docs")]
    pub datasets: Vec<Dataset>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: ResponseMeta,
}

/// A data source (publisher), returned by search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    /// Source ID.
    pub id: i64,
    /// Source code, e.g. `WIKI`.
    pub code: String,
    /// Number of datasets published.
    pub datasets_count: u64,
    /// Description.
    pub description: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Publisher host.
    pub host: Option<String>,
    /// Whether the source requires a subscription.
    pub premium: bool,
}

/// Response for a search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching datasets.
    #[serde(alias = "docs")]
    pub datasets: Vec<Dataset>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: ResponseMeta,
    /// Sources the matching datasets belong to.
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl From<SearchResponse> for ListResponse {
    fn from(search: SearchResponse) -> Self {
        ListResponse {
            datasets: search.datasets,
            meta: search.meta,
        }
    }
}

/// Raw payload of a request, before decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The resolved request URL.
    pub url: String,
    /// Requested format.
    pub format: Format,
    /// HTTP status, `None` when served from the cache.
    pub status: Option<u16>,
    /// Response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the payload came from the cache instead of the network.
    pub fn from_cache(&self) -> bool {
        self.status.is_none()
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode a JSON body into `T`.
    ///
    /// Parse failures carry the literal body, which is where provider error
    /// messages end up.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        if self.format != Format::Json {
            return Err(Error::UnsupportedFormat(self.format));
        }
        serde_json::from_slice(&self.body).map_err(|e| Error::decode(&self.url, &self.body, e))
    }
}

/// Check that every row has one cell per column name.
pub(crate) fn check_row_widths(column_names: &[String], rows: &Rows) -> Result<()> {
    match rows
        .iter()
        .position(|row| row.len() != column_names.len())
    {
        Some(i) => Err(Error::Shape(format!(
            "row {} has {} cells but there are {} column names",
            i,
            rows[i].len(),
            column_names.len()
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(body: &str, format: Format) -> RawResponse {
        RawResponse {
            url: "https://www.quandl.com/api/v1/datasets/WIKI/AAPL.json".into(),
            format,
            status: Some(200),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_cell_values_are_tagged() {
        let row: Vec<CellValue> = serde_json::from_value(json!(["2014-01-08", 543.46, null])).unwrap();
        assert_eq!(
            row,
            vec![
                CellValue::Text("2014-01-08".into()),
                CellValue::Number(543.46),
                CellValue::Null
            ]
        );
        assert_eq!(row[1].as_f64(), Some(543.46));
        assert_eq!(row[0].as_str(), Some("2014-01-08"));
        assert!(row[2].is_null());
        assert_eq!(row[0].to_string(), "2014-01-08");
        assert_eq!(row[1].to_string(), "543.46");
    }

    #[test]
    fn test_decode_symbol_response() {
        let body = json!({
            "id": 9775409,
            "dataset_code": "AAPL",
            "database_code": "WIKI",
            "name": "Apple Inc (AAPL) Prices, Dividends, Splits and Trading Volume",
            "description": null,
            "column_names": ["Date", "Close"],
            "frequency": "daily",
            "type": "Time Series",
            "premium": false,
            "limit": null,
            "column_index": 4,
            "start_date": "2014-01-06",
            "end_date": "2014-01-08",
            "order": "desc",
            "database_id": 4922,
            "data": [["2014-01-08", 543.46], ["2014-01-07", 540.0375]]
        })
        .to_string();

        let response: SymbolResponse = raw(&body, Format::Json).decode().unwrap();
        assert_eq!(response.dataset.dataset_code, "AAPL");
        assert_eq!(response.dataset.dataset_type.as_deref(), Some("Time Series"));
        assert_eq!(response.dataset.column_index, Some(4));
        assert_eq!(response.column_names(), ["Date", "Close"]);
        assert_eq!(response.data.len(), 2);
        assert!(check_row_widths(response.column_names(), &response.data).is_ok());
    }

    #[test]
    fn test_decode_search_response() {
        let body = json!({
            "docs": [{"id": 1, "dataset_code": "TO_BE", "database_code": "TWITTER",
                      "column_names": ["date", "Followers"]}],
            "meta": {"per_page": 5, "current_page": 2, "prev_page": 1, "total_count": 1500,
                     "total_pages": 300, "next_page": 3},
            "sources": [{"id": 12832, "code": "TWITTER", "datasets_count": 98506,
                         "name": "Twitter Inc.", "host": "twitter.com", "premium": false}]
        })
        .to_string();

        let response: SearchResponse = raw(&body, Format::Json).decode().unwrap();
        assert_eq!(response.datasets[0].dataset_code, "TO_BE");
        assert_eq!(response.meta.current_page, 2);
        assert_eq!(response.meta.total_count, 1500);
        assert_eq!(response.sources[0].code, "TWITTER");
        assert_eq!(response.sources[0].datasets_count, 98506);
    }

    #[test]
    fn test_decode_error_keeps_body() {
        let body = r#"{"error":"Requested entity does not exist."}"#;
        let err = raw(body, Format::Json)
            .decode::<Vec<Dataset>>()
            .unwrap_err();
        match err {
            Error::Decode { body: kept, url, .. } => {
                assert_eq!(kept, body);
                assert!(url.ends_with("AAPL.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_csv() {
        let err = raw("Date,Close\n", Format::Csv)
            .decode::<SymbolResponse>()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(Format::Csv)));
    }

    #[test]
    fn test_check_row_widths() {
        let names = vec!["Date".to_string(), "Close".to_string()];
        let rows: Rows = vec![vec!["2014-01-08".into(), 1.0.into()], vec!["2014-01-07".into()]];
        let err = check_row_widths(&names, &rows).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }
}
