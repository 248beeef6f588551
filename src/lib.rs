//! Rust client for the Quandl API.
//!
//! Fetches datasets, multi-dataset joins, source listings and search results,
//! optionally through a pluggable cache, and reshapes the row-oriented data
//! into columns for analysis.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quandl::{float_column, time_column, Client, FileCache, Options};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), quandl::Error> {
//!     let client = Client::builder()
//!         .api_token("your-token")
//!         .cache(Arc::new(FileCache::in_temp_dir()))
//!         .build()?;
//!
//!     let params = Options::from_pairs(&[
//!         ("trim_start", "2014-01-01"),
//!         ("trim_end", "2014-01-06"),
//!         ("column", "4"),
//!     ]);
//!     let aapl = client.get_symbol("WIKI/AAPL", &params).await?;
//!
//!     let columns = aapl.to_columns()?;
//!     let dates = time_column(&columns[0])?;
//!     let closes = float_column(&columns[1])?;
//!     println!("{:?} {:?}", dates, closes);
//!     Ok(())
//! }
//! ```
//!
//! CSV and XML are available through the `*_raw` methods, which return the
//! payload as received:
//!
//! ```rust,no_run
//! # async fn run(client: quandl::Client) -> Result<(), quandl::Error> {
//! use quandl::{Format, Options};
//!
//! let raw = client.get_symbol_raw("WIKI/AAPL", Format::Csv, &Options::new()).await?;
//! println!("{}", raw.text());
//! # Ok(())
//! # }
//! ```

mod cache;
mod client;
mod columns;
mod error;
mod params;
mod request;
mod types;
mod version;

pub use cache::{Cache, FileCache, MemoryCache};
pub use client::{Client, ClientBuilder, API_TOKEN_ENV, BASE_URL_ENV};
pub use columns::{
    float_column, string_column, time_column, to_columns, to_named_columns, DATE_FORMAT,
};
pub use error::{Error, Result};
pub use params::{Options, AUTH_TOKEN_PARAM};
pub use request::{symbols_to_columns, Format, Operation, Request};
pub use types::*;
pub use version::{build_user_agent, SDK_VERSION};
