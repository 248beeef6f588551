//! Basic symbol example.
//!
//! This example fetches a few days of Apple closing prices and prints them
//! as columns.
//!
//! Run with: `QUANDL_KEY=your-token cargo run --example basic_symbol`

use quandl::{float_column, time_column, ClientBuilder, Options};

#[tokio::main]
async fn main() -> Result<(), quandl::Error> {
    // Token and base URL come from QUANDL_KEY / QUANDL_BASE_URL
    let client = ClientBuilder::from_env().build()?;

    // Close price only, for the first week of 2014
    let params = Options::new()
        .with("trim_start", "2014-01-01")
        .with("trim_end", "2014-01-06")
        .with("column", "4");

    let data = client.get_symbol("WIKI/AAPL", &params).await?;
    println!(
        "Symbol: {}, Row Count: {}",
        data.dataset.dataset_code,
        data.data.len()
    );

    let columns = data.to_columns()?;
    let dates = time_column(&columns[0])?;
    let closes = float_column(&columns[1])?;
    for (date, close) in dates.iter().zip(&closes) {
        println!("On {} the close price was {}", date, close);
    }

    Ok(())
}
