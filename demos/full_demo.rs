//! Full client demo - exercises every operation and the cache
//!
//! Run with: cargo run --example full_demo

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use quandl::{
    float_column, time_column, ClientBuilder, FileCache, Format, Options, API_TOKEN_ENV,
    SDK_VERSION,
};
use std::sync::Arc;
use std::time::Duration;

fn header(text: &str) {
    println!();
    println!("{}", format!(" {} ", text).on_blue().bold());
    println!();
}

fn subheader(text: &str) {
    println!("{} {}", "▸".blue().bold(), text.bold().blue());
}

fn info(label: &str, value: &str) {
    println!("  {}: {}", label.dimmed(), value);
}

fn success(text: &str) {
    println!("{} {}", "✔".green(), text);
}

fn warn(text: &str) {
    println!("{} {}", "⚠".yellow(), text);
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<(), quandl::Error> {
    println!();
    println!(
        "{}",
        " Quandl Rust Client - Full Demo ".magenta().bold().reversed()
    );

    // ========== Configuration ==========
    header("Configuration");

    let cache = FileCache::in_temp_dir().with_max_age(Duration::from_secs(60));
    info("Client Version", SDK_VERSION);
    info("Cache Directory", &cache.dir().display().to_string());
    if std::env::var(API_TOKEN_ENV).is_err() {
        warn(&format!("{} is not set, requests are anonymous", API_TOKEN_ENV));
    }

    let client = ClientBuilder::from_env()
        .cache(Arc::new(cache))
        .user_agent_suffix("full-demo")
        .build()?;
    info("Base URL", client.base_url());

    // ========== Single Symbol ==========
    header("Single Symbol");

    let params = Options::from_pairs(&[
        ("trim_start", "2014-01-06"),
        ("trim_end", "2014-01-08"),
        ("column", "4"),
    ]);

    let pb = spinner("Fetching WIKI/AAPL...");
    let aapl = client.get_symbol("WIKI/AAPL", &params).await;
    pb.finish_and_clear();
    match aapl {
        Ok(aapl) => {
            success("WIKI/AAPL retrieved");
            let named = aapl.to_named_columns(None)?;
            if let (Some(dates), Some(closes)) = (named.get("Date"), named.get("Close")) {
                for (date, close) in time_column(dates)?.iter().zip(float_column(closes)?) {
                    info(&date.to_string(), &format!("{:.2}", close));
                }
            }
        }
        Err(e) => warn(&format!("Symbol request failed: {}", e)),
    }

    subheader("Same request again");
    let raw = client
        .get_symbol_raw("WIKI/AAPL", Format::Json, &params)
        .await?;
    info("Served from cache", &raw.from_cache().to_string());

    // ========== Multiple Symbols ==========
    header("Multiple Symbols");

    let params = Options::new()
        .with("sort_order", "asc")
        .with("trim_start", "2014-01-01")
        .with("trim_end", "2014-01-06");
    let pb = spinner("Fetching AAPL and CSCO close prices...");
    let joined = client
        .get_symbols(&["WIKI/AAPL.4", "WIKI/CSCO.4"], &params)
        .await;
    pb.finish_and_clear();
    match joined {
        Ok(joined) => {
            success(&format!("{} rows joined", joined.data.len()));
            info("Columns", &joined.column_names.join(", "));
            for row in &joined.data {
                let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                println!("  {}", cells.join("  ").dimmed());
            }
        }
        Err(e) => warn(&format!("Multiset request failed: {}", e)),
    }

    // ========== List ==========
    header("Source Listing");

    let pb = spinner("Listing WIKI datasets...");
    let list = client.get_list("WIKI", 1, 3).await;
    pb.finish_and_clear();
    match list {
        Ok(list) => {
            success(&format!("{} datasets in WIKI", list.meta.total_count));
            for dataset in &list.datasets {
                info(&dataset.dataset_code, dataset.name.as_deref().unwrap_or("-"));
            }
        }
        Err(e) => warn(&format!("List request failed: {}", e)),
    }

    // ========== Search ==========
    header("Search");

    let pb = spinner("Searching for \"google stock\"...");
    let search = client.get_search("google stock", 1, 3).await;
    pb.finish_and_clear();
    match search {
        Ok(search) => {
            success(&format!("Found {} results", search.datasets.len()));
            for source in &search.sources {
                info(&source.code, source.name.as_deref().unwrap_or("-"));
            }
        }
        Err(e) => warn(&format!("Search request failed: {}", e)),
    }

    subheader("CSV over search");
    let request = quandl::Request::search("google stock", Format::Csv, 1, 3);
    info("Effective URL", &client.url_for(&request));

    println!();
    success("Demo complete");
    Ok(())
}
