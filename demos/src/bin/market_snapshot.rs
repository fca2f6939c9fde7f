//! Demo 2: Market Snapshot
//!
//! Showcases: public REST endpoints, reference data cache
//!
//! Run: cargo run --bin market_snapshot

use blocktrade_sdk::prelude::*;
use colored::*;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("{}", "═".repeat(72).cyan());
    println!("{}", "  MARKET SNAPSHOT".cyan().bold());
    println!("{}", "═".repeat(72).cyan());

    let client = BlocktradeClient::builder().build()?;

    let assets: HashMap<i64, String> = client
        .trading_assets()
        .await?
        .into_iter()
        .map(|a| (a.id, a.iso_code))
        .collect();
    let pairs = client.trading_pairs().await?;

    println!(
        "{} {} assets, {} trading pairs\n",
        "✓".green(),
        assets.len(),
        pairs.len()
    );
    println!(
        "  {:<12} {:>14} {:>14} {:>14} {:>12}",
        "PAIR".bold(),
        "BEST BID".bold(),
        "BEST ASK".bold(),
        "SPREAD".bold(),
        "LEVELS".bold()
    );

    for pair in &pairs {
        let name = format!(
            "{}/{}",
            assets.get(&pair.base_asset_id).map(String::as_str).unwrap_or("?"),
            assets.get(&pair.quote_asset_id).map(String::as_str).unwrap_or("?")
        );

        let book = match client.order_book(pair.id).await {
            Ok(book) => book,
            Err(e) if e.is_rate_limited() => {
                println!("  {} rate limited, stopping", "!".yellow());
                break;
            }
            Err(e) => {
                println!("  {:<12} {}", name, e.to_string().red());
                continue;
            }
        };

        println!(
            "  {:<12} {:>14} {:>14} {:>14} {:>12}",
            name,
            book.best_bid().map(|l| l.price.to_string()).unwrap_or_else(|| "-".into()),
            book.best_ask().map(|l| l.price.to_string()).unwrap_or_else(|| "-".into()),
            book.spread().map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
            book.bids.len() + book.asks.len()
        );
    }

    // Cached lookups: first call fetches the list, later calls hit the cache
    if let Some(first) = pairs.first() {
        let pair = client.trading_pair(first.id).await?;
        let base = client.trading_asset(pair.base_asset_id).await?;
        println!(
            "\n{} cached {} pair(s), {} asset(s); first pair base is {} ({})",
            "✓".green(),
            client.rest().cached_pair_count(),
            client.rest().cached_asset_count(),
            base.full_name,
            base.iso_code
        );
    }

    Ok(())
}
