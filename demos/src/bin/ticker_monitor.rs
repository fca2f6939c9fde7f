//! Demo 1: Live Ticker Monitor
//!
//! Showcases: cached pair lookup, notification stream, heartbeat
//!
//! Run: cargo run --bin ticker_monitor -- BTC EUR

use blocktrade_sdk::prelude::*;
use colored::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let base = args.next().unwrap_or_else(|| "BTC".to_string());
    let quote = args.next().unwrap_or_else(|| "EUR".to_string());

    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  LIVE TICKER MONITOR".cyan().bold());
    println!("{}", "═".repeat(60).cyan());

    let client = BlocktradeClient::builder().build()?;

    let base_asset = client.trading_asset_by_iso_code(&base).await?;
    let quote_asset = client.trading_asset_by_iso_code(&quote).await?;
    let pair = client
        .trading_pair_by_assets(base_asset.id, quote_asset.id)
        .await?;

    println!(
        "{} {}/{} is trading pair {}",
        "✓".green(),
        base_asset.iso_code,
        quote_asset.iso_code,
        pair.id
    );

    let closed = client.connect_stream().await?;
    let heartbeat = client.start_heartbeat(Duration::from_secs(30)).await?;

    client
        .subscribe_ticker(pair.id, |update| match update {
            Ok(update) => {
                let t = &update.data;
                println!(
                    "  {} {:>14}  {} {:>14}  {} {:>14}  {} {}",
                    "BID".yellow(),
                    fmt_price(t.bid_price),
                    "ASK".yellow(),
                    fmt_price(t.ask_price),
                    "LAST".green(),
                    fmt_price(t.last_price),
                    "VOL".dimmed(),
                    fmt_price(t.volume)
                );
            }
            Err(e) => eprintln!("{} {}", "ticker decode failed:".red(), e),
        })
        .await?;

    println!("{} Streaming, press Ctrl+C to stop\n", "✓".green());

    tokio::select! {
        reason = closed => {
            println!("\n{} stream ended: {}", "✗".red(), reason);
        }
        _ = tokio::signal::ctrl_c() => {
            client.unsubscribe_ticker(pair.id).await.ok();
            client.close_stream().await.ok();
            println!("\n{} stopped", "✓".green());
        }
    }

    heartbeat.stop().await;
    Ok(())
}

fn fmt_price(price: Option<Decimal>) -> String {
    price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}
