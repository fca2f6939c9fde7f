//! Demo 3: Order Lifecycle
//!
//! Showcases: signed requests, private stream topics, order placement and
//! cancellation by client order id
//!
//! Requires BLOCKTRADE_API_KEY and BLOCKTRADE_API_SECRET.
//!
//! Run: cargo run --bin order_lifecycle -- <trading_pair_id> <price> <amount>

use blocktrade_sdk::prelude::*;
use colored::*;
use rust_decimal_macros::dec;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let pair_id: i64 = args.next().map(|a| a.parse()).transpose()?.unwrap_or(1);
    let price: Decimal = args.next().map(|a| a.parse()).transpose()?.unwrap_or(dec!(1000));
    let amount: Decimal = args.next().map(|a| a.parse()).transpose()?.unwrap_or(dec!(0.001));

    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  ORDER LIFECYCLE".cyan().bold());
    println!("{}", "═".repeat(60).cyan());

    let client = BlocktradeClient::builder()
        .with_credentials(Credentials::from_env()?)
        .build()?;

    let user = client.user().await?;
    let portfolio = client
        .portfolios()
        .await?
        .into_iter()
        .next()
        .ok_or("account has no portfolio")?;
    println!(
        "{} logged in as {} (portfolio {})",
        "✓".green(),
        user.email,
        portfolio.id
    );

    let closed = client.connect_stream().await?;
    client
        .subscribe_user_orders(|order| match order {
            Ok(order) => println!(
                "  {} order {} ({})",
                "ORDER".yellow(),
                order.id,
                order.customer_order_id
            ),
            Err(e) => eprintln!("{} {}", "order decode failed:".red(), e),
        })
        .await?;
    client
        .subscribe_user_trades(Some(Duration::from_secs(3600)), |trade| match trade {
            Ok(trade) => println!(
                "  {} {} {} @ {} (fee {})",
                "TRADE".green(),
                trade.direction,
                trade.amount,
                trade.price,
                trade.fee_value
            ),
            Err(e) => eprintln!("{} {}", "trade decode failed:".red(), e),
        })
        .await?;

    let customer_order_id = uuid::Uuid::new_v4().to_string();
    let request = CustomerOrderRequest::limit(
        &customer_order_id,
        portfolio.id,
        pair_id,
        Direction::Buy,
        amount,
        price,
    )
    .with_time_in_force(TimeInForce::Gtc);

    let order = client.create_customer_order(&request).await?;
    info!(order_id = order.id, %customer_order_id, "Order placed");
    println!("{} placed order {}", "✓".green(), order.id);

    tokio::time::sleep(Duration::from_secs(5)).await;

    let current = client.customer_order(&customer_order_id).await?;
    println!("{} order {} still known to the exchange", "✓".green(), current.id);

    match client.cancel_customer_order(&customer_order_id).await {
        Ok(cancelled) => println!("{} cancelled order {}", "✓".green(), cancelled.id),
        Err(e) => println!("{} cancel failed: {}", "✗".red(), e),
    }

    tokio::time::sleep(Duration::from_secs(2)).await;
    client.unsubscribe_user_orders().await?;
    client.unsubscribe_user_trades().await?;
    client.close_stream().await?;

    println!("{} stream ended: {}", "✓".green(), closed.await);
    Ok(())
}
