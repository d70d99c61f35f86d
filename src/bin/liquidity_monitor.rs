//! Net liquidity monitor: Fed assets − TGA − reverse repo, from FRED.

use anyhow::Result;
use macro_intel::liquidity::{fetch_liquidity, render_tail, start_from_env, FredClient};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    macro_intel::settings::init_tracing();

    println!("--- SOVEREIGN LIQUIDITY MONITOR ---");
    println!("Connecting to Federal Reserve Database...");

    let client = FredClient::from_env()?;
    let start = start_from_env();

    let rows = match fetch_liquidity(&client, start).await {
        Ok(rows) => {
            println!("Data retrieved successfully.");
            rows
        }
        Err(e) => {
            // a failed fetch yields an empty frame, not a crash
            println!("Error: {e:#}");
            Vec::new()
        }
    };

    if rows.is_empty() {
        return Ok(());
    }
    print!("{}", render_tail(&rows, 5));
    Ok(())
}
