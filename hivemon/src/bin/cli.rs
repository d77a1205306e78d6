//! Command-line interface for hivemon.
//!
//! This binary provides a CLI for inspecting the fleet via the
//! daemon's HTTP API.

use std::env;

use anyhow::Result;

use hivemon::api_client;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: hivemon-cli <command>");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  status    Show fleet and network status");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  HIVEMON_API_URL    API base URL (default: http://127.0.0.1:7787)");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "status" => cmd_status().await?,
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring HIVEMON_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("HIVEMON_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

/// Print a summary of the fleet, the network, and the odds.
async fn cmd_status() -> Result<()> {
    let client = make_client();

    let devices = client.list_devices().await?;
    if devices.is_empty() {
        println!("Devices: (none)");
    } else {
        println!("Devices:");
        for device in &devices {
            println!(
                "  - {} [{}] {}: {:.1} MH/s, {:.1} W, {:.1}°C",
                device.host,
                device.family,
                device.status,
                device.stats.hashrate_mhs,
                device.stats.power_w,
                device.stats.temperature,
            );
        }
    }

    let network = client.network().await?;
    println!("Network:");
    println!("  Price:      ${:.2}", network.price_usd);
    println!("  Height:     {}", network.block_height);
    println!("  Difficulty: {:.3e}", network.difficulty);
    println!("  Mempool:    {} txs", network.mempool_tx_count);

    match client.odds().await {
        Ok(odds) => {
            println!("Odds:");
            println!("  Time to block: {:.0} s", odds.time_to_block_secs);
            println!("  P(1 day):      {:.3e}", odds.prob_day);
            println!("  {}", odds.lottery.comparison);
        }
        Err(_) => println!("Odds: no network data yet"),
    }

    Ok(())
}
