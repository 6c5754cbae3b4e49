//! cellwatch — live signal monitor for ZTE cellular routers.
//!
//! - Polls the router's diagnostic fields once per interval
//! - Tracks LTE/NR cells and their signal metrics across cycles
//! - Repaints a terminal report each cycle
//! - Subcommands cover band locks, connect/disconnect, and the
//!   network-preference setting

mod render;

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cellwatch_core::throughput::ThroughputGauge;
use cellwatch_core::SignalInfo;
use cellwatch_router::{parse_bands_arg, RouterClient, RouterError};

/// Live signal monitor and management CLI for ZTE routers.
#[derive(Parser, Debug)]
#[command(name = "cellwatch", about = "Live signal monitor for ZTE cellular routers")]
struct Cli {
    /// Router address.
    #[arg(long = "router-ip", default_value = "192.168.0.10")]
    router_ip: String,

    /// Router admin password.
    #[arg(long, default_value = "admin1")]
    password: String,

    /// Watch-loop polling interval in seconds.
    #[arg(long, default_value_t = 1)]
    interval: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print or change the LTE band lock.
    LteBands {
        /// Bands to lock, "+"-separated ("1+3+28"); omit to print.
        #[arg(long)]
        set: Option<String>,
    },
    /// Print or change the NR band lock.
    NrBands {
        /// Bands to lock, "+"-separated ("41+78"); omit to print.
        #[arg(long)]
        set: Option<String>,
        /// Hop between two band sets ("41/78") to force a reconnect.
        #[arg(long)]
        hop: Option<String>,
    },
    /// Bring the WAN connection up.
    Connect,
    /// Take the WAN connection down.
    Disconnect,
    /// Print or change the network preference.
    NetPref {
        /// Mode such as "4G", "4G+5G", "5G".
        #[arg(long)]
        set: Option<String>,
    },
    /// Fetch an arbitrary API command and dump the raw JSON.
    DebugCmd { cmd: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut client = RouterClient::connect(&cli.router_ip, &cli.password).await?;
    client.ensure_login().await?;

    match cli.command {
        Some(command) => run_command(&client, command).await,
        None => watch(&mut client, Duration::from_secs(cli.interval.max(1))).await,
    }
}

async fn run_command(client: &RouterClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::LteBands { set: None } => {
            println!("LTE band lock: {}", join_bands(&client.lte_band_lock().await?));
        }
        Command::LteBands { set: Some(list) } => {
            client.set_lte_band_lock(Some(&parse_bands(&list)?)).await?;
            println!("LTE band lock updated");
        }
        Command::NrBands { set: None, hop: None } => {
            println!("NR band lock: {}", join_bands(&client.nr_band_lock().await?));
        }
        Command::NrBands { set: Some(list), hop: None } => {
            client.set_nr_band_lock(Some(&parse_bands(&list)?)).await?;
            println!("NR band lock updated");
        }
        Command::NrBands { hop: Some(hop), .. } => {
            let (first, second) = hop
                .split_once('/')
                .ok_or_else(|| anyhow::anyhow!("--hop expects two band sets, e.g. 41/78"))?;
            client.nr_band_hop(&parse_bands(first)?, &parse_bands(second)?).await?;
            println!("NR band hop performed");
        }
        Command::Connect => {
            client.set_connected(true).await?;
            println!("Connect requested");
        }
        Command::Disconnect => {
            client.set_connected(false).await?;
            println!("Disconnect requested");
        }
        Command::NetPref { set: None } => {
            println!("Network preference: {}", client.network_preference().await?);
        }
        Command::NetPref { set: Some(mode) } => {
            match client.set_network_preference(&mode).await {
                Ok(()) => println!("Network preference set to {mode}"),
                Err(RouterError::UnknownMode(mode)) => {
                    eprintln!("Unknown network mode: {mode}\n\nAvailable modes:");
                    for known in RouterClient::known_preferences() {
                        eprintln!("  {known}");
                    }
                    anyhow::bail!("unknown network mode");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::DebugCmd { cmd } => {
            let json = client.debug_cmd(&cmd).await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

/// The watch loop: one fetch → update → repaint per interval, forever.
async fn watch(client: &mut RouterClient, interval: Duration) -> anyhow::Result<()> {
    use std::io::Write;

    let mut signal = SignalInfo::new();
    let mut rx_rate = ThroughputGauge::default();
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        // Only a wrong password is fatal; everything else keeps retrying.
        client.ensure_login().await?;
        client.keepalive().await;

        let info = match client.fetch_device_info().await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(error = %e, "device info fetch failed");
                continue;
            }
        };

        signal.update(&info);
        rx_rate.update_str(&info.realtime_rx_bytes);

        // Clear screen, home cursor, repaint.
        print!("\x1b[2J\x1b[H{}", render::render_signal(&signal, Some(&rx_rate)));
        std::io::stdout().flush().ok();
    }
}

fn parse_bands(input: &str) -> anyhow::Result<Vec<i32>> {
    let bands = parse_bands_arg(input);
    if bands.is_empty() {
        anyhow::bail!("no valid bands in {input:?}");
    }
    Ok(bands)
}

fn join_bands(bands: &[i32]) -> String {
    bands.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(",")
}
