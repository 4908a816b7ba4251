//! Command-line client for the link ledger.
//!
//! Writes go through the signer gateway (`LINKLEDGER_GATEWAY_ENDPOINT`);
//! resolution and the live feed go through the relay
//! (`LINKLEDGER_RELAY_ENDPOINT`).

use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};

use linkledger::LinkLedger;
use linkledger_resolver::LinkIndex;
use linkledger_transport::{HttpGateway, LiveFeed, RelayClient};
use linkledger_types::is_valid_subject;

#[derive(Debug, Parser)]
#[command(name = "linkledger", about = "Client for a link-posting trust ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register the configured signer as a baseline member
    Join,
    /// Post a link on the ledger and print its minted link id
    Post(PostCmd),
    /// Click the link a subject posted for a URL
    Click(ClickCmd),
    /// Report a subject
    Report(ReportCmd),
    /// Resolve the link id for a (subject, url) pair
    Resolve(ResolveCmd),
    /// Print trust stats for a subject (and optionally one of its links)
    Stats(StatsCmd),
    /// Print the ledger's baseline membership state
    Baseline,
    /// Follow the relay's live event feed
    Watch(WatchCmd),
}

#[derive(Debug, clap::Args)]
struct PostCmd {
    /// URL to post
    url: String,
}

#[derive(Debug, clap::Args)]
struct ClickCmd {
    /// Subject that posted the link
    subject: String,
    /// URL of the link
    url: String,
}

#[derive(Debug, clap::Args)]
struct ReportCmd {
    /// Subject to report
    subject: String,
}

#[derive(Debug, clap::Args)]
struct ResolveCmd {
    /// Subject that posted the link
    subject: String,
    /// URL of the link
    url: String,
}

#[derive(Debug, clap::Args)]
struct StatsCmd {
    /// Subject to inspect
    subject: String,
    /// Also print click stats for this URL of the subject's
    #[arg(long, value_name = "URL")]
    url: Option<String>,
}

#[derive(Debug, clap::Args)]
struct WatchCmd {
    /// How long to follow the feed (seconds)
    #[arg(long, default_value_t = 60, value_name = "SECS")]
    duration: u64,
}

fn connect() -> Result<LinkLedger> {
    let relay = RelayClient::from_env()?;
    let gateway = HttpGateway::from_env()?;
    Ok(LinkLedger::connect(relay, Arc::new(gateway)))
}

fn check_subject(subject: &str) -> Result<()> {
    ensure!(
        is_valid_subject(subject),
        "invalid subject address: {subject}"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Join => {
            let me = connect()?.join().context("join failed")?;
            println!("joined as {me}");
        }
        Command::Post(cmd) => {
            let link_id = connect()?
                .post_link(&cmd.url)
                .context("posting link failed")?;
            println!("{link_id}");
        }
        Command::Click(cmd) => {
            check_subject(&cmd.subject)?;
            let tx_hash = connect()?
                .click(&cmd.subject, &cmd.url)
                .context("click failed")?;
            println!("clicked: {tx_hash}");
        }
        Command::Report(cmd) => {
            check_subject(&cmd.subject)?;
            let tx_hash = connect()?
                .report(&cmd.subject)
                .context("report failed")?;
            println!("reported: {tx_hash}");
        }
        Command::Resolve(cmd) => {
            check_subject(&cmd.subject)?;
            // Resolution needs no signer, so the gateway is never touched.
            let relay = RelayClient::from_env()?;
            let index = LinkIndex::new();
            let link_id =
                linkledger_resolver::resolve_or_refresh(&index, &relay, &cmd.subject, &cmd.url)?;
            println!("{link_id}");
        }
        Command::Stats(cmd) => {
            check_subject(&cmd.subject)?;
            let app = connect()?;
            let stats = app
                .subject_stats(&cmd.subject)
                .context("subject stats query failed")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            if let Some(url) = &cmd.url {
                let link = app
                    .link_stats(&cmd.subject, url)
                    .context("link stats query failed")?;
                println!("{}", serde_json::to_string_pretty(&link)?);
            }
        }
        Command::Baseline => {
            let baseline = connect()?.baseline().context("baseline query failed")?;
            println!("{}", serde_json::to_string_pretty(&baseline)?);
        }
        Command::Watch(cmd) => {
            let relay = RelayClient::from_env()?;
            let index = Arc::new(LinkIndex::new());
            let feed = LiveFeed::spawn(relay.endpoint(), Arc::clone(&index));
            let events = feed.events();

            println!("watching {} for {}s...", relay.endpoint(), cmd.duration);
            let deadline = Instant::now() + Duration::from_secs(cmd.duration);
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match events.recv_timeout(remaining) {
                    Ok(event) => println!("{}", serde_json::to_string(&event)?),
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            feed.close();
            println!("indexed {} mappings", index.len());
        }
    }
    Ok(())
}
