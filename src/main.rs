// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nowip_dns::{
    config::Settings,
    constants::TOKIO_WORKER_THREADS,
    notify::HickoryNotifier,
    service::{Collaborators, DnsCore},
    stores::{
        JsonFileKeyValueStore, KeyValueStore, MemoryAdditionalRecordStore, MemoryDomainRegistry,
    },
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Operator tool for the NowIP DNS core.
#[derive(Debug, Parser)]
#[command(name = "nowip-dns", version, about)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate settings and custom records, then print a zone summary
    Check,
    /// Print the whole zone as JSON
    Export,
    /// Resolve one question against the static zone
    Resolve {
        /// Name to resolve
        name: String,
        /// Query type (A, AAAA, TXT, ...)
        #[arg(default_value = "A")]
        rtype: String,
    },
    /// Advance the serial and NOTIFY every configured secondary
    Bump,
}

impl Command {
    /// Commands that only inspect the zone and must leave shared state alone.
    fn is_read_only(&self) -> bool {
        !matches!(self, Self::Bump)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("nowip-dns")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_logging() {
    // Respects RUST_LOG, defaults to INFO. RUST_LOG_FORMAT=json switches to JSON lines.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();
    debug!("Logging initialized with file and line number tracking");

    let settings = cli.settings;
    let config = settings
        .zone_config()
        .context("Invalid zone configuration")?;
    let secondaries = settings
        .secondaries()
        .context("Invalid NOWIP_DNS_SLAVE_SERVERS")?;

    info!(
        "Using state file {} for zone {}",
        settings.state_file.display(),
        config.origin
    );

    // Read-only commands work on a copy of the state and notify nobody, so a
    // startup bump they compute never reaches the state file or secondaries.
    let state = JsonFileKeyValueStore::new(&settings.state_file);
    let (state, secondaries) = if cli.command.is_read_only() {
        let copy: Arc<dyn KeyValueStore> = Arc::new(
            state
                .snapshot()
                .await
                .with_context(|| format!("Failed to read {}", settings.state_file.display()))?,
        );
        debug!("Running read-only against a copy of the state file");
        (copy, Vec::new())
    } else {
        let state: Arc<dyn KeyValueStore> = Arc::new(state);
        (state, secondaries)
    };

    // The operator tool has no access to the service database; dynamic
    // answers come from empty registries.
    let collaborators = Collaborators {
        domains: Arc::new(MemoryDomainRegistry::new()),
        additional_records: Arc::new(MemoryAdditionalRecordStore::new()),
        settings: state,
        notifier: Arc::new(HickoryNotifier::default()),
    };

    let core = DnsCore::bootstrap(
        &config,
        secondaries,
        collaborators,
        settings.custom_records_file.as_deref(),
    )
    .await
    .context("Failed to start the DNS core")?;

    match cli.command {
        Command::Check => {
            let snapshot = core.zone().export().await;
            println!("zone:        {}", snapshot.origin);
            println!("serial:      {}", snapshot.serial);
            println!("records:     {}", snapshot.records.len());
            println!("fingerprint: {}", snapshot.fingerprint);
            if let Some(summary) = core.custom_records() {
                println!(
                    "custom:      {} records for {} names",
                    summary.records, summary.names
                );
            }
        }
        Command::Export => {
            let snapshot = core.zone().export().await;
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshot).context("Failed to encode zone")?
            );
        }
        Command::Resolve { name, rtype } => {
            let qtype = hickory_proto::rr::RecordType::from_str(&rtype.to_uppercase())
                .with_context(|| format!("Unknown record type: {rtype}"))?;
            let resolution = core
                .resolve(&name, qtype)
                .await
                .with_context(|| format!("Failed to resolve {name} {rtype}"))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&resolution).context("Failed to encode answer")?
            );
        }
        Command::Bump => {
            let change = core
                .domain_updated()
                .await
                .context("Failed to advance the serial")?;
            println!("serial: {} -> {}", change.previous, change.current);
            if let Some(notify) = change.notify {
                let delivered = notify.await.context("NOTIFY task failed")?;
                println!(
                    "notified: {delivered}/{}",
                    core.coordinator().secondaries().len()
                );
            }
        }
    }

    Ok(())
}
