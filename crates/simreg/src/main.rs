//! `simreg` - phone-number registration prober.
//!
//! Reads a record file of phone numbers bound to devices, drives the
//! target application's onboarding UI through an Appium server, and
//! appends one classification record per number.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use simreg_appium::{DriverConfig, Session};
use simreg_core::{
    AdbReset, Batch, Config, MailboxStore, ResultSink, WorkItem, is_valid_phone_number,
    parse_records,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Probe phone-number registration status through Android UI automation.
#[derive(Debug, Parser)]
#[command(name = "simreg", version, about)]
struct Cli {
    /// Record file listing the numbers to process.
    #[arg(long, default_value = "results.txt")]
    records: PathBuf,

    /// Automation server host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Automation server port.
    #[arg(long, default_value_t = 4723)]
    port: u16,

    /// Device serial to pin the session to. Defaults to the first
    /// record's device.
    #[arg(long)]
    udid: Option<String>,

    /// JSON configuration file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Probe a single number directly, bypassing the record file.
    #[arg(long, requires = "unit")]
    phone: Option<String>,

    /// Device serial for --phone.
    #[arg(long, requires = "phone")]
    unit: Option<String>,

    /// Package of the application under automation.
    #[arg(long)]
    app_package: Option<String>,

    /// Path to the adb executable.
    #[arg(long)]
    adb_path: Option<String>,

    /// Directory of the code mailbox.
    #[arg(long)]
    mailbox_dir: Option<PathBuf>,

    /// Directory the classification records are appended under.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "simreg=info,simreg_core=info,simreg_appium=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let mailbox = MailboxStore::new(&config.mailbox_dir, config.timing.mailbox_poll);

    let items = match (&cli.phone, &cli.unit) {
        (Some(phone), Some(unit)) => {
            if !is_valid_phone_number(phone) {
                bail!("{phone} is not a usable phone number");
            }
            // Give the operator a record file to drop the code into.
            mailbox.seed(phone).await?;
            info!(phone, unit, "direct mode: probing a single number");
            vec![WorkItem {
                phone_number: phone.clone(),
                unit_id: unit.clone(),
                port: String::new(),
                iccid: String::new(),
            }]
        }
        _ => {
            let text = tokio::fs::read_to_string(&cli.records)
                .await
                .with_context(|| format!("could not read {}", cli.records.display()))?;
            parse_records(&text)?
        }
    };

    if items.is_empty() {
        bail!("no usable records in {}", cli.records.display());
    }
    info!(count = items.len(), "work items loaded");

    let driver = DriverConfig::new(cli.host.clone(), cli.port).app_package(&config.app_package);
    let driver = match cli
        .udid
        .clone()
        .or_else(|| items.first().map(|item| item.unit_id.clone()))
        .filter(|udid| !udid.is_empty())
    {
        Some(udid) => driver.udid(udid),
        None => driver,
    };

    let reset = AdbReset::new(&config.adb_path);
    let sink = ResultSink::new(&config.output_dir);
    let batch = Batch::new(&config, &reset, &mailbox, &sink);

    let summary = batch
        .run(&items, || Session::connect(driver.clone()))
        .await;

    for (outcome, count) in &summary.outcomes {
        info!(%outcome, count, "classified");
    }

    if !summary.connected {
        bail!("no automation session could be established");
    }
    Ok(())
}

/// Loads the configuration file, if any, and applies flag overrides.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("could not parse {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(app_package) = &cli.app_package {
        config.app_package.clone_from(app_package);
    }
    if let Some(adb_path) = &cli.adb_path {
        config.adb_path.clone_from(adb_path);
    }
    if let Some(mailbox_dir) = &cli.mailbox_dir {
        config.mailbox_dir.clone_from(mailbox_dir);
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    Ok(config)
}
