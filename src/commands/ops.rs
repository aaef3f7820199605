//! Server and device commands: `ssh`, `reboot`, `game`, `dest` and
//! `init-config`.

use super::Output;
use crate::config::{Config, Destination, GameConfig};
use crate::errors::ProcessError;
use crate::system::adb::{choose_device, Adb, DeviceChoice};
use crate::system::cloud::{self, CloudCredentials};
use crate::system::{ssh, ProcessRunner};
use anyhow::{bail, Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::info;

/// `lucky ssh <DEST>`
pub async fn ssh(runner: &dyn ProcessRunner, config: &Config, name: &str) -> Result<()> {
    let dest = config.destination(name)?;
    ssh::connect(runner, &config.ssh.program, name, dest).await
}

/// `lucky reboot <DEST>`
pub async fn reboot(runner: &dyn ProcessRunner, config: &Config, name: &str) -> Result<String> {
    let dest = config.destination(name)?;
    let credentials = CloudCredentials::from_config(&config.cloud)?;

    let response = cloud::reboot(runner, &config.cloud.tccli_path, name, dest, &credentials).await?;

    let mut text = String::new();
    if !response.is_empty() {
        text.push_str(&response);
        text.push('\n');
    }
    text.push_str(&format!("✅ Reboot requested for {}\n", name));
    Ok(text)
}

/// Interactive device picker used when several devices are attached.
pub fn prompt_device(devices: &[String]) -> Result<usize, ProcessError> {
    Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a device")
        .items(devices)
        .default(0)
        .interact()
        .map_err(|e| ProcessError::InvalidSelection(e.to_string()))
}

/// `lucky game`: tap until `count` taps were sent or `shutdown` resolves.
///
/// Returns the number of taps sent.
pub async fn game<S>(
    runner: &dyn ProcessRunner,
    config: &GameConfig,
    device: Option<&str>,
    count: Option<u64>,
    prompt: &dyn Fn(&[String]) -> Result<usize, ProcessError>,
    shutdown: S,
) -> Result<u64>
where
    S: Future<Output = ()>,
{
    let adb = Adb::new(runner, config.adb_path.clone());

    let devices = adb.devices().await?;
    let choice = match device {
        Some(serial) => DeviceChoice::Named(serial),
        None => DeviceChoice::Prompt(prompt),
    };
    let device = choose_device(&devices, choice)?;

    let interval = Duration::from_secs(config.interval_seconds);
    info!(
        "Tapping ({}, {}) on {} every {}s, Ctrl-C to stop",
        config.tap_x, config.tap_y, device, config.interval_seconds
    );

    tokio::pin!(shutdown);
    let mut taps = 0u64;

    loop {
        adb.tap(&device, config.tap_x, config.tap_y).await?;
        taps += 1;
        info!("Tap {} sent", taps);

        if count.is_some_and(|limit| taps >= limit) {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut shutdown => {
                info!("Interrupted, stopping");
                break;
            }
        }
    }

    Ok(taps)
}

#[derive(Tabled, Serialize)]
struct DestinationRow<'a> {
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "SSH")]
    ssh: &'a str,
    #[tabled(rename = "Region")]
    region: &'a str,
    #[tabled(rename = "Instance")]
    instance_id: &'a str,
}

/// `lucky dest list`
pub fn dest_list(config: &Config, output: &Output) -> Result<String> {
    let rows: Vec<DestinationRow<'_>> = config
        .dest
        .iter()
        .map(|(name, dest)| DestinationRow {
            name,
            ssh: &dest.ssh,
            region: &dest.region,
            instance_id: &dest.instance_id,
        })
        .collect();

    if output.is_json() {
        return crate::report::generate_json_report(&rows);
    }

    if rows.is_empty() {
        return Ok("No destinations configured. Add one with `lucky dest add`.\n".to_string());
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    Ok(format!("{}\n", table))
}

/// `lucky dest add`: insert or replace a destination and save the file.
pub fn dest_add(config: &mut Config, path: &Path, name: &str, dest: Destination) -> Result<String> {
    let replaced = config.dest.insert(name.to_string(), dest).is_some();
    config.save(path)?;

    let verb = if replaced { "Updated" } else { "Added" };
    info!("{} destination {} in {}", verb, name, path.display());
    Ok(format!("✅ {} destination {}\n", verb, name))
}

/// `lucky init-config`: write the default config, refusing to overwrite.
pub fn init_config(path: &Path) -> Result<String> {
    if path.exists() {
        bail!(
            "{} already exists. Remove it first or edit it manually.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(format!(
        "✅ Created {} with default settings.\n   \
         Add credentials and destinations to get started.\n",
        path.display()
    ))
}
