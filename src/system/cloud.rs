//! Tencent Cloud Lighthouse instance reboot through the `tccli` CLI.

use super::{Invocation, ProcessRunner};
use crate::config::{CloudConfig, Destination};
use crate::errors::ConfigError;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Credentials passed to `tccli` through its environment.
#[derive(Debug, Clone)]
pub struct CloudCredentials {
    pub secret_id: String,
    pub secret_key: String,
}

impl CloudCredentials {
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let secret_id = config
            .resolve_secret_id()
            .ok_or_else(|| missing("TENCENT_CLOUD_SECRET_ID"))?;
        let secret_key = config
            .resolve_secret_key()
            .ok_or_else(|| missing("TENCENT_CLOUD_SECRET_KEY"))?;

        Ok(Self {
            secret_id,
            secret_key,
        })
    }
}

fn missing(var: &str) -> anyhow::Error {
    anyhow!("{} is not set (config file or environment)", var)
}

#[derive(Debug, Deserialize)]
struct RebootResponse {
    #[serde(rename = "RequestId", default)]
    request_id: Option<String>,
}

/// Build the `RebootInstances` invocation for a destination.
pub fn reboot_invocation(
    tccli: &str,
    name: &str,
    dest: &Destination,
    credentials: &CloudCredentials,
) -> Result<Invocation, ConfigError> {
    for (field, value) in [("region", &dest.region), ("instance_id", &dest.instance_id)] {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingDestinationField {
                name: name.to_string(),
                field,
            });
        }
    }

    let instance_ids = serde_json::json!([dest.instance_id.trim()]).to_string();

    Ok(Invocation::new(tccli)
        .args(["lighthouse", "RebootInstances", "--region"])
        .arg(dest.region.trim())
        .arg("--InstanceIds")
        .arg(instance_ids)
        .env("TENCENTCLOUD_SECRET_ID", &credentials.secret_id)
        .env("TENCENTCLOUD_SECRET_KEY", &credentials.secret_key))
}

/// Reboot the destination's instance and return the raw API response.
pub async fn reboot(
    runner: &dyn ProcessRunner,
    tccli: &str,
    name: &str,
    dest: &Destination,
    credentials: &CloudCredentials,
) -> Result<String> {
    let invocation = reboot_invocation(tccli, name, dest, credentials)?;
    info!("Rebooting {} ({} in {})", name, dest.instance_id, dest.region);

    let output = runner
        .output(&invocation)
        .await
        .map_err(|e| anyhow!("Failed to reboot {}: {}", name, e))?;

    let response = output.stdout.trim().to_string();
    match serde_json::from_str::<RebootResponse>(&response) {
        Ok(RebootResponse {
            request_id: Some(id),
        }) => info!("Reboot accepted, request id {}", id),
        _ => debug!("Reboot response had no request id"),
    }

    Ok(response)
}
