//! Android device taps over ADB.

use super::{Invocation, ProcessRunner};
use crate::errors::ProcessError;
use tracing::info;

/// ADB wrapper bound to one adb binary.
pub struct Adb<'a> {
    runner: &'a dyn ProcessRunner,
    program: String,
}

impl<'a> Adb<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Serial numbers of attached devices in the `device` state.
    pub async fn devices(&self) -> Result<Vec<String>, ProcessError> {
        let invocation = Invocation::new(&self.program).arg("devices");
        let output = self.runner.output(&invocation).await?;
        Ok(parse_devices(&output.stdout))
    }

    /// Tap the screen of `device` at (x, y).
    pub async fn tap(&self, device: &str, x: u32, y: u32) -> Result<(), ProcessError> {
        let invocation = Invocation::new(&self.program)
            .args(["-s", device, "shell", "input", "tap"])
            .arg(x.to_string())
            .arg(y.to_string());

        let output = self.runner.output(&invocation).await?;

        let echoed = format!("{}{}", output.stdout, output.stderr);
        if !echoed.trim().is_empty() {
            info!("adb returned: {}", echoed.trim());
        }

        Ok(())
    }
}

/// Parse `adb devices` output.
///
/// Skips the header and blank lines; keeps serials whose state is `device`
/// (so `offline` and `unauthorized` entries are ignored).
pub fn parse_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of devices"))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(serial), Some("device")) => Some(serial.to_string()),
                _ => None,
            }
        })
        .collect()
}

/// How to pick a device when several are attached.
pub enum DeviceChoice<'a> {
    /// Use this serial, which must be attached.
    Named(&'a str),
    /// Ask the user with the given picker, which returns an index.
    Prompt(&'a dyn Fn(&[String]) -> Result<usize, ProcessError>),
}

/// Pick a device from the attached list.
pub fn choose_device(devices: &[String], choice: DeviceChoice<'_>) -> Result<String, ProcessError> {
    if devices.is_empty() {
        return Err(ProcessError::NoDevices);
    }

    match choice {
        DeviceChoice::Named(serial) => devices
            .iter()
            .find(|device| device.as_str() == serial)
            .cloned()
            .ok_or_else(|| ProcessError::UnknownDevice(serial.to_string())),
        DeviceChoice::Prompt(_) if devices.len() == 1 => Ok(devices[0].clone()),
        DeviceChoice::Prompt(pick) => {
            let index = pick(devices)?;
            devices
                .get(index)
                .cloned()
                .ok_or_else(|| ProcessError::InvalidSelection(index.to_string()))
        }
    }
}
