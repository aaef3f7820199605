//! External process invocation.
//!
//! The `ssh`, `reboot` and `game` commands shell out to vendor binaries.
//! They do so through the [`ProcessRunner`] trait so the argument building
//! and output parsing can be tested without those binaries installed.

pub mod adb;
pub mod cloud;
pub mod ssh;

use crate::errors::ProcessError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A program to run with its arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        command
    }
}

/// Captured output of a successful process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion capturing output. A non-zero exit is an error.
    async fn output(&self, invocation: &Invocation) -> Result<CommandOutput, ProcessError>;

    /// Run attached to the current terminal.
    async fn interactive(&self, invocation: &Invocation) -> Result<(), ProcessError>;
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn output(&self, invocation: &Invocation) -> Result<CommandOutput, ProcessError> {
        debug!("Running {} {:?}", invocation.program, invocation.args);

        let output = invocation
            .command()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ProcessError::Failed {
                program: invocation.program.clone(),
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }

    async fn interactive(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        debug!("Attaching {} {:?}", invocation.program, invocation.args);

        let status = invocation
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ProcessError::Failed {
                program: invocation.program.clone(),
                code: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("adb")
            .arg("-s")
            .arg("emulator-5554")
            .args(["shell", "input"])
            .env("ANDROID_SERIAL", "emulator-5554");

        assert_eq!(invocation.program, "adb");
        assert_eq!(invocation.args, vec!["-s", "emulator-5554", "shell", "input"]);
        assert_eq!(
            invocation.envs,
            vec![("ANDROID_SERIAL".to_string(), "emulator-5554".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let invocation = Invocation::new("lucky-definitely-not-a-real-binary");
        let err = SystemRunner.output(&invocation).await.unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
