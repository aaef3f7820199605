//! Interactive SSH sessions to configured destinations.

use super::{Invocation, ProcessRunner};
use crate::config::Destination;
use crate::errors::{ConfigError, ProcessError};
use anyhow::Result;
use tracing::info;

/// Build the ssh invocation for a destination.
pub fn ssh_invocation(
    program: &str,
    name: &str,
    dest: &Destination,
) -> Result<Invocation, ConfigError> {
    if dest.ssh.trim().is_empty() {
        return Err(ConfigError::MissingDestinationField {
            name: name.to_string(),
            field: "ssh",
        });
    }

    Ok(Invocation::new(program).arg(dest.ssh.trim()))
}

/// Open an interactive session; returns when the remote shell exits.
pub async fn connect(
    runner: &dyn ProcessRunner,
    program: &str,
    name: &str,
    dest: &Destination,
) -> Result<()> {
    let invocation = ssh_invocation(program, name, dest)?;
    info!("Connecting to {} ({})", name, dest.ssh);

    runner
        .interactive(&invocation)
        .await
        .map_err(|e: ProcessError| anyhow::anyhow!("ssh session to {} failed: {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::testing::ScriptedRunner;

    fn dest(ssh: &str) -> Destination {
        Destination {
            ssh: ssh.to_string(),
            region: "ap-beijing".to_string(),
            instance_id: "lhins-1".to_string(),
        }
    }

    #[test]
    fn test_ssh_invocation() {
        let invocation = ssh_invocation("ssh", "tokyo", &dest("root@tokyo.example.com")).unwrap();
        assert_eq!(invocation.program, "ssh");
        assert_eq!(invocation.args, vec!["root@tokyo.example.com"]);
    }

    #[test]
    fn test_ssh_invocation_requires_target() {
        let err = ssh_invocation("ssh", "tokyo", &dest("  ")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingDestinationField { field: "ssh", .. }
        ));
    }

    #[tokio::test]
    async fn test_connect_runs_interactively() {
        let runner = ScriptedRunner::default();
        connect(&runner, "ssh", "tokyo", &dest("root@tokyo.example.com"))
            .await
            .unwrap();

        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_names_destination() {
        let runner = ScriptedRunner::default();
        runner.push(Err(ProcessError::Failed {
            program: "ssh".to_string(),
            code: Some(255),
            stderr: String::new(),
        }));

        let err = connect(&runner, "ssh", "tokyo", &dest("root@tokyo.example.com"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tokyo"));
    }
}
