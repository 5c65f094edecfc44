//! Host introspection via local commands.
//!
//! Runs `nvidia-smi` and `who` with no arguments and captures both streams.
//! No shell is involved; a non-zero exit surfaces stderr as the error body.

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: &'static str,
        source: std::io::Error,
    },
    #[error("{command} exited with an error: {stderr}")]
    Failed {
        command: &'static str,
        stderr: String,
    },
}

/// Captured output of one host command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `command` with no arguments and capture stdout/stderr.
/// Non-zero exit is an error carrying the trimmed stderr.
async fn run(command: &'static str) -> Result<CommandOutput, HostError> {
    info!("Host: executing {}", command);
    let output = Command::new(command)
        .output()
        .await
        .map_err(|source| HostError::Spawn { command, source })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        debug!("Host: {} failed with {:?}", command, output.status.code());
        return Err(HostError::Failed {
            command,
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(CommandOutput { stdout, stderr })
}

/// GPU status from `nvidia-smi`.
pub async fn gpu_info() -> Result<CommandOutput, HostError> {
    run("nvidia-smi").await
}

/// Logged-in sessions from `who`.
pub async fn active_users() -> Result<CommandOutput, HostError> {
    run("who").await
}

/// Keep only terminal-session lines (pts for SSH/remote, tty for local) from
/// `who` output. Returns a fixed notice when nothing matches.
pub fn filter_session_lines(stdout: &str) -> String {
    let active: Vec<&str> = stdout
        .trim()
        .lines()
        .filter(|line| line.contains("pts/") || line.contains("tty"))
        .collect();
    if active.is_empty() {
        "No active user sessions found (via TTY/PTS).".to_string()
    } else {
        active.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_pts_and_tty_lines() {
        let who = "alice    pts/0        2025-08-30 10:12 (10.0.0.4)\n\
                   bob      tty1         2025-08-30 09:01\n\
                   system   console      2025-08-30 08:00\n";
        let filtered = filter_session_lines(who);
        assert!(filtered.contains("alice"));
        assert!(filtered.contains("bob"));
        assert!(!filtered.contains("system"));
    }

    #[test]
    fn no_sessions_yields_fixed_notice() {
        assert_eq!(
            filter_session_lines("system   console   2025-08-30 08:00\n"),
            "No active user sessions found (via TTY/PTS)."
        );
        assert_eq!(
            filter_session_lines(""),
            "No active user sessions found (via TTY/PTS)."
        );
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = run("definitely-not-a-real-command-xyz").await.unwrap_err();
        assert!(matches!(err, HostError::Spawn { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-command-xyz"));
    }
}
