// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Post-apply refresh actions.
//!
//! Once every config file holds the selected theme, running applications
//! still need to notice, e.g., polybar has to restart, and tmux has to source
//! its config again. These actions are best-effort. Their failure never
//! undoes or invalidates the config files that were already written.

use crate::{config::RefreshAction, path::Environment};

use std::{ffi::OsStr, process::Command};
use tracing::{debug, info, instrument};

/// Check that every required tool can be found on `PATH`.
///
/// # Errors
///
/// - Return [`RefreshError::MissingTool`] for the first tool not found.
pub fn check_required_tools(tools: impl IntoIterator<Item = impl AsRef<str>>) -> Result<()> {
    for tool in tools {
        let tool = tool.as_ref();
        if which::which(tool).is_err() {
            return Err(RefreshError::MissingTool {
                tool: tool.to_string(),
            });
        }
        debug!("found required tool {tool:?}");
    }

    Ok(())
}

/// Run refresh action.
///
/// Arguments are shell expanded against given environment first.
///
/// # Errors
///
/// - Return [`RefreshError::Expand`] if an argument cannot be expanded.
/// - Return [`RefreshError::Syscall`] if program cannot be spawned, or exits
///   with failure.
#[instrument(skip(action, env), fields(name = %action.name), level = "debug")]
pub fn run_action(action: &RefreshAction, env: &Environment) -> Result<String> {
    let args = action
        .args
        .iter()
        .map(|arg| env.expand(arg).map(|arg| arg.into_owned()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| RefreshError::Expand {
            name: action.name.clone(),
            source,
        })?;

    let output = syscall_non_interactive(&action.program, &args)?;
    info!("refreshed {}", action.name);

    Ok(output)
}

fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let output = Command::new(cmd.as_ref()).args(args).output()?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.is_empty() {
        message.push_str(format!("stdout: {stdout}").as_str());
    }

    if !stderr.is_empty() {
        message.push_str(format!("stderr: {stderr}").as_str());
    }

    // INVARIANT: Chomp trailing newlines.
    let message = message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message);

    if !output.status.success() {
        return Err(RefreshError::Syscall(std::io::Error::other(format!(
            "command {:?} failed:\n{message}",
            cmd.as_ref()
        ))));
    }

    Ok(message)
}

/// Refresh error types.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// Required external tool is not on `PATH`.
    #[error("required tool {tool:?} not found on PATH")]
    MissingTool { tool: String },

    /// Refresh action argument cannot be shell expanded.
    #[error("failed to expand arguments of refresh action {name:?}")]
    Expand {
        name: String,
        #[source]
        source: shellexpand::LookupError<std::env::VarError>,
    },

    /// Refresh program failed to run, or exited with failure.
    #[error(transparent)]
    Syscall(#[from] std::io::Error),
}

/// Friendly result alias :3
type Result<T, E = RefreshError> = std::result::Result<T, E>;
