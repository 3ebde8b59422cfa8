// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine the directories that every target config file is resolved
//! against. Nothing here checks whether the returned paths actually exist.

use shellexpand::LookupError;
use std::{
    borrow::Cow,
    env::{self, VarError},
    path::{Path, PathBuf},
};

/// Directories that target paths are resolved against.
///
/// Resolved once by the caller and handed to the [`Switcher`], so the
/// engine itself never reads ambient process state.
///
/// [`Switcher`]: crate::switcher::Switcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// User's home directory.
    pub home_dir: PathBuf,

    /// Base directory of per-application configuration, e.g.,
    /// `$XDG_CONFIG_HOME`.
    pub config_dir: PathBuf,
}

impl Environment {
    /// Construct new environment from explicit directories.
    pub fn new(home_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            config_dir: config_dir.into(),
        }
    }

    /// Determine environment from the calling process.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if home directory path cannot be determined.
    pub fn try_from_process() -> Result<Self> {
        Ok(Self::new(home_dir()?, config_dir()?))
    }

    /// Perform shell expansion on an entry.
    ///
    /// Tilde, `$HOME`, and `$XDG_CONFIG_HOME` expand to this environment's
    /// directories rather than the calling process's. Any other variable is
    /// looked up in the process environment. Unset variables stay as is.
    ///
    /// # Errors
    ///
    /// - Return [`LookupError`] if a variable is set, but not valid unicode.
    pub fn expand<'a>(&self, entry: &'a str) -> Result<Cow<'a, str>, LookupError<VarError>> {
        shellexpand::full_with_context(
            entry,
            || self.home_dir.to_str(),
            |var| match var {
                "HOME" => Ok(self.home_dir.to_str().map(str::to_owned)),
                "XDG_CONFIG_HOME" => Ok(self.config_dir.to_str().map(str::to_owned)),
                _ => match env::var(var) {
                    Ok(value) => Ok(Some(value)),
                    Err(VarError::NotPresent) => Ok(None),
                    Err(err) => Err(err),
                },
            },
        )
    }

    /// Resolve a target path entry.
    ///
    /// Expands the entry, then resolves it against the configuration
    /// directory unless it is already absolute.
    ///
    /// # Errors
    ///
    /// - Return [`LookupError`] if a variable is set, but not valid unicode.
    pub fn resolve_target(&self, entry: &str) -> Result<PathBuf, LookupError<VarError>> {
        let expanded = PathBuf::from(self.expand(entry)?.into_owned());
        if expanded.is_absolute() {
            Ok(expanded)
        } else {
            Ok(self.config_relative(expanded))
        }
    }

    /// Resolve a home-relative path, e.g., a wallpaper entry.
    pub fn home_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        self.home_dir.join(path)
    }

    /// Resolve a config-relative path, e.g., "nvim/init.vim".
    pub fn config_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        self.config_dir.join(path)
    }
}

/// Determine absolute path to user's home directory.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine absolute path to user's configuration directory.
///
/// Prefers `$XDG_CONFIG_HOME` when it is set to a non-empty value, and falls
/// back to the platform default otherwise.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn config_dir() -> Result<PathBuf> {
    match env::var_os("XDG_CONFIG_HOME") {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => dirs::config_dir().ok_or(NoWayHome),
    }
}

/// Determine default absolute path to settings file.
///
/// Uses `$XDG_CONFIG_HOME/theme-switch/settings.toml`.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_settings_path() -> Result<PathBuf> {
    config_dir().map(|path| path.join("theme-switch").join("settings.toml"))
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
