// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the settings file that maps each target adapter to
//! the config files it edits, lists refresh actions, and overrides built-in
//! theme attributes. File I/O is left to the caller to figure out.
//!
//! # Target Paths
//!
//! The config files that each adapter edits differ between machines, and
//! even between revisions of the same dotfiles, e.g., "polybar/config" versus
//! "polybar/config.ini". Thus, none of them are assumed. Every adapter gets
//! its own listing of path entries. Each entry goes through shell expansion,
//! relative entries are resolved against the configuration directory, and
//! entries containing glob metacharacters are expanded into every match.

use crate::registry::ThemeId;

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Settings file layout.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// External programs that must be on `PATH` before any file is edited.
    pub required_tools: Vec<String>,

    /// Config files edited by each adapter.
    pub targets: Targets,

    /// Best-effort actions run after every config file has been written.
    ///
    /// Arguments are shell expanded right before the action runs.
    pub refresh: Vec<RefreshAction>,

    /// Per-theme replacement of built-in attribute values.
    pub themes: BTreeMap<String, ThemeOverrides>,
}

impl Settings {
    /// Iterate through theme overrides keyed by identifier.
    ///
    /// Keys are validated when settings are parsed, so any key that is not a
    /// supported identifier only exists if the caller built settings by hand,
    /// and is skipped.
    pub fn theme_overrides(&self) -> impl Iterator<Item = (ThemeId, &ThemeOverrides)> {
        self.themes
            .iter()
            .filter_map(|(key, overrides)| key.parse().ok().map(|id| (id, overrides)))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            required_tools: Vec::new(),
            targets: Targets::default(),
            refresh: vec![
                RefreshAction::new("polybar", "polybar-msg", ["cmd", "restart"]),
                RefreshAction::new("tmux", "tmux", ["source-file", "~/.tmux.conf"]),
            ],
            themes: BTreeMap::new(),
        }
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Overrides cannot introduce new themes.
        for key in settings.themes.keys() {
            key.parse::<ThemeId>()?;
        }

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Config files edited by each adapter.
///
/// Path entries are kept unexpanded here. Expansion happens against an
/// explicit [`Environment`](crate::path::Environment) when targets are
/// resolved.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Targets {
    /// Terminal multiplexer configs with `#<theme>` suffix-tagged lines.
    pub multiplexer: Vec<String>,

    /// Shell rc files with `#<theme>` suffix-tagged prompt lines.
    pub shell: Vec<String>,

    /// Files holding the optional prompt block behind [`Targets::prompt_marker`].
    pub prompt: Vec<String>,

    /// Editor init files with `colorscheme` directives.
    pub editor: Vec<String>,

    /// Status panel config and module files.
    pub panel: Vec<String>,

    /// GTK 3 `settings.ini` files.
    pub gtk: Vec<String>,

    /// Legacy GTK 2 resource files.
    pub gtk_legacy: Vec<String>,

    /// Greeter configs with a `theme-name` key.
    pub greeter: Vec<String>,

    /// Terminal emulator configs with a `colors: *<alias>` line.
    pub terminal: Vec<String>,

    /// Window manager startup scripts that set the wallpaper.
    pub wallpaper: Vec<String>,

    /// Program whose invocation line sets the wallpaper.
    pub wallpaper_program: String,

    /// Sentinel comment line that precedes the prompt block.
    pub prompt_marker: String,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            multiplexer: vec!["~/.tmux.conf".into()],
            shell: vec!["~/.bashrc".into()],
            prompt: vec!["~/.bashrc".into()],
            editor: vec!["nvim/init.vim".into()],
            panel: vec!["polybar/config.ini".into(), "polybar/modules/*.ini".into()],
            gtk: vec!["gtk-3.0/settings.ini".into()],
            gtk_legacy: vec!["~/.gtkrc-2.0".into()],
            greeter: Vec::new(),
            terminal: vec!["alacritty/alacritty.yml".into()],
            wallpaper: vec!["bspwm/bspwmrc".into()],
            wallpaper_program: "feh".into(),
            prompt_marker: "# starship".into(),
        }
    }
}

/// External command run after config files are written.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshAction {
    /// Short label used in logs.
    pub name: String,

    /// Program to execute.
    pub program: String,

    /// Arguments passed to program.
    #[serde(default)]
    pub args: Vec<String>,
}

impl RefreshAction {
    /// Construct new refresh action.
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Replacement attribute values for one theme.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeOverrides {
    pub gtk_theme_name: Option<String>,
    pub wallpaper_horizontal: Option<PathBuf>,
    pub wallpaper_vertical: Option<PathBuf>,
    pub nvim_colorscheme: Option<String>,
    pub polybar_background_token: Option<String>,
    pub alacritty_color_alias: Option<String>,
    pub starship_enabled: Option<bool>,
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Theme override names a theme outside the supported set.
    #[error("invalid theme override")]
    UnknownTheme(#[from] crate::registry::UnknownTheme),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}
