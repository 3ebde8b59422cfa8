// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme switch orchestration.
//!
//! The [`Switcher`] applies one theme across every target adapter. A run
//! goes through the following phases:
//!
//! ```text
//! Idle -> Validating -> Disabling -> Enabling -> Refreshing -> Done
//!             |
//!             +-> Rejected
//! ```
//!
//! 1. __Validating__: required tools must be on `PATH`, and the requested
//!    identifier must be in the registry. Nothing is touched on failure.
//! 2. __Disabling__: every adapter disables every theme except the selected
//!    one, theme by theme, in fixed adapter order.
//! 3. __Enabling__: every adapter enables the selected theme in the same
//!    order.
//! 4. __Refreshing__: best-effort refresh actions run.
//!
//! # Failure Model
//!
//! Unmapped attributes, missing target files, and failed refresh actions are
//! collected into the [`Report`] as notices, and the run goes on. Any other
//! I/O failure stops the run. There is no rollback. Every adapter operation
//! is idempotent, so re-running the same command always converges to a
//! consistent state for the requested theme.
//!
//! # Concurrency
//!
//! The switcher is single-threaded, and takes no file locks. Two instances
//! running against the same config files at once can interleave their edits,
//! which is unsafe.

use crate::{
    adapter::{self, Surface, Target},
    config::{RefreshAction, Settings},
    edit::{self, ConfigDrafter},
    path::Environment,
    refresh::{check_required_tools, run_action, RefreshError},
    registry::{Registry, Theme, ThemeId, UnknownTheme},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Phase of a switch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Disabling,
    Enabling,
    Refreshing,
    Done,
    Rejected,
}

/// Apply themes across all target adapters.
pub struct Switcher {
    registry: Registry,
    env: Environment,
    targets: Vec<Target>,
    refresh: Vec<RefreshAction>,
    required_tools: Vec<String>,
    phase: Phase,
}

impl Switcher {
    /// Construct new switcher from settings.
    pub fn new(settings: &Settings, env: Environment) -> Self {
        Self {
            registry: Registry::with_overrides(settings.theme_overrides()),
            targets: adapter::targets(&settings.targets, &env),
            refresh: settings.refresh.clone(),
            required_tools: settings.required_tools.clone(),
            env,
            phase: Phase::Idle,
        }
    }

    /// Registry of themes this switcher accepts.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Phase that the last run ended in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        debug!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Apply theme by identifier.
    ///
    /// # Errors
    ///
    /// - Return [`SwitchError::Refresh`] if a required tool is missing.
    /// - Return [`SwitchError::UnknownTheme`] if identifier is not supported.
    /// - Return [`SwitchError::Edit`] if a target file cannot be read or
    ///   written.
    /// - Return [`SwitchError::Expand`] or [`SwitchError::Pattern`] if a
    ///   target path entry is invalid.
    #[instrument(skip(self), level = "debug")]
    pub fn apply(&mut self, identifier: &str) -> Result<Report> {
        self.enter(Phase::Validating);
        let selected = match self.validate(identifier) {
            Ok(theme) => theme,
            Err(err) => {
                self.enter(Phase::Rejected);
                return Err(err);
            }
        };
        info!("apply theme {}", selected.id);

        let mut report = Report::new(selected.id);
        let resolved = self.resolve_targets(&mut report)?;

        self.enter(Phase::Disabling);
        let others = self
            .registry
            .others(selected.id)
            .cloned()
            .collect::<Vec<_>>();
        for theme in &others {
            self.run_pass(&resolved, theme, Pass::Disable, &mut report)?;
        }

        self.enter(Phase::Enabling);
        self.run_pass(&resolved, &selected, Pass::Enable, &mut report)?;

        self.enter(Phase::Refreshing);
        for action in &self.refresh {
            if let Err(err) = run_action(action, &self.env) {
                warn!("refresh action {:?} failed: {err}", action.name);
                report.notices.push(Notice::RefreshFailed {
                    name: action.name.clone(),
                    reason: error_chain(&err),
                });
            }
        }

        self.enter(Phase::Done);
        Ok(report)
    }

    /// Validate request before anything gets touched.
    fn validate(&self, identifier: &str) -> Result<Theme> {
        check_required_tools(&self.required_tools)?;
        Ok(self.registry.lookup(identifier)?.clone())
    }

    /// Report which themes are currently active in every target file.
    ///
    /// # Errors
    ///
    /// - Return [`SwitchError::Edit`] if a target file cannot be read.
    /// - Return [`SwitchError::Expand`] or [`SwitchError::Pattern`] if a
    ///   target path entry is invalid.
    pub fn status(&self) -> Result<Vec<StatusEntry>> {
        let mut entries = Vec::new();
        for target in &self.targets {
            let surface = target.adapter.surface();
            for entry in &target.entries {
                let paths = self.resolve_entry(entry)?;
                if paths.is_empty() {
                    entries.push(StatusEntry {
                        surface,
                        path: PathBuf::from(entry),
                        active: None,
                    });
                }

                for path in paths {
                    let active = match ConfigDrafter::new(&path).read() {
                        Ok(lines) => Some(
                            self.registry
                                .iter()
                                .filter(|theme| target.adapter.is_active(theme, &lines))
                                .map(|theme| theme.id)
                                .collect(),
                        ),
                        Err(edit::Error::Missing { .. }) => None,
                        Err(err) => return Err(err.into()),
                    };
                    entries.push(StatusEntry {
                        surface,
                        path,
                        active,
                    });
                }
            }
        }

        Ok(entries)
    }

    /// Resolve path entries of every target into existing files.
    ///
    /// Entries that resolve to nothing are recorded as missing once, here,
    /// rather than once per theme.
    fn resolve_targets(&self, report: &mut Report) -> Result<Vec<Vec<PathBuf>>> {
        let mut resolved = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let surface = target.adapter.surface();
            let mut files = Vec::new();
            for entry in &target.entries {
                let paths = self.resolve_entry(entry)?;
                if paths.is_empty() {
                    report.missing(surface, PathBuf::from(entry));
                }

                for path in paths {
                    if path.is_file() {
                        files.push(path);
                    } else {
                        report.missing(surface, path);
                    }
                }
            }
            resolved.push(files);
        }

        Ok(resolved)
    }

    /// Resolve a single path entry, expanding glob patterns.
    fn resolve_entry(&self, entry: &str) -> Result<Vec<PathBuf>> {
        let path = self
            .env
            .resolve_target(entry)
            .map_err(|source| SwitchError::Expand {
                entry: entry.to_string(),
                source,
            })?;

        let pattern = path.to_string_lossy();
        if !pattern.contains(['*', '?', '[']) {
            return Ok(vec![path]);
        }

        let mut paths = Vec::new();
        let matches = glob::glob(&pattern).map_err(|source| SwitchError::Pattern {
            entry: entry.to_string(),
            source,
        })?;
        for result in matches {
            match result {
                Ok(path) => paths.push(path),
                Err(err) => warn!("skip unreadable match of {entry:?}: {err}"),
            }
        }
        paths.sort();

        Ok(paths)
    }

    fn run_pass(
        &self,
        resolved: &[Vec<PathBuf>],
        theme: &Theme,
        pass: Pass,
        report: &mut Report,
    ) -> Result<()> {
        for (target, files) in self.targets.iter().zip(resolved) {
            let adapter = target.adapter.as_ref();
            let surface = adapter.surface();
            if files.is_empty() {
                continue;
            }

            if !adapter.supports(theme) {
                if pass == Pass::Enable && adapter.reports_gaps() {
                    warn!("{surface}: no mapping for {}", theme.id);
                    report.notices.push(Notice::Unmapped {
                        surface,
                        theme: theme.id,
                    });
                } else {
                    debug!("{surface}: no mapping for {}, skip", theme.id);
                }
                continue;
            }

            for path in files {
                let drafted = ConfigDrafter::new(path).edit(|lines| match pass {
                    Pass::Enable => adapter.enable(theme, lines),
                    Pass::Disable => adapter.disable(theme, lines),
                });

                match drafted {
                    Ok(drafted) => {
                        if drafted.value == 0 {
                            debug!("{surface}: no marker for {} in {:?}", theme.id, path.display());
                        }
                        if drafted.written {
                            report.written(path);
                        }
                    }
                    Err(edit::Error::Missing { path }) => {
                        warn!("{surface}: target {:?} vanished", path.display());
                        report.missing(surface, path);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Enable,
    Disable,
}

/// Outcome of a successful switch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Theme that was applied.
    pub theme: ThemeId,

    /// Non-fatal problems encountered along the way.
    pub notices: Vec<Notice>,

    /// Files that were rewritten, in order of first write.
    pub files_written: Vec<PathBuf>,
}

impl Report {
    fn new(theme: ThemeId) -> Self {
        Self {
            theme,
            notices: Vec::new(),
            files_written: Vec::new(),
        }
    }

    fn missing(&mut self, surface: Surface, path: PathBuf) {
        let notice = Notice::Missing { surface, path };
        if !self.notices.contains(&notice) {
            warn!("{notice}");
            self.notices.push(notice);
        }
    }

    fn written(&mut self, path: &Path) {
        if !self.files_written.iter().any(|written| written == path) {
            self.files_written.push(path.to_path_buf());
        }
    }
}

/// Non-fatal problem of a switch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Theme has no value for an adapter that must report gaps.
    Unmapped { surface: Surface, theme: ThemeId },

    /// Target file does not exist.
    Missing { surface: Surface, path: PathBuf },

    /// Refresh action failed.
    RefreshFailed { name: String, reason: String },
}

impl Display for Notice {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Unmapped { surface, theme } => write!(fmt, "{surface}: no mapping for {theme}"),
            Self::Missing { surface, path } => {
                write!(fmt, "{surface}: target file {:?} is missing", path.display())
            }
            Self::RefreshFailed { name, reason } => {
                write!(fmt, "refresh {name:?} failed: {reason}")
            }
        }
    }
}

/// Active themes of one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub surface: Surface,
    pub path: PathBuf,

    /// Active themes, or `None` if the file is missing.
    pub active: Option<Vec<ThemeId>>,
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }

    message
}

/// Switch error types.
#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    /// Requested theme is not supported.
    #[error(transparent)]
    UnknownTheme(#[from] UnknownTheme),

    /// Required tool is missing.
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    /// Target file cannot be read or written.
    #[error(transparent)]
    Edit(#[from] edit::Error),

    /// Target path entry cannot be shell expanded.
    #[error("failed to expand target path {entry:?}")]
    Expand {
        entry: String,
        #[source]
        source: shellexpand::LookupError<std::env::VarError>,
    },

    /// Target path entry is not a valid glob pattern.
    #[error("invalid target path pattern {entry:?}")]
    Pattern {
        entry: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Friendly result alias :3
pub type Result<T, E = SwitchError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Targets;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn settings(targets: Targets) -> Settings {
        Settings {
            targets,
            refresh: Vec::new(),
            ..Settings::default()
        }
    }

    fn no_targets() -> Targets {
        Targets {
            multiplexer: Vec::new(),
            shell: Vec::new(),
            prompt: Vec::new(),
            editor: Vec::new(),
            panel: Vec::new(),
            gtk: Vec::new(),
            gtk_legacy: Vec::new(),
            greeter: Vec::new(),
            terminal: Vec::new(),
            wallpaper: Vec::new(),
            ..Targets::default()
        }
    }

    #[test]
    fn unknown_theme_is_rejected_before_editing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let tmux = dir.path().join("tmux.conf");
        fs::write(&tmux, "set -g status-bg black #gruvbox\n")?;
        let env = Environment::new(dir.path(), dir.path());
        let mut switcher = Switcher::new(
            &settings(Targets {
                multiplexer: vec!["tmux.conf".into()],
                ..no_targets()
            }),
            env,
        );

        let result = switcher.apply("dracula");

        assert!(matches!(result, Err(SwitchError::UnknownTheme(_))));
        assert_eq!(switcher.phase(), Phase::Rejected);
        assert_eq!(fs::read_to_string(&tmux)?, "set -g status-bg black #gruvbox\n");

        Ok(())
    }

    #[test]
    fn missing_tool_is_rejected_before_editing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let env = Environment::new(dir.path(), dir.path());
        let mut switcher = Switcher::new(
            &Settings {
                required_tools: vec!["definitely-not-a-real-tool-8a1f".into()],
                ..settings(no_targets())
            },
            env,
        );

        let result = switcher.apply("gruvbox");

        assert!(matches!(
            result,
            Err(SwitchError::Refresh(RefreshError::MissingTool { .. }))
        ));
        assert_eq!(switcher.phase(), Phase::Rejected);

        Ok(())
    }

    #[test]
    fn missing_targets_are_reported_once() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let env = Environment::new(dir.path(), dir.path());
        let mut switcher = Switcher::new(
            &settings(Targets {
                editor: vec!["nvim/init.vim".into()],
                panel: vec!["polybar/modules/*.ini".into()],
                ..no_targets()
            }),
            env,
        );

        let report = switcher.apply("ayu")?;

        assert_eq!(
            report.notices,
            vec![
                Notice::Missing {
                    surface: Surface::Editor,
                    path: dir.path().join("nvim/init.vim"),
                },
                Notice::Missing {
                    surface: Surface::Panel,
                    path: PathBuf::from("polybar/modules/*.ini"),
                },
            ]
        );
        assert_eq!(switcher.phase(), Phase::Done);

        Ok(())
    }

    #[test]
    fn glob_entries_expand_to_every_match() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let modules = dir.path().join("polybar/modules");
        fs::create_dir_all(&modules)?;
        fs::write(modules.join("a.ini"), ";nord\n;background = #2e3440\n")?;
        fs::write(modules.join("b.ini"), ";nord\n;foreground = #d8dee9\n")?;
        let env = Environment::new(dir.path(), dir.path());
        let mut switcher = Switcher::new(
            &settings(Targets {
                panel: vec!["polybar/modules/*.ini".into()],
                ..no_targets()
            }),
            env,
        );

        let report = switcher.apply("nord")?;

        assert_eq!(report.files_written, vec![modules.join("a.ini"), modules.join("b.ini")]);
        assert_eq!(fs::read_to_string(modules.join("a.ini"))?, ";nord\nbackground = #2e3440\n");
        assert_eq!(fs::read_to_string(modules.join("b.ini"))?, ";nord\nforeground = #d8dee9\n");

        Ok(())
    }

    #[test]
    fn status_lists_active_themes() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("tmux.conf"),
            "set -g status-bg black #gruvbox\n#set -g status-bg blue #nord\n",
        )?;
        let env = Environment::new(dir.path(), dir.path());
        let switcher = Switcher::new(
            &settings(Targets {
                multiplexer: vec!["tmux.conf".into()],
                terminal: vec!["alacritty.yml".into()],
                ..no_targets()
            }),
            env,
        );

        let status = switcher.status()?;

        assert_eq!(
            status,
            vec![
                StatusEntry {
                    surface: Surface::Multiplexer,
                    path: dir.path().join("tmux.conf"),
                    active: Some(vec![ThemeId::Gruvbox]),
                },
                StatusEntry {
                    surface: Surface::Terminal,
                    path: dir.path().join("alacritty.yml"),
                    active: None,
                },
            ]
        );

        Ok(())
    }
}
