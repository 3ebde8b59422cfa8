// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Target adapters.
//!
//! A __target adapter__ knows how one application's config file format
//! encodes a theme choice, and how to rewrite it. Adapters never touch the
//! file system themselves. They receive a [`LineEdit`] of the target file and
//! rewrite the lines that match their marker pattern. File I/O is left to the
//! [`Switcher`](crate::switcher::Switcher).
//!
//! # Marker Styles
//!
//! Adapters fall into two families:
//!
//! 1. __Toggle adapters__ keep one marker line (or line pair) per theme in
//!    the file, and switch them between commented and uncommented state. See
//!    the [`toggle`] module.
//! 2. __Value adapters__ own a single slot in the file, e.g., the value of a
//!    `gtk-theme-name` key, and overwrite it unconditionally. They have no
//!    disabled state. See the [`assign`] module.
//!
//! # Idempotence
//!
//! Every [`Adapter::enable`] and [`Adapter::disable`] call maps matched lines
//! to one canonical form. Applying either operation twice with the same
//! theme yields the same buffer as applying it once.

pub mod assign;
pub mod toggle;

use crate::{
    adapter::{
        assign::{ColorAlias, KeyAssign, WallpaperCommand},
        toggle::{ColorschemeToggle, PanelToggle, PromptToggle, SuffixToggle},
    },
    config::Targets,
    edit::LineEdit,
    path::Environment,
    registry::Theme,
};

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Config surface that an adapter edits.
///
/// Variant order is the fixed order that adapters run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Surface {
    Multiplexer,
    Shell,
    Prompt,
    Editor,
    Panel,
    Gtk,
    GtkLegacy,
    Greeter,
    Terminal,
    Wallpaper,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Multiplexer => "multiplexer",
            Self::Shell => "shell",
            Self::Prompt => "prompt",
            Self::Editor => "editor",
            Self::Panel => "panel",
            Self::Gtk => "gtk",
            Self::GtkLegacy => "gtk-legacy",
            Self::Greeter => "greeter",
            Self::Terminal => "terminal",
            Self::Wallpaper => "wallpaper",
        }
    }
}

impl Display for Surface {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Apply a theme choice to one config surface.
pub trait Adapter {
    /// Config surface this adapter edits.
    fn surface(&self) -> Surface;

    /// Check if theme has a mapping for this adapter's slot.
    ///
    /// The caller must not invoke [`Adapter::enable`] or [`Adapter::disable`]
    /// for unsupported themes.
    fn supports(&self, theme: &Theme) -> bool;

    /// Whether an unsupported theme must be reported to the user instead of
    /// being skipped quietly.
    fn reports_gaps(&self) -> bool {
        false
    }

    /// Activate theme's marker lines, or write theme's value.
    ///
    /// Returns number of marker lines matched.
    fn enable(&self, theme: &Theme, lines: &mut LineEdit) -> usize;

    /// Deactivate theme's marker lines.
    ///
    /// Returns number of marker lines matched.
    fn disable(&self, theme: &Theme, lines: &mut LineEdit) -> usize;

    /// Check if theme is currently active in buffer.
    fn is_active(&self, theme: &Theme, lines: &LineEdit) -> bool;
}

/// Adapter bundled with the path entries of the files it edits.
pub struct Target {
    pub adapter: Box<dyn Adapter>,
    pub entries: Vec<String>,
}

impl Target {
    pub fn new(adapter: impl Adapter + 'static, entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            adapter: Box::new(adapter),
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Construct every built-in adapter in fixed order.
pub fn targets(targets: &Targets, env: &Environment) -> Vec<Target> {
    vec![
        Target::new(SuffixToggle::new(Surface::Multiplexer), &targets.multiplexer),
        Target::new(SuffixToggle::new(Surface::Shell), &targets.shell),
        Target::new(PromptToggle::new(&targets.prompt_marker), &targets.prompt),
        Target::new(ColorschemeToggle, &targets.editor),
        Target::new(PanelToggle, &targets.panel),
        Target::new(KeyAssign::new(Surface::Gtk, "gtk-theme-name", false), &targets.gtk),
        Target::new(
            KeyAssign::new(Surface::GtkLegacy, "gtk-theme-name", true),
            &targets.gtk_legacy,
        ),
        Target::new(KeyAssign::new(Surface::Greeter, "theme-name", false), &targets.greeter),
        Target::new(ColorAlias, &targets.terminal),
        Target::new(
            WallpaperCommand::new(&targets.wallpaper_program, env.home_dir.clone()),
            &targets.wallpaper,
        ),
    ]
}

/// Split line into leading indentation and the rest.
pub(crate) fn split_indent(text: &str) -> (&str, &str) {
    let rest = text.trim_start();
    (&text[..text.len() - rest.len()], rest)
}
