// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Toggle adapters.
//!
//! Toggle adapters keep every theme's variant of a setting in the target
//! file at once, and switch between them by commenting out all variants but
//! one. The comment character is whatever the file format uses, e.g., `#` for
//! tmux and bash, `"` for vim script, and `;` for polybar.
//!
//! # Canonical Forms
//!
//! Matched lines only ever take one of two forms: enabled, with every leading
//! comment character stripped, or disabled, with exactly one comment
//! character at the start of the line, in front of the enabled form.
//! Whatever follows the comment characters is kept as is, so `# set` enables
//! to ` set`, and `  set` disables to `#  set`. Disable after enable is a
//! byte-for-byte round trip for files that follow this convention.

use crate::{
    adapter::{split_indent, Adapter, Surface},
    edit::LineEdit,
    registry::Theme,
};

/// Enabled form of line content.
fn enabled_form(content: &str, comment: char) -> &str {
    content.trim_start_matches(comment)
}

/// Line with its leading comment characters stripped.
///
/// Whitespace after the comment characters is kept. An indented comment keeps
/// its indentation.
fn uncommented(text: &str, comment: char) -> String {
    let (indent, rest) = split_indent(text);
    if indent.is_empty() || !rest.starts_with(comment) {
        text.trim_start_matches(comment).to_string()
    } else {
        format!("{indent}{}", enabled_form(rest, comment))
    }
}

/// Rewrite line into its enabled or disabled canonical form.
fn toggled(text: &str, comment: char, enable: bool) -> String {
    let enabled = uncommented(text, comment);
    if enable {
        enabled
    } else {
        format!("{comment}{enabled}")
    }
}

fn is_commented(text: &str, comment: char) -> bool {
    split_indent(text).1.starts_with(comment)
}

/// Toggle second line of every matching line pair.
///
/// Walks the buffer as a sliding two-line window. A pair matches if the first
/// line satisfies `is_marker`, and the second line satisfies `is_value`. A
/// matched value line is never treated as the start of another pair.
fn toggle_pairs<M, V>(lines: &mut LineEdit, comment: char, enable: bool, is_marker: M, is_value: V) -> usize
where
    M: Fn(&str) -> bool,
    V: Fn(&str) -> bool,
{
    let mut matched = 0;
    let mut index = 0;
    while index + 1 < lines.len() {
        let (Some(marker), Some(value)) = (lines.get(index), lines.get(index + 1)) else {
            break;
        };

        if is_marker(marker) && is_value(value) {
            let text = toggled(value, comment, enable);
            lines.replace(index + 1, text);
            matched += 1;
            index += 2;
        } else {
            index += 1;
        }
    }

    matched
}

/// Check if any pair has an uncommented value line.
fn any_pair_active<M, V>(lines: &LineEdit, comment: char, is_marker: M, is_value: V) -> bool
where
    M: Fn(&str) -> bool,
    V: Fn(&str) -> bool,
{
    let text = lines.iter().collect::<Vec<_>>();
    text.windows(2)
        .any(|pair| is_marker(pair[0]) && is_value(pair[1]) && !is_commented(pair[1], comment))
}

/// Toggle lines tagged with a `#<theme>` suffix.
///
/// Used for terminal multiplexer and shell rc files, e.g.:
///
/// ```text
/// set -g status-bg black #gruvbox
/// #set -g status-bg blue #nord
/// ```
///
/// A tag only counts if whitespace separates it from actual line content, so
/// a line made of nothing but the tag is left alone.
#[derive(Debug, Clone, Copy)]
pub struct SuffixToggle {
    surface: Surface,
}

impl SuffixToggle {
    pub fn new(surface: Surface) -> Self {
        Self { surface }
    }

    fn is_tagged(text: &str, theme: &Theme) -> bool {
        let tag = format!("#{}", theme.id);
        let Some(body) = text.trim_end().strip_suffix(tag.as_str()) else {
            return false;
        };

        body.ends_with(char::is_whitespace) && !enabled_form(body.trim(), '#').trim().is_empty()
    }

    fn toggle(&self, theme: &Theme, lines: &mut LineEdit, enable: bool) -> usize {
        lines.rewrite_each(|text| {
            Self::is_tagged(text, theme).then(|| toggled(text, '#', enable))
        })
    }
}

impl Adapter for SuffixToggle {
    fn surface(&self) -> Surface {
        self.surface
    }

    fn supports(&self, _theme: &Theme) -> bool {
        true
    }

    fn enable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        self.toggle(theme, lines, true)
    }

    fn disable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        self.toggle(theme, lines, false)
    }

    fn is_active(&self, theme: &Theme, lines: &LineEdit) -> bool {
        lines
            .iter()
            .any(|text| Self::is_tagged(text, theme) && !is_commented(text, '#'))
    }
}

/// Toggle `colorscheme <name>` directives in vim script.
///
/// A leading `"` starts a comment in vim script, so `"colorscheme gruvbox`
/// is the disabled form.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorschemeToggle;

impl ColorschemeToggle {
    fn is_directive(text: &str, name: &str) -> bool {
        let content = enabled_form(split_indent(text).1, '"');
        let mut words = content.split_whitespace();
        words.next() == Some("colorscheme") && words.next() == Some(name) && words.next().is_none()
    }

    fn toggle(&self, theme: &Theme, lines: &mut LineEdit, enable: bool) -> usize {
        let Some(name) = theme.nvim_colorscheme.as_deref() else {
            return 0;
        };

        lines.rewrite_each(|text| Self::is_directive(text, name).then(|| toggled(text, '"', enable)))
    }
}

impl Adapter for ColorschemeToggle {
    fn surface(&self) -> Surface {
        Surface::Editor
    }

    fn supports(&self, theme: &Theme) -> bool {
        theme.nvim_colorscheme.is_some()
    }

    fn enable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        self.toggle(theme, lines, true)
    }

    fn disable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        self.toggle(theme, lines, false)
    }

    fn is_active(&self, theme: &Theme, lines: &LineEdit) -> bool {
        let Some(name) = theme.nvim_colorscheme.as_deref() else {
            return false;
        };

        lines
            .iter()
            .any(|text| Self::is_directive(text, name) && !is_commented(text, '"'))
    }
}

/// Toggle polybar color pairs.
///
/// Each theme owns a `;<token>` marker line that is directly followed by the
/// `key = value` line it governs:
///
/// ```text
/// ;gruvbox
/// background = #282828
/// ;nord
/// ;background = #2e3440
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelToggle;

impl PanelToggle {
    fn is_marker(text: &str, token: &str) -> bool {
        text.trim()
            .strip_prefix(';')
            .is_some_and(|rest| rest == token)
    }

    fn is_value(text: &str) -> bool {
        enabled_form(split_indent(text).1, ';').contains('=')
    }

    fn toggle(&self, theme: &Theme, lines: &mut LineEdit, enable: bool) -> usize {
        let Some(token) = theme.polybar_background_token.as_deref() else {
            return 0;
        };

        toggle_pairs(lines, ';', enable, |text| Self::is_marker(text, token), Self::is_value)
    }
}

impl Adapter for PanelToggle {
    fn surface(&self) -> Surface {
        Surface::Panel
    }

    fn supports(&self, theme: &Theme) -> bool {
        theme.polybar_background_token.is_some()
    }

    fn enable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        self.toggle(theme, lines, true)
    }

    fn disable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        self.toggle(theme, lines, false)
    }

    fn is_active(&self, theme: &Theme, lines: &LineEdit) -> bool {
        let Some(token) = theme.polybar_background_token.as_deref() else {
            return false;
        };

        any_pair_active(lines, ';', |text| Self::is_marker(text, token), Self::is_value)
    }
}

/// Toggle optional prompt block behind a sentinel comment.
///
/// Only themes that enable starship own the block:
///
/// ```text
/// # starship
/// eval "$(starship init bash)"
/// ```
#[derive(Debug, Clone)]
pub struct PromptToggle {
    marker: String,
}

impl PromptToggle {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    fn is_marker(&self, text: &str) -> bool {
        text.trim() == self.marker.trim()
    }

    fn is_value(&self, text: &str) -> bool {
        !self.is_marker(text) && !enabled_form(split_indent(text).1, '#').trim().is_empty()
    }
}

impl Adapter for PromptToggle {
    fn surface(&self) -> Surface {
        Surface::Prompt
    }

    fn supports(&self, theme: &Theme) -> bool {
        theme.starship_enabled
    }

    fn enable(&self, _theme: &Theme, lines: &mut LineEdit) -> usize {
        toggle_pairs(lines, '#', true, |text| self.is_marker(text), |text| self.is_value(text))
    }

    fn disable(&self, _theme: &Theme, lines: &mut LineEdit) -> usize {
        toggle_pairs(lines, '#', false, |text| self.is_marker(text), |text| self.is_value(text))
    }

    fn is_active(&self, theme: &Theme, lines: &LineEdit) -> bool {
        theme.starship_enabled
            && any_pair_active(lines, '#', |text| self.is_marker(text), |text| self.is_value(text))
    }
}
