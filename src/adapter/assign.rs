// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Value adapters.
//!
//! Value adapters own a single slot in their target file, and overwrite it
//! with the selected theme's value no matter what it held before. There is
//! no disabled state, so [`Adapter::disable`] is a no-op for all of them.
//!
//! Values are substituted literally. Nothing has to be escaped, not even
//! slashes in wallpaper paths.

use crate::{
    adapter::{split_indent, Adapter, Surface},
    edit::LineEdit,
    registry::Theme,
};

use std::path::{Path, PathBuf};

/// Overwrite value of a `key=value` line.
///
/// Key must start the line, so "theme-name" never matches a
/// "gtk-theme-name" line. Spacing around the `=` is kept. Covers GTK 3
/// `settings.ini`, GTK 2 `.gtkrc-2.0` (quoted values), and greeter configs.
#[derive(Debug, Clone)]
pub struct KeyAssign {
    surface: Surface,
    key: String,
    quoted: bool,
}

impl KeyAssign {
    pub fn new(surface: Surface, key: impl Into<String>, quoted: bool) -> Self {
        Self {
            surface,
            key: key.into(),
            quoted,
        }
    }

    /// Split assignment line into everything up to the value, and the value.
    fn split_assignment<'a>(&self, text: &'a str) -> Option<(&'a str, &'a str)> {
        let (indent, rest) = split_indent(text);
        let after_key = rest.strip_prefix(self.key.as_str())?;
        let after_eq = after_key.trim_start().strip_prefix('=')?;
        let value = after_eq.trim_start();
        let head_len = indent.len() + rest.len() - value.len();

        Some((&text[..head_len], value.trim_end()))
    }

    fn render_value(&self, value: &str) -> String {
        if self.quoted {
            format!("\"{value}\"")
        } else {
            value.to_string()
        }
    }
}

impl Adapter for KeyAssign {
    fn surface(&self) -> Surface {
        self.surface
    }

    fn supports(&self, theme: &Theme) -> bool {
        theme.gtk_theme_name.is_some()
    }

    fn reports_gaps(&self) -> bool {
        true
    }

    fn enable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        let Some(name) = theme.gtk_theme_name.as_deref() else {
            return 0;
        };

        let value = self.render_value(name);
        lines.rewrite_each(|text| {
            self.split_assignment(text)
                .map(|(head, _)| format!("{head}{value}"))
        })
    }

    fn disable(&self, _theme: &Theme, _lines: &mut LineEdit) -> usize {
        0
    }

    fn is_active(&self, theme: &Theme, lines: &LineEdit) -> bool {
        let Some(name) = theme.gtk_theme_name.as_deref() else {
            return false;
        };

        let value = self.render_value(name);
        lines
            .iter()
            .filter_map(|text| self.split_assignment(text))
            .any(|(_, current)| current == value)
    }
}

/// Overwrite YAML anchor alias of terminal emulator colors.
///
/// Targets alacritty's `colors: *<alias>` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorAlias;

impl ColorAlias {
    fn current_alias(text: &str) -> Option<&str> {
        let (_, rest) = split_indent(text);
        rest.strip_prefix("colors:")?
            .trim()
            .strip_prefix('*')
    }
}

impl Adapter for ColorAlias {
    fn surface(&self) -> Surface {
        Surface::Terminal
    }

    fn supports(&self, theme: &Theme) -> bool {
        theme.alacritty_color_alias.is_some()
    }

    fn enable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        let Some(alias) = theme.alacritty_color_alias.as_deref() else {
            return 0;
        };

        lines.rewrite_each(|text| {
            Self::current_alias(text).map(|_| {
                let (indent, _) = split_indent(text);
                format!("{indent}colors: *{alias}")
            })
        })
    }

    fn disable(&self, _theme: &Theme, _lines: &mut LineEdit) -> usize {
        0
    }

    fn is_active(&self, theme: &Theme, lines: &LineEdit) -> bool {
        let Some(alias) = theme.alacritty_color_alias.as_deref() else {
            return false;
        };

        lines
            .iter()
            .any(|text| Self::current_alias(text) == Some(alias))
    }
}

/// Rewrite wallpaper arguments of a window manager startup script.
///
/// Matches the line whose first word is the wallpaper program, e.g.,
/// `feh --image-bg black --bg-fill a.png b.png &`. The wallpaper arguments
/// are the trailing run of image paths before an optional `&`. They are
/// replaced by the theme's wallpaper paths, and every other word, option
/// values included, survives as is. Relative wallpaper paths are resolved
/// against the home directory.
#[derive(Debug, Clone)]
pub struct WallpaperCommand {
    program: String,
    home_dir: PathBuf,
}

impl WallpaperCommand {
    pub fn new(program: impl Into<String>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            home_dir: home_dir.into(),
        }
    }

    fn is_invocation(&self, text: &str) -> bool {
        split_indent(text)
            .1
            .split_whitespace()
            .next()
            .is_some_and(|word| {
                word == self.program
                    || Path::new(word).file_name().is_some_and(|name| name == self.program.as_str())
            })
    }

    fn wallpapers(&self, theme: &Theme) -> Vec<String> {
        [&theme.wallpaper_horizontal, &theme.wallpaper_vertical]
            .into_iter()
            .flatten()
            .map(|path| {
                let path = self.home_dir.join(path).to_string_lossy().into_owned();
                if path.contains(char::is_whitespace) {
                    format!("'{path}'")
                } else {
                    path
                }
            })
            .collect()
    }

    fn rewrite(&self, text: &str, wallpapers: &[String]) -> String {
        let (indent, rest) = split_indent(text);
        let invocation = Invocation::parse(rest);

        let mut rebuilt = invocation.head.to_vec();
        rebuilt.extend(wallpapers.iter().map(String::as_str));
        if invocation.background {
            rebuilt.push("&");
        }

        format!("{indent}{}", rebuilt.join(" "))
    }
}

impl Adapter for WallpaperCommand {
    fn surface(&self) -> Surface {
        Surface::Wallpaper
    }

    fn supports(&self, theme: &Theme) -> bool {
        theme.wallpaper_horizontal.is_some()
    }

    fn reports_gaps(&self) -> bool {
        true
    }

    fn enable(&self, theme: &Theme, lines: &mut LineEdit) -> usize {
        let wallpapers = self.wallpapers(theme);
        if wallpapers.is_empty() {
            return 0;
        }

        lines.rewrite_each(|text| {
            self.is_invocation(text)
                .then(|| self.rewrite(text, &wallpapers))
        })
    }

    fn disable(&self, _theme: &Theme, _lines: &mut LineEdit) -> usize {
        0
    }

    fn is_active(&self, theme: &Theme, lines: &LineEdit) -> bool {
        let wallpapers = self.wallpapers(theme);
        if wallpapers.is_empty() {
            return false;
        }

        lines
            .iter()
            .filter(|text| self.is_invocation(text))
            .any(|text| Invocation::parse(split_indent(text).1).paths == wallpapers)
    }
}

/// Wallpaper program invocation split into shell words.
#[derive(Debug)]
struct Invocation<'a> {
    /// Program and every word up to the wallpaper paths.
    head: Vec<&'a str>,

    /// Trailing image path arguments.
    paths: Vec<&'a str>,

    /// Whether the invocation ends with `&`.
    background: bool,
}

impl<'a> Invocation<'a> {
    fn parse(text: &'a str) -> Self {
        let mut words = shell_words(text);
        let background = words.last() == Some(&"&");
        if background {
            words.pop();
        }

        // INVARIANT: Program itself is never a wallpaper path.
        let mut split = words.len();
        while split > 1 && is_image_path(words[split - 1]) {
            split -= 1;
        }
        let paths = words.split_off(split);

        Self {
            head: words,
            paths,
            background,
        }
    }
}

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"];

/// Check if shell word names an image file or directory of images.
fn is_image_path(word: &str) -> bool {
    if word.starts_with('-') {
        return false;
    }

    let bare = word.trim_matches(|c: char| c == '\'' || c == '"');
    bare.contains('/')
        || Path::new(bare)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Split text into shell words, keeping quotes as part of the word.
fn shell_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = None;
    let mut quote = None;

    for (index, c) in text.char_indices() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if c.is_whitespace() => {
                if let Some(begin) = start.take() {
                    words.push(&text[begin..index]);
                }
            }
            None => {
                if start.is_none() {
                    start = Some(index);
                }
                if c == '\'' || c == '"' {
                    quote = Some(c);
                }
            }
        }
    }

    if let Some(begin) = start {
        words.push(&text[begin..]);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registry, ThemeId};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn theme(id: ThemeId) -> Theme {
        Registry::builtin().get(id).cloned().unwrap()
    }

    #[test]
    fn key_assign_overwrites_settings_ini() {
        let adapter = KeyAssign::new(Surface::Gtk, "gtk-theme-name", false);
        let mut lines = LineEdit::from(indoc! {r#"
            [Settings]
            gtk-theme-name=gruvbox-gtk
            gtk-icon-theme-name=Papirus-Dark
        "#});

        let matched = adapter.enable(&theme(ThemeId::Solarized), &mut lines);

        assert_eq!(matched, 1);
        assert_eq!(
            lines.to_string(),
            indoc! {r#"
                [Settings]
                gtk-theme-name=Solarized-Dark-Orange
                gtk-icon-theme-name=Papirus-Dark
            "#}
        );
        assert!(adapter.is_active(&theme(ThemeId::Solarized), &lines));
    }

    #[test]
    fn key_assign_quotes_legacy_gtkrc() {
        let adapter = KeyAssign::new(Surface::GtkLegacy, "gtk-theme-name", true);
        let mut lines = LineEdit::from("gtk-theme-name = \"Sweet-Dark\"\ngtk-font-name=\"Sans 10\"\n");
        adapter.enable(&theme(ThemeId::Ayu), &mut lines);
        assert_eq!(
            lines.to_string(),
            "gtk-theme-name = \"Aritim-Dark\"\ngtk-font-name=\"Sans 10\"\n"
        );
    }

    #[test]
    fn key_assign_greeter_key_does_not_match_gtk_key() {
        let adapter = KeyAssign::new(Surface::Greeter, "theme-name", false);
        let mut lines = LineEdit::from(indoc! {r#"
            [greeter]
            gtk-theme-name=Adwaita
            theme-name = Adwaita
            icon-theme-name = Papirus
        "#});
        adapter.enable(&theme(ThemeId::Gruvbox), &mut lines);
        assert_eq!(
            lines.to_string(),
            indoc! {r#"
                [greeter]
                gtk-theme-name=Adwaita
                theme-name = gruvbox-gtk
                icon-theme-name = Papirus
            "#}
        );
    }

    #[test]
    fn key_assign_has_no_mapping_for_nord() {
        let adapter = KeyAssign::new(Surface::Gtk, "gtk-theme-name", false);
        assert!(!adapter.supports(&theme(ThemeId::Nord)));
        assert!(adapter.reports_gaps());
    }

    #[test]
    fn color_alias_overwrites_anchor() {
        let adapter = ColorAlias;
        let mut lines = LineEdit::from(indoc! {r#"
            schemes:
              gruvbox: &gruvbox
                primary:
                  background: '#282828'
            colors: *gruvbox
        "#});

        adapter.enable(&theme(ThemeId::Solarized), &mut lines);
        adapter.enable(&theme(ThemeId::Solarized), &mut lines);

        assert_eq!(lines.get(4), Some("colors: *solarized_dark"));
        assert!(adapter.is_active(&theme(ThemeId::Solarized), &lines));
        assert!(!adapter.is_active(&theme(ThemeId::Gruvbox), &lines));
    }

    #[test]
    fn wallpaper_command_rewrites_paths() {
        let adapter = WallpaperCommand::new("feh", "/home/blah");
        let mut lines = LineEdit::from(indoc! {r#"
            #!/bin/sh
            sxhkd &
            feh --bg-fill /home/blah/wallpapers/old-h.png /home/blah/wallpapers/old-v.png &
            bspc monitor -d I II III
        "#});

        let matched = adapter.enable(&theme(ThemeId::Nord), &mut lines);

        assert_eq!(matched, 1);
        assert_eq!(
            lines.get(2),
            Some("feh --bg-fill /home/blah/wallpapers/nord-h.png /home/blah/wallpapers/nord-v.png &")
        );
        assert!(adapter.is_active(&theme(ThemeId::Nord), &lines));

        let before = lines.to_string();
        adapter.enable(&theme(ThemeId::Nord), &mut lines);
        assert_eq!(lines.to_string(), before);
    }

    #[test]
    fn wallpaper_command_keeps_option_values() {
        let adapter = WallpaperCommand::new("feh", "/home/u");
        let mut lines = LineEdit::from("feh --image-bg black --bg-max old.png &\n");

        adapter.enable(&theme(ThemeId::Nord), &mut lines);

        assert_eq!(
            lines.to_string(),
            "feh --image-bg black --bg-max /home/u/wallpapers/nord-h.png /home/u/wallpapers/nord-v.png &\n"
        );
    }

    #[test]
    fn wallpaper_command_quotes_paths_with_spaces() {
        let adapter = WallpaperCommand::new("feh", "/home/u/my pictures");
        let mut lines = LineEdit::from("feh --bg-fill '/home/u/my pictures/old.png' &\n");

        adapter.enable(&theme(ThemeId::Ayu), &mut lines);

        assert_eq!(
            lines.to_string(),
            "feh --bg-fill '/home/u/my pictures/wallpapers/ayu-h.png' \
             '/home/u/my pictures/wallpapers/ayu-v.png' &\n"
        );
        assert!(adapter.is_active(&theme(ThemeId::Ayu), &lines));
        assert!(!adapter.is_active(&theme(ThemeId::Nord), &lines));
    }

    #[test]
    fn wallpaper_command_keeps_absolute_paths() {
        let adapter = WallpaperCommand::new("feh", "/home/blah");
        let mut nord = theme(ThemeId::Nord);
        nord.wallpaper_horizontal = Some(PathBuf::from("/usr/share/backgrounds/nord.png"));
        nord.wallpaper_vertical = None;
        let mut lines = LineEdit::from("  /usr/bin/feh --bg-scale old.png\n");

        adapter.enable(&nord, &mut lines);

        assert_eq!(
            lines.to_string(),
            "  /usr/bin/feh --bg-scale /usr/share/backgrounds/nord.png\n"
        );
    }
}
