// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme templates.
//!
//! Some config files are easier to generate than to patch. A template is
//! plain text with `{{ variable }}` placeholders that get replaced by the
//! selected theme's attribute values.
//!
//! # Placeholder Syntax
//!
//! A placeholder opens with `{{`, and closes with `}}`. In between is a
//! single variable name made of ASCII letters, digits, `.`, and `_`, with
//! optional spaces on either side. Anything that does not fit this shape,
//! e.g., `{ x }`, `{{ x }`, or `{{ some name }}`, is kept as literal text.
//!
//! Variables that have no value render as `` `MISSING VARIABLE <name>` ``, so
//! gaps stay visible in generated files rather than silently becoming empty.

use crate::{path::Environment, registry::Theme};

use std::collections::BTreeMap;

/// Piece of lexed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text.
    Text(&'a str),

    /// Placeholder, holding its raw text and variable name.
    Variable { raw: &'a str, name: &'a str },
}

/// Split template text into literal text and placeholders.
///
/// Adjacent literal text is merged into a single token.
pub fn lex(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find("{{") {
        let open = cursor + offset;
        match placeholder_at(text, open) {
            Some((end, name)) => {
                if text_start < open {
                    tokens.push(Token::Text(&text[text_start..open]));
                }
                tokens.push(Token::Variable {
                    raw: &text[open..end],
                    name,
                });
                text_start = end;
                cursor = end;
            }
            None => cursor = open + 1,
        }
    }

    if text_start < text.len() {
        tokens.push(Token::Text(&text[text_start..]));
    }

    tokens
}

/// Parse placeholder starting at `open`.
///
/// Returns end offset of placeholder and its variable name.
fn placeholder_at(text: &str, open: usize) -> Option<(usize, &str)> {
    let inner_start = open + 2;
    let close = inner_start + text[inner_start..].find("}}")?;
    let inner = &text[inner_start..close];
    let name = inner.trim_matches(' ');

    let is_name_char = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '_';
    if name.is_empty() || !name.chars().all(is_name_char) {
        return None;
    }

    Some((close + 2, name))
}

/// Render template with given variables.
pub fn render(text: &str, variables: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    for token in lex(text) {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Variable { name, .. } => match variables.get(name) {
                Some(value) => out.push_str(value),
                None => out.push_str(&format!("`MISSING VARIABLE {name}`")),
            },
        }
    }

    out
}

/// Collect template variables of a theme.
///
/// Unmapped attributes are left out, so they render as missing.
pub fn theme_variables(theme: &Theme, env: &Environment) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    variables.insert("theme.name".into(), theme.id.to_string());
    variables.insert("starship.enabled".into(), theme.starship_enabled.to_string());

    let optional = [
        ("gtk.theme_name", theme.gtk_theme_name.clone()),
        ("nvim.colorscheme", theme.nvim_colorscheme.clone()),
        ("polybar.background", theme.polybar_background_token.clone()),
        ("alacritty.colors", theme.alacritty_color_alias.clone()),
        (
            "wallpaper.horizontal",
            theme
                .wallpaper_horizontal
                .as_ref()
                .map(|path| env.home_relative(path).to_string_lossy().into_owned()),
        ),
        (
            "wallpaper.vertical",
            theme
                .wallpaper_vertical
                .as_ref()
                .map(|path| env.home_relative(path).to_string_lossy().into_owned()),
        ),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            variables.insert(name.into(), value);
        }
    }

    variables
}
