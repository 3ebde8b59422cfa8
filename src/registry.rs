// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme registry.
//!
//! The registry is the single source of truth for which themes exist. Theme
//! identifiers form a closed set, and every identifier maps to exactly one
//! attribute bundle describing what each target adapter should write for it.
//!
//! # Attribute Gaps
//!
//! Every attribute besides the identifier is optional. An absent attribute
//! means that the theme simply has no mapping for that adapter's slot, e.g.,
//! there is no GTK theme that matches "nord". Adapters treat such gaps as a
//! no-op rather than an error.
//!
//! # Overrides
//!
//! Built-in attribute values can be replaced per theme through the settings
//! file. Only the fields that an override actually specifies are replaced.
//! Overrides cannot introduce new identifiers.

use crate::config::ThemeOverrides;

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Identifier of a supported theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    Ayu,
    Gruvbox,
    Nord,
    Solarized,
    Xbliss,
}

impl ThemeId {
    /// Every supported identifier in a fixed order.
    pub const ALL: [ThemeId; 5] = [
        ThemeId::Ayu,
        ThemeId::Gruvbox,
        ThemeId::Nord,
        ThemeId::Solarized,
        ThemeId::Xbliss,
    ];

    /// Textual form used on the command line and as the marker tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ayu => "ayu",
            Self::Gruvbox => "gruvbox",
            Self::Nord => "nord",
            Self::Solarized => "solarized",
            Self::Xbliss => "xbliss",
        }
    }
}

impl Display for ThemeId {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = UnknownTheme;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == data)
            .ok_or_else(|| UnknownTheme {
                requested: data.to_string(),
            })
    }
}

/// Attribute bundle of a single theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub id: ThemeId,
    pub gtk_theme_name: Option<String>,
    /// Home-relative or absolute wallpaper for the horizontal monitor.
    pub wallpaper_horizontal: Option<PathBuf>,
    /// Home-relative or absolute wallpaper for the vertical monitor.
    pub wallpaper_vertical: Option<PathBuf>,
    pub nvim_colorscheme: Option<String>,
    pub polybar_background_token: Option<String>,
    pub alacritty_color_alias: Option<String>,
    pub starship_enabled: bool,
}

impl Theme {
    fn builtin(id: ThemeId) -> Self {
        let name = id.as_str();
        let (gtk, nvim, alacritty) = match id {
            ThemeId::Ayu => (Some("Aritim-Dark"), "ayu", "ayu"),
            ThemeId::Gruvbox => (Some("gruvbox-gtk"), "gruvbox", "gruvbox"),
            ThemeId::Nord => (None, "nord", "nord"),
            ThemeId::Solarized => (
                Some("Solarized-Dark-Orange"),
                "solarized8_flat",
                "solarized_dark",
            ),
            ThemeId::Xbliss => (Some("Sweet-Dark"), "xbliss", "xbliss"),
        };

        Self {
            id,
            gtk_theme_name: gtk.map(Into::into),
            wallpaper_horizontal: Some(PathBuf::from(format!("wallpapers/{name}-h.png"))),
            wallpaper_vertical: Some(PathBuf::from(format!("wallpapers/{name}-v.png"))),
            nvim_colorscheme: Some(nvim.into()),
            polybar_background_token: Some(name.into()),
            alacritty_color_alias: Some(alacritty.into()),
            starship_enabled: id == ThemeId::Xbliss,
        }
    }

    /// Replace attributes with the ones an override specifies.
    pub fn apply_overrides(&mut self, overrides: &ThemeOverrides) {
        if let Some(ref gtk) = overrides.gtk_theme_name {
            self.gtk_theme_name = Some(gtk.clone());
        }
        if let Some(ref path) = overrides.wallpaper_horizontal {
            self.wallpaper_horizontal = Some(path.clone());
        }
        if let Some(ref path) = overrides.wallpaper_vertical {
            self.wallpaper_vertical = Some(path.clone());
        }
        if let Some(ref name) = overrides.nvim_colorscheme {
            self.nvim_colorscheme = Some(name.clone());
        }
        if let Some(ref token) = overrides.polybar_background_token {
            self.polybar_background_token = Some(token.clone());
        }
        if let Some(ref alias) = overrides.alacritty_color_alias {
            self.alacritty_color_alias = Some(alias.clone());
        }
        if let Some(enabled) = overrides.starship_enabled {
            self.starship_enabled = enabled;
        }
    }
}

/// Lookup table from identifier to attribute bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    themes: BTreeMap<ThemeId, Theme>,
}

impl Registry {
    /// Construct registry of built-in themes.
    pub fn builtin() -> Self {
        let themes = ThemeId::ALL
            .into_iter()
            .map(|id| (id, Theme::builtin(id)))
            .collect();

        Self { themes }
    }

    /// Construct built-in registry with settings overrides merged in.
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (ThemeId, &'a ThemeOverrides)>,
    ) -> Self {
        let mut registry = Self::builtin();
        for (id, theme_overrides) in overrides {
            if let Some(theme) = registry.themes.get_mut(&id) {
                theme.apply_overrides(theme_overrides);
            }
        }

        registry
    }

    /// Look up theme by its textual identifier.
    ///
    /// # Errors
    ///
    /// - Return [`UnknownTheme`] if identifier is not in the supported set.
    pub fn lookup(&self, identifier: &str) -> Result<&Theme, UnknownTheme> {
        let id = identifier.parse::<ThemeId>()?;
        self.themes.get(&id).ok_or_else(|| UnknownTheme {
            requested: identifier.to_string(),
        })
    }

    /// Get theme by identifier.
    pub fn get(&self, id: ThemeId) -> Option<&Theme> {
        self.themes.get(&id)
    }

    /// Supported identifiers in fixed order.
    pub fn ids(&self) -> impl Iterator<Item = ThemeId> + '_ {
        self.themes.keys().copied()
    }

    /// All themes in fixed order.
    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.values()
    }

    /// All themes except the selected one, in fixed order.
    pub fn others(&self, selected: ThemeId) -> impl Iterator<Item = &Theme> {
        self.themes.values().filter(move |theme| theme.id != selected)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Requested theme is not in the supported set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme {requested:?}, supported themes: {}", supported_list())]
pub struct UnknownTheme {
    pub requested: String,
}

fn supported_list() -> String {
    ThemeId::ALL
        .iter()
        .map(ThemeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case("ayu", ThemeId::Ayu; "ayu")]
    #[test_case("gruvbox", ThemeId::Gruvbox; "gruvbox")]
    #[test_case("solarized", ThemeId::Solarized; "solarized")]
    #[test]
    fn lookup_known_theme(identifier: &str, expect: ThemeId) {
        let registry = Registry::builtin();
        pretty_assertions::assert_eq!(registry.lookup(identifier).map(|theme| theme.id), Ok(expect));
    }

    #[test_case("dracula"; "not in set")]
    #[test_case("Gruvbox"; "case sensitive")]
    #[test_case(""; "empty")]
    #[test]
    fn lookup_unknown_theme(identifier: &str) {
        let registry = Registry::builtin();
        let result = registry.lookup(identifier).map(|theme| theme.id);
        pretty_assertions::assert_eq!(
            result,
            Err(UnknownTheme {
                requested: identifier.to_string()
            })
        );
    }

    #[test]
    fn nvim_colorscheme_may_differ_from_identifier() -> anyhow::Result<()> {
        let registry = Registry::builtin();
        let theme = registry.lookup("solarized")?;
        assert_eq!(theme.nvim_colorscheme.as_deref(), Some("solarized8_flat"));
        Ok(())
    }

    #[test]
    fn only_one_theme_enables_starship() {
        let enabled = Registry::builtin()
            .iter()
            .filter(|theme| theme.starship_enabled)
            .map(|theme| theme.id)
            .collect::<Vec<_>>();
        assert_eq!(enabled, vec![ThemeId::Xbliss]);
    }

    #[test]
    fn others_excludes_selected() {
        let registry = Registry::builtin();
        let others = registry
            .others(ThemeId::Nord)
            .map(|theme| theme.id)
            .collect::<Vec<_>>();
        assert_eq!(
            others,
            vec![
                ThemeId::Ayu,
                ThemeId::Gruvbox,
                ThemeId::Solarized,
                ThemeId::Xbliss
            ]
        );
    }

    #[test]
    fn overrides_only_replace_specified_fields() {
        let overrides = ThemeOverrides {
            gtk_theme_name: Some("Nordic".into()),
            ..Default::default()
        };
        let registry = Registry::with_overrides([(ThemeId::Nord, &overrides)]);
        let nord = registry.get(ThemeId::Nord).unwrap();
        assert_eq!(nord.gtk_theme_name.as_deref(), Some("Nordic"));
        assert_eq!(nord.nvim_colorscheme.as_deref(), Some("nord"));
    }

    #[test]
    fn unknown_theme_message_lists_supported_set() {
        let error = UnknownTheme {
            requested: "dracula".into(),
        };
        assert_eq!(
            error.to_string(),
            r#"unknown theme "dracula", supported themes: ayu, gruvbox, nord, solarized, xbliss"#
        );
    }
}
