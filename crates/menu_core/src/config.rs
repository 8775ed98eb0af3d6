use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use shared::domain::{IconStyle, ThemeOverrides, TransitionMode};
use tracing::warn;

use crate::capabilities::SettingsStore;

pub const DEFAULT_HOTKEY: &str = "Ctrl+Shift+,";

/// Menu preferences read once from the settings store when the host starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSettings {
    pub open_menu_hotkey: String,
    pub menu_button_icon_style: IconStyle,
    pub load_theme_overrides: ThemeOverrides,
    pub custom_styles: Option<String>,
    pub menu_transition: TransitionMode,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            open_menu_hotkey: DEFAULT_HOTKEY.into(),
            menu_button_icon_style: IconStyle::Colour,
            load_theme_overrides: ThemeOverrides::Auto,
            custom_styles: None,
            menu_transition: TransitionMode::Fade,
        }
    }
}

pub async fn load_menu_settings(db: &dyn SettingsStore) -> Result<MenuSettings> {
    let mut settings = MenuSettings::default();

    if let Some(v) = read_str(db, "openMenuHotkey").await? {
        if v.trim().is_empty() {
            warn!("empty openMenuHotkey; keeping default");
        } else {
            settings.open_menu_hotkey = v;
        }
    }
    if let Some(v) = read_str(db, "menuButtonIconStyle").await? {
        match IconStyle::parse(&v) {
            Some(style) => settings.menu_button_icon_style = style,
            None => warn!(value = %v, "unknown menuButtonIconStyle; keeping default"),
        }
    }
    if let Some(v) = read_str(db, "loadThemeOverrides").await? {
        match ThemeOverrides::parse(&v) {
            Some(mode) => settings.load_theme_overrides = mode,
            None => warn!(value = %v, "unknown loadThemeOverrides; keeping default"),
        }
    }
    if let Some(v) = read_str(db, "menuTransition").await? {
        match TransitionMode::parse(&v) {
            Some(mode) => settings.menu_transition = mode,
            None => warn!(value = %v, "unknown menuTransition; keeping default"),
        }
    }

    let custom = db
        .get("customStyles")
        .await
        .context("failed to read setting 'customStyles'")?;
    settings.custom_styles = custom
        .as_ref()
        .and_then(|v| v.get("content"))
        .and_then(Value::as_str)
        .filter(|css| !css.trim().is_empty())
        .map(ToString::to_string);

    Ok(settings)
}

async fn read_str(db: &dyn SettingsStore, key: &str) -> Result<Option<String>> {
    let value = db
        .get(key)
        .await
        .with_context(|| format!("failed to read setting '{key}'"))?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            warn!(key, value = %other, "setting is not a string; ignoring");
            None
        }
        None => None,
    })
}
