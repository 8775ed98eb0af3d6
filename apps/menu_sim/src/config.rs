use std::{collections::HashMap, fs, path::Path};

use menu_core::capabilities::MemorySettings;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

pub const DEFAULT_PANELS: &[&str] = &["welcome", "core", "themes", "extensions", "integrations"];

/// Seed for one simulated session: the host's stored preferences plus the
/// state of the simulated page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimSettings {
    pub open_menu_hotkey: String,
    pub menu_button_icon_style: String,
    pub menu_transition: String,
    pub load_theme_overrides: String,
    pub custom_styles: Option<String>,
    pub dark_mode: bool,
    pub enhancer_base_url: String,
    pub version: String,
    pub agreed_to_terms: Option<String>,
    pub update_available: bool,
    pub panels: Vec<String>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            open_menu_hotkey: "Ctrl+Shift+,".into(),
            menu_button_icon_style: "Colour".into(),
            menu_transition: "fade".into(),
            load_theme_overrides: "Auto".into(),
            custom_styles: None,
            dark_mode: false,
            enhancer_base_url: "chrome-extension://notion-enhancer/".into(),
            version: "0.11.0".into(),
            agreed_to_terms: None,
            update_available: false,
            panels: DEFAULT_PANELS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl SimSettings {
    /// The settings-store view of these preferences.
    pub fn to_store(&self) -> MemorySettings {
        let store = MemorySettings::new()
            .with("openMenuHotkey", json!(self.open_menu_hotkey))
            .with("menuButtonIconStyle", json!(self.menu_button_icon_style))
            .with("menuTransition", json!(self.menu_transition))
            .with("loadThemeOverrides", json!(self.load_theme_overrides));
        match &self.custom_styles {
            Some(css) => store.with("customStyles", json!({ "content": css })),
            None => store,
        }
    }

    /// The enhancer database, holding the terms version the user agreed to.
    pub fn to_database(&self) -> MemorySettings {
        match &self.agreed_to_terms {
            Some(version) => MemorySettings::new().with("agreedToTerms", json!(version)),
            None => MemorySettings::new(),
        }
    }
}

/// Reads `path` (missing file is fine), then applies environment overrides.
pub fn load_settings(path: &Path) -> SimSettings {
    let file_cfg = fs::read_to_string(path)
        .ok()
        .and_then(|raw| match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(cfg) => Some(cfg),
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring unreadable config file");
                None
            }
        })
        .unwrap_or_default();
    apply_overrides(SimSettings::default(), &file_cfg, |key| std::env::var(key).ok())
}

fn apply_overrides(
    mut settings: SimSettings,
    file_cfg: &HashMap<String, toml::Value>,
    env: impl Fn(&str) -> Option<String>,
) -> SimSettings {
    let file_str = |key: &str| {
        file_cfg
            .get(key)
            .and_then(toml::Value::as_str)
            .map(ToString::to_string)
    };
    let file_bool = |key: &str| file_cfg.get(key).and_then(toml::Value::as_bool);

    if let Some(v) = file_str("open_menu_hotkey") {
        settings.open_menu_hotkey = v;
    }
    if let Some(v) = file_str("menu_button_icon_style") {
        settings.menu_button_icon_style = v;
    }
    if let Some(v) = file_str("menu_transition") {
        settings.menu_transition = v;
    }
    if let Some(v) = file_str("load_theme_overrides") {
        settings.load_theme_overrides = v;
    }
    if let Some(v) = file_str("custom_styles") {
        settings.custom_styles = Some(v);
    }
    if let Some(v) = file_str("enhancer_base_url") {
        settings.enhancer_base_url = v;
    }
    if let Some(v) = file_str("version") {
        settings.version = v;
    }
    if let Some(v) = file_str("agreed_to_terms") {
        settings.agreed_to_terms = Some(v);
    }
    if let Some(v) = file_bool("dark_mode") {
        settings.dark_mode = v;
    }
    if let Some(v) = file_bool("update_available") {
        settings.update_available = v;
    }
    if let Some(panels) = file_cfg.get("panels").and_then(toml::Value::as_array) {
        settings.panels = panels
            .iter()
            .filter_map(toml::Value::as_str)
            .map(ToString::to_string)
            .collect();
    }

    if let Some(v) = env("MENU_HOTKEY") {
        settings.open_menu_hotkey = v;
    }
    if let Some(v) = env("APP__OPEN_MENU_HOTKEY") {
        settings.open_menu_hotkey = v;
    }
    if let Some(v) = env("MENU_TRANSITION") {
        settings.menu_transition = v;
    }
    if let Some(v) = env("APP__MENU_TRANSITION") {
        settings.menu_transition = v;
    }
    if let Some(v) = env("APP__MENU_BUTTON_ICON_STYLE") {
        settings.menu_button_icon_style = v;
    }
    if let Some(v) = env("APP__LOAD_THEME_OVERRIDES") {
        settings.load_theme_overrides = v;
    }
    if let Some(v) = env("MENU_DARK_MODE") {
        match parse_flag(&v) {
            Some(flag) => settings.dark_mode = flag,
            None => warn!(value = %v, "MENU_DARK_MODE is not a boolean; ignoring"),
        }
    }

    settings
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings store key/value pairs, for printing.
pub fn describe(settings: &SimSettings) -> Value {
    json!({
        "settings": settings,
        "store": {
            "openMenuHotkey": settings.open_menu_hotkey,
            "menuButtonIconStyle": settings.menu_button_icon_style,
            "menuTransition": settings.menu_transition,
            "loadThemeOverrides": settings.load_theme_overrides,
        },
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
