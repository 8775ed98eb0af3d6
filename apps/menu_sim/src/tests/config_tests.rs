use super::{apply_overrides, load_settings, parse_flag, SimSettings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_config_file_yields_defaults() {
    let settings = apply_overrides(SimSettings::default(), &HashMap::new(), no_env);
    assert_eq!(settings, SimSettings::default());
}

#[test]
fn file_values_override_defaults_and_env_overrides_file() {
    let file_cfg: HashMap<String, toml::Value> = toml::from_str(
        r#"
        open_menu_hotkey = "Alt+M"
        menu_transition = "slide-to-left"
        dark_mode = true
        panels = ["welcome", "core"]
        "#,
    )
    .expect("toml");

    let settings = apply_overrides(SimSettings::default(), &file_cfg, |key| match key {
        "APP__MENU_TRANSITION" => Some("none".to_string()),
        "MENU_DARK_MODE" => Some("off".to_string()),
        _ => None,
    });

    assert_eq!(settings.open_menu_hotkey, "Alt+M");
    assert_eq!(settings.menu_transition, "none");
    assert!(!settings.dark_mode);
    assert_eq!(settings.panels, vec!["welcome".to_string(), "core".to_string()]);
}

#[test]
fn unparseable_env_flag_is_ignored() {
    let settings = apply_overrides(SimSettings::default(), &HashMap::new(), |key| {
        (key == "MENU_DARK_MODE").then(|| "maybe".to_string())
    });
    assert!(!settings.dark_mode);
    assert_eq!(parse_flag(" Yes "), Some(true));
    assert_eq!(parse_flag("maybe"), None);
}

#[test]
fn loads_settings_from_a_toml_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("menu_sim_config_test_{suffix}.toml"));
    fs::write(&path, "menu_button_icon_style = \"Monochrome\"\nupdate_available = true\n")
        .expect("write config");

    let settings = load_settings(&path);
    assert_eq!(settings.menu_button_icon_style, "Monochrome");
    assert!(settings.update_available);

    fs::remove_file(path).expect("cleanup");
}

#[tokio::test]
async fn settings_store_carries_custom_styles_content() {
    use menu_core::capabilities::SettingsStore;

    let settings = SimSettings {
        custom_styles: Some("body { color: red; }".into()),
        ..SimSettings::default()
    };
    let store = settings.to_store();
    let custom = store.get("customStyles").await.expect("get");
    assert_eq!(
        custom,
        Some(serde_json::json!({ "content": "body { color: red; }" }))
    );
}

#[tokio::test]
async fn terms_agreement_lives_in_the_database_view_only() {
    use menu_core::capabilities::SettingsStore;

    let file_cfg: HashMap<String, toml::Value> =
        toml::from_str("agreed_to_terms = \"0.11.0\"").expect("toml");
    let settings = apply_overrides(SimSettings::default(), &file_cfg, no_env);

    let database = settings.to_database();
    assert_eq!(
        database.get("agreedToTerms").await.expect("get"),
        Some(serde_json::json!("0.11.0"))
    );
    let store = settings.to_store();
    assert_eq!(store.get("agreedToTerms").await.expect("get"), None);
}
