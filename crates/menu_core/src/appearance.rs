//! Host-page styling applied once before the menu is wired up.

use anyhow::{Context, Result};
use futures::future::try_join_all;
use shared::domain::ThemeOverrides;
use tracing::info;

use crate::{
    capabilities::{EnhancerUrls, HostDocument, ModRegistry},
    config::MenuSettings,
};

pub const THEME_CATEGORY: &str = "themes";
pub const THEME_OVERRIDES_PATH: &str = "core/theme.css";

pub async fn should_load_theme_overrides(
    settings: &MenuSettings,
    mods: &dyn ModRegistry,
) -> Result<bool> {
    match settings.load_theme_overrides {
        ThemeOverrides::Enabled => Ok(true),
        ThemeOverrides::Disabled => Ok(false),
        ThemeOverrides::Auto => {
            let themes = mods
                .get_mods(THEME_CATEGORY)
                .await
                .context("failed to list theme mods")?;
            let enabled = try_join_all(themes.iter().map(|theme| mods.is_enabled(&theme.id)))
                .await
                .context("failed to check theme mod state")?;
            Ok(enabled.into_iter().any(|on| on))
        }
    }
}

/// Injects the theme override stylesheet and the user's custom styles.
/// Returns whether the overrides were loaded.
pub async fn apply_appearance(
    settings: &MenuSettings,
    mods: &dyn ModRegistry,
    document: &dyn HostDocument,
    urls: &EnhancerUrls,
) -> Result<bool> {
    let overrides = should_load_theme_overrides(settings, mods).await?;
    if overrides {
        let href = urls.enhancer_url(THEME_OVERRIDES_PATH)?;
        info!(%href, "loading theme overrides");
        document.append_stylesheet(&href);
    }
    if let Some(css) = &settings.custom_styles {
        document.append_style(css);
    }
    Ok(overrides)
}
