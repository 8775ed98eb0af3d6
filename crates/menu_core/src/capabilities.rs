//! Capabilities the menu consumes from the surrounding enhancer runtime,
//! plus in-memory implementations used by the simulator and tests.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[async_trait(?Send)]
pub trait SettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModSummary {
    pub id: String,
    pub name: String,
}

#[async_trait(?Send)]
pub trait ModRegistry {
    async fn get_mods(&self, category: &str) -> Result<Vec<ModSummary>>;
    async fn is_enabled(&self, mod_id: &str) -> Result<bool>;
}

#[async_trait(?Send)]
pub trait UpdateChecker {
    async fn update_available(&self) -> Result<bool>;
}

/// The launcher control injected into the host's navigation area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Launcher {
    pub label: String,
    pub icon: String,
    pub notifications: u32,
}

/// Read/write access to the host page the enhancer runs in.
pub trait HostDocument {
    fn is_dark_mode(&self) -> bool;
    fn text_input_focused(&self) -> bool;
    fn launcher_attached(&self) -> bool;
    /// Returns false when the navigation area does not exist yet.
    fn attach_launcher(&self, launcher: &Launcher) -> bool;
    fn focus_menu_frame(&self);
    fn append_stylesheet(&self, href: &Url);
    fn append_style(&self, css: &str);
}

pub trait Ipc {
    fn send_message(&self, channel: &str, payload: Value);
}

/// Resolves paths of assets bundled with the enhancer.
#[derive(Debug, Clone)]
pub struct EnhancerUrls {
    base: Url,
}

impl EnhancerUrls {
    pub fn new(base: &str) -> Result<Self> {
        let mut base =
            Url::parse(base).with_context(|| format!("invalid enhancer base url '{base}'"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn enhancer_url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("failed to resolve enhancer asset '{path}'"))
    }
}

#[derive(Default)]
pub struct MemorySettings {
    values: RefCell<HashMap<String, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: Value) -> Self {
        self.values.borrow_mut().insert(key.to_string(), value);
        self
    }
}

#[async_trait(?Send)]
impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Default)]
pub struct StaticMods {
    mods: HashMap<String, Vec<ModSummary>>,
    enabled: HashMap<String, bool>,
}

impl StaticMods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mod(mut self, category: &str, id: &str, enabled: bool) -> Self {
        self.mods
            .entry(category.to_string())
            .or_default()
            .push(ModSummary {
                id: id.to_string(),
                name: id.to_string(),
            });
        self.enabled.insert(id.to_string(), enabled);
        self
    }
}

#[async_trait(?Send)]
impl ModRegistry for StaticMods {
    async fn get_mods(&self, category: &str) -> Result<Vec<ModSummary>> {
        Ok(self.mods.get(category).cloned().unwrap_or_default())
    }

    async fn is_enabled(&self, mod_id: &str) -> Result<bool> {
        Ok(self.enabled.get(mod_id).copied().unwrap_or(false))
    }
}

pub struct FixedUpdate(pub bool);

#[async_trait(?Send)]
impl UpdateChecker for FixedUpdate {
    async fn update_available(&self) -> Result<bool> {
        Ok(self.0)
    }
}

/// Records every payload sent, keyed by channel.
#[derive(Default)]
pub struct RecordingIpc {
    sent: RefCell<Vec<(String, Value)>>,
}

impl RecordingIpc {
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.borrow().clone()
    }
}

impl Ipc for RecordingIpc {
    fn send_message(&self, channel: &str, payload: Value) {
        self.sent.borrow_mut().push((channel.to_string(), payload));
    }
}

/// In-memory host page. The host re-renders its navigation area at will,
/// which drops an attached launcher.
pub struct SimulatedDocument {
    dark: Cell<bool>,
    text_input_focused: Cell<bool>,
    navigation_present: Cell<bool>,
    launcher: RefCell<Option<Launcher>>,
    frame_focus_count: Cell<u32>,
    stylesheets: RefCell<Vec<Url>>,
    styles: RefCell<Vec<String>>,
}

impl Default for SimulatedDocument {
    fn default() -> Self {
        Self {
            dark: Cell::new(false),
            text_input_focused: Cell::new(false),
            navigation_present: Cell::new(true),
            launcher: RefCell::new(None),
            frame_focus_count: Cell::new(0),
            stylesheets: RefCell::new(Vec::new()),
            styles: RefCell::new(Vec::new()),
        }
    }
}

impl SimulatedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dark_mode(&self, dark: bool) {
        self.dark.set(dark);
    }

    pub fn set_text_input_focused(&self, focused: bool) {
        self.text_input_focused.set(focused);
    }

    pub fn set_navigation_present(&self, present: bool) {
        self.navigation_present.set(present);
        if !present {
            self.launcher.borrow_mut().take();
        }
    }

    /// Rebuilds the navigation area, discarding anything injected into it.
    pub fn regenerate_navigation(&self) {
        self.launcher.borrow_mut().take();
    }

    pub fn launcher(&self) -> Option<Launcher> {
        self.launcher.borrow().clone()
    }

    pub fn frame_focus_count(&self) -> u32 {
        self.frame_focus_count.get()
    }

    pub fn stylesheets(&self) -> Vec<Url> {
        self.stylesheets.borrow().clone()
    }

    pub fn styles(&self) -> Vec<String> {
        self.styles.borrow().clone()
    }
}

impl HostDocument for SimulatedDocument {
    fn is_dark_mode(&self) -> bool {
        self.dark.get()
    }

    fn text_input_focused(&self) -> bool {
        self.text_input_focused.get()
    }

    fn launcher_attached(&self) -> bool {
        self.launcher.borrow().is_some()
    }

    fn attach_launcher(&self, launcher: &Launcher) -> bool {
        if !self.navigation_present.get() {
            return false;
        }
        *self.launcher.borrow_mut() = Some(launcher.clone());
        true
    }

    fn focus_menu_frame(&self) {
        self.frame_focus_count.set(self.frame_focus_count.get() + 1);
    }

    fn append_stylesheet(&self, href: &Url) {
        self.stylesheets.borrow_mut().push(href.clone());
    }

    fn append_style(&self, css: &str) {
        self.styles.borrow_mut().push(css.to_string());
    }
}
