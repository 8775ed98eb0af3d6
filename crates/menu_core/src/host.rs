//! Host-page side of the menu: the modal, the launcher and the triggers
//! that open or close the menu.

use std::rc::Rc;

use anyhow::{Context, Result};
use serde_json::Value;
use shared::{
    domain::{IconStyle, Theme},
    protocol::{IpcMessage, MenuAction, MenuMessage, ThemeSync, IPC_CHANNEL},
};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::{
    appearance::apply_appearance,
    bridge::MessagePort,
    capabilities::{
        EnhancerUrls, HostDocument, Ipc, Launcher, ModRegistry, SettingsStore, UpdateChecker,
    },
    config::{load_menu_settings, MenuSettings},
};

pub const ESCAPE: &str = "Escape";
pub const MENU_PAGE_PATH: &str = "core/menu/index.html";

/// Everything the host controller consumes from the enhancer runtime.
pub struct HostCapabilities {
    pub settings: Rc<dyn SettingsStore>,
    /// The enhancer's own database, read once at start for the terms flag.
    pub database: Rc<dyn SettingsStore>,
    pub mods: Rc<dyn ModRegistry>,
    pub document: Rc<dyn HostDocument>,
    pub ipc: Rc<dyn Ipc>,
    pub updates: Rc<dyn UpdateChecker>,
    pub urls: EnhancerUrls,
    pub version: String,
}

pub enum HostEvent {
    KeyPress { combo: String },
    WindowFocused,
    /// The host body changed, possibly switching light/dark mode.
    BodyMutated,
    /// The host re-rendered its navigation area.
    NavigationRegenerated,
    FrameLoaded(MessagePort),
    LauncherClicked,
    BackdropClicked,
    Ipc { channel: String, payload: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Handled,
    /// Handled, and the host's own handling of the key must be suppressed.
    PreventDefault,
    Ignored,
}

pub struct HostController {
    document: Rc<dyn HostDocument>,
    settings: MenuSettings,
    launcher: Launcher,
    frame_src: Option<Url>,
    frame: Option<MessagePort>,
    modal_open: bool,
    last_theme: Option<Theme>,
    theme_overrides_loaded: bool,
    telemetry_permitted: bool,
}

impl HostController {
    /// Loads menu settings, styles the host page, injects the launcher and
    /// reports `load-complete` to the background coordinator.
    pub async fn start(caps: HostCapabilities) -> Result<Self> {
        let settings = load_menu_settings(caps.settings.as_ref()).await?;
        let theme_overrides_loaded = apply_appearance(
            &settings,
            caps.mods.as_ref(),
            caps.document.as_ref(),
            &caps.urls,
        )
        .await?;
        let update_available = caps
            .updates
            .update_available()
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "update check failed");
                false
            });

        let mut controller = Self::new(caps.document.clone(), settings, update_available);
        controller.theme_overrides_loaded = theme_overrides_loaded;
        controller.frame_src = Some(caps.urls.enhancer_url(MENU_PAGE_PATH)?);
        controller.reconcile_launcher();

        caps.ipc
            .send_message(IPC_CHANNEL, IpcMessage::LoadComplete.to_value());

        let agreed = caps
            .database
            .get("agreedToTerms")
            .await
            .context("failed to read 'agreedToTerms' from the enhancer database")?;
        controller.telemetry_permitted =
            agreed.as_ref().and_then(Value::as_str) == Some(caps.version.as_str());

        info!(
            hotkey = %controller.settings.open_menu_hotkey,
            theme_overrides_loaded,
            update_available,
            "menu host ready"
        );
        Ok(controller)
    }

    pub fn new(
        document: Rc<dyn HostDocument>,
        settings: MenuSettings,
        update_available: bool,
    ) -> Self {
        let launcher = Launcher {
            label: "notion-enhancer".into(),
            icon: match settings.menu_button_icon_style {
                IconStyle::Monochrome => "notion-enhancer?mask".into(),
                IconStyle::Colour => "notion-enhancer".into(),
            },
            notifications: u32::from(update_available),
        };
        Self {
            document,
            settings,
            launcher,
            frame_src: None,
            frame: None,
            modal_open: false,
            last_theme: None,
            theme_overrides_loaded: false,
            telemetry_permitted: false,
        }
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    /// Page the menu frame loads, resolved against the enhancer base url.
    pub fn frame_src(&self) -> Option<&Url> {
        self.frame_src.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.modal_open
    }

    pub fn frame_attached(&self) -> bool {
        self.frame.is_some()
    }

    pub fn theme_overrides_loaded(&self) -> bool {
        self.theme_overrides_loaded
    }

    pub fn telemetry_permitted(&self) -> bool {
        self.telemetry_permitted
    }

    pub fn open_menu(&mut self) {
        self.update_theme(true);
        if !self.modal_open {
            debug!("opening menu");
        }
        self.modal_open = true;
        if self.frame.is_some() {
            self.document.focus_menu_frame();
        }
    }

    pub fn close_menu(&mut self) {
        if self.modal_open {
            debug!("closing menu");
        }
        self.modal_open = false;
    }

    /// Pushes host theme state into the menu surface when light/dark mode
    /// changed since the last push, or unconditionally with `force`.
    /// Returns whether a message was posted.
    pub fn update_theme(&mut self, force: bool) -> bool {
        let theme = Theme::from_dark_mode(self.document.is_dark_mode());
        if self.last_theme == Some(theme) && !force {
            return false;
        }
        self.last_theme = Some(theme);

        let Some(frame) = &self.frame else {
            trace!("menu frame not loaded; theme sync dropped");
            return false;
        };
        let message = MenuMessage::Sync(ThemeSync {
            hotkey: self.settings.open_menu_hotkey.clone(),
            theme,
            icon: self.settings.menu_button_icon_style,
        });
        frame.post(message.to_envelope())
    }

    /// Connects the loaded menu frame. The surface renders on its first sync.
    pub fn attach_frame(&mut self, port: MessagePort) {
        self.frame = Some(port);
        self.update_theme(true);
    }

    /// Re-inserts the launcher if the host dropped it. Returns whether an
    /// attach happened.
    pub fn reconcile_launcher(&self) -> bool {
        if self.document.launcher_attached() {
            return false;
        }
        let attached = self.document.attach_launcher(&self.launcher);
        if !attached {
            trace!("navigation area missing; launcher not attached");
        }
        attached
    }

    /// Handles actions the menu surface has queued for the host.
    pub fn pump_frame(&mut self) -> usize {
        let messages = match self.frame.as_mut() {
            Some(frame) => frame.drain(),
            None => return 0,
        };
        messages
            .iter()
            .filter(|message| self.handle_frame_message(message))
            .count()
    }

    pub fn handle_frame_message(&mut self, raw: &Value) -> bool {
        match MenuMessage::decode(raw) {
            Ok(MenuMessage::Action(MenuAction::OpenMenu)) => {
                self.open_menu();
                true
            }
            Ok(MenuMessage::Action(MenuAction::CloseMenu)) => {
                self.close_menu();
                true
            }
            Ok(MenuMessage::Sync(_)) => {
                trace!("ignoring surface-bound theme sync on host");
                false
            }
            Err(err) if err.is_foreign() => {
                trace!(%err, "ignoring foreign message");
                false
            }
            Err(err) => {
                warn!(%err, "dropping malformed menu message");
                false
            }
        }
    }

    pub fn handle(&mut self, event: HostEvent) -> EventOutcome {
        match event {
            HostEvent::KeyPress { combo } => {
                if combo.eq_ignore_ascii_case(&self.settings.open_menu_hotkey) {
                    self.open_menu();
                    EventOutcome::PreventDefault
                } else if combo == ESCAPE {
                    if self.document.text_input_focused() {
                        return EventOutcome::Ignored;
                    }
                    self.close_menu();
                    EventOutcome::Handled
                } else {
                    EventOutcome::Ignored
                }
            }
            HostEvent::WindowFocused => {
                self.update_theme(true);
                EventOutcome::Handled
            }
            HostEvent::BodyMutated => {
                if self.modal_open {
                    self.update_theme(false);
                }
                EventOutcome::Handled
            }
            HostEvent::NavigationRegenerated => {
                self.reconcile_launcher();
                EventOutcome::Handled
            }
            HostEvent::FrameLoaded(port) => {
                self.attach_frame(port);
                EventOutcome::Handled
            }
            HostEvent::LauncherClicked => {
                self.open_menu();
                EventOutcome::Handled
            }
            HostEvent::BackdropClicked => {
                self.close_menu();
                EventOutcome::Handled
            }
            HostEvent::Ipc { channel, payload } => {
                if channel == IPC_CHANNEL
                    && IpcMessage::parse(&payload) == Some(IpcMessage::OpenMenu)
                {
                    self.open_menu();
                    EventOutcome::Handled
                } else {
                    EventOutcome::Ignored
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod tests;
