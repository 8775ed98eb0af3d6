//! The embedded menu surface: owns its store, its panels and its end of the
//! host message port.

use std::rc::Rc;

use serde_json::Value;
use shared::{
    domain::{keys, TransitionMode, ViewId, DEFAULT_VIEW},
    protocol::{MenuAction, MenuMessage, ThemeSync},
};
use tracing::{debug, trace, warn};

use crate::{
    bridge::MessagePort,
    scheduler::Scheduler,
    store::Store,
    theme::ThemeSwatch,
    view::View,
};

pub struct MenuSurface {
    store: Store,
    scheduler: Rc<dyn Scheduler>,
    port: MessagePort,
    views: Vec<View>,
    swatches: Vec<ThemeSwatch>,
}

impl MenuSurface {
    /// Creates the surface store, seeded with the starting view and the
    /// configured transition mode.
    pub fn new(
        port: MessagePort,
        scheduler: Rc<dyn Scheduler>,
        transition: TransitionMode,
    ) -> Self {
        let store = Store::new();
        store.set([
            (keys::VIEW, Value::from(DEFAULT_VIEW)),
            (keys::TRANSITION, Value::from(transition.as_str())),
            (keys::TRANSITION_IN_PROGRESS, Value::Bool(false)),
        ]);
        Self {
            store,
            scheduler,
            port,
            views: Vec::new(),
            swatches: Vec::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mounts a panel after the existing ones; it renders in `views()` order.
    pub fn mount_view(&mut self, id: impl Into<String>) {
        let view = View::mount(ViewId::new(id), &self.store, self.scheduler.clone());
        self.views.push(view);
    }

    pub fn view(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|view| view.id().as_str() == id)
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn mount_swatch(&mut self) {
        self.swatches.push(ThemeSwatch::mount(&self.store));
    }

    pub fn swatches(&self) -> &[ThemeSwatch] {
        &self.swatches
    }

    pub fn navigate(&self, view: &str) {
        self.store.set_one(keys::VIEW, Value::from(view));
    }

    pub fn set_transition(&self, mode: TransitionMode) {
        self.store.set_one(keys::TRANSITION, Value::from(mode.as_str()));
    }

    /// False while any panel handoff is still animating.
    pub fn is_settled(&self) -> bool {
        !matches!(
            self.store.get_one(keys::TRANSITION_IN_PROGRESS),
            Some(Value::Bool(true))
        )
    }

    /// Asks the host to open or close the modal.
    pub fn request(&self, action: MenuAction) -> bool {
        debug!(?action, "requesting host action");
        self.port.post(MenuMessage::Action(action).to_envelope())
    }

    /// Handles every message the host has queued so far. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let messages = self.port.drain();
        messages
            .iter()
            .filter(|message| self.receive(message))
            .count()
    }

    pub async fn pump_next(&mut self) -> Option<bool> {
        let message = self.port.recv().await?;
        Some(self.receive(&message))
    }

    /// Validates one raw message and applies it. Returns whether it changed state.
    pub fn receive(&self, raw: &Value) -> bool {
        match MenuMessage::decode(raw) {
            Ok(MenuMessage::Sync(sync)) => {
                self.apply_sync(&sync);
                true
            }
            Ok(MenuMessage::Action(action)) => {
                trace!(?action, "ignoring host-bound action on menu surface");
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

    fn apply_sync(&self, sync: &ThemeSync) {
        debug!(theme = sync.theme.as_str(), "theme sync from host");
        self.store.set([
            (keys::THEME, Value::from(sync.theme.as_str())),
            (keys::HOTKEY, Value::from(sync.hotkey.as_str())),
            (
                keys::ICON,
                serde_json::to_value(sync.icon).unwrap_or(Value::Null),
            ),
        ]);
    }
}

#[cfg(test)]
#[path = "tests/surface_tests.rs"]
mod tests;
