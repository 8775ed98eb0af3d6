//! Host controller and menu surface wired together on one virtual clock.

use std::{rc::Rc, time::Duration};

use serde::Serialize;
use serde_json::Value;
use shared::{domain::keys, protocol::MenuAction};

use crate::{
    bridge::entangled,
    host::{EventOutcome, HostController, HostEvent},
    scheduler::ManualScheduler,
    surface::MenuSurface,
    view::ViewPhase,
};

#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub id: String,
    pub phase: ViewPhase,
    pub css: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub at_ms: u128,
    pub open: bool,
    pub view: Option<Value>,
    pub transition: Option<Value>,
    pub transition_in_progress: Option<Value>,
    pub theme: Option<Value>,
    pub accent: Option<&'static str>,
    pub panels: Vec<PanelSnapshot>,
}

pub struct MenuSession {
    host: HostController,
    surface: MenuSurface,
    scheduler: Rc<ManualScheduler>,
}

impl MenuSession {
    /// Builds the menu surface for `host`, mounts `panels` plus one theme
    /// swatch, then delivers the frame-load event.
    pub fn connect(
        host: HostController,
        scheduler: Rc<ManualScheduler>,
        panels: &[&str],
    ) -> Self {
        let (host_port, frame_port) = entangled();
        let mut surface = MenuSurface::new(
            frame_port,
            scheduler.clone(),
            host.settings().menu_transition,
        );
        for panel in panels {
            surface.mount_view(*panel);
        }
        surface.mount_swatch();

        let mut session = Self {
            host,
            surface,
            scheduler,
        };
        session.dispatch(HostEvent::FrameLoaded(host_port));
        session
    }

    pub fn host(&self) -> &HostController {
        &self.host
    }

    pub fn surface(&self) -> &MenuSurface {
        &self.surface
    }

    pub fn scheduler(&self) -> &ManualScheduler {
        &self.scheduler
    }

    /// Delivers queued messages both ways until neither side has work left.
    pub fn pump(&mut self) {
        loop {
            let applied = self.surface.pump() + self.host.pump_frame();
            if applied == 0 {
                break;
            }
        }
    }

    pub fn dispatch(&mut self, event: HostEvent) -> EventOutcome {
        let outcome = self.host.handle(event);
        self.pump();
        outcome
    }

    pub fn navigate(&mut self, view: &str) {
        self.surface.navigate(view);
        self.pump();
    }

    /// A control inside the menu asking the host for a state change.
    pub fn request(&mut self, action: MenuAction) {
        self.surface.request(action);
        self.pump();
    }

    pub fn advance(&mut self, by: Duration) {
        self.scheduler.advance(by);
        self.pump();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let store = self.surface.store();
        SessionSnapshot {
            at_ms: self.scheduler.now().as_millis(),
            open: self.host.is_open(),
            view: store.get_one(keys::VIEW),
            transition: store.get_one(keys::TRANSITION),
            transition_in_progress: store.get_one(keys::TRANSITION_IN_PROGRESS),
            theme: store.get_one(keys::THEME),
            accent: self.surface.swatches().first().map(|swatch| swatch.accent()),
            panels: self
                .surface
                .views()
                .iter()
                .map(|view| PanelSnapshot {
                    id: view.id().to_string(),
                    phase: view.phase(),
                    css: view.style().css(),
                })
                .collect(),
        }
    }
}
