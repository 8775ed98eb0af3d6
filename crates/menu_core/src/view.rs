//! Per-panel visibility state machine.
//!
//! Each [`View`] watches the `view` key and animates its own panel in or out
//! according to the `transition` mode read at the moment of the switch. The
//! panel's rendered [`PanelStyle`] is the source of truth for whether it is
//! currently shown.

use std::{
    cell::{Cell, RefCell},
    fmt::Write as _,
    rc::Rc,
    time::Duration,
};

use serde::Serialize;
use serde_json::Value;
use shared::domain::{keys, TransitionMode, ViewId, DEFAULT_VIEW};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    scheduler::Scheduler,
    store::{Store, SubscriptionHandle},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelDisplay {
    Shown,
    Hidden,
}

/// Animated properties and their duration, as applied to the panel container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleTransition {
    pub duration: Duration,
    pub transform: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelStyle {
    pub display: PanelDisplay,
    pub opacity: f32,
    pub offset_percent: f32,
    pub transition: Option<StyleTransition>,
}

impl PanelStyle {
    fn hidden() -> Self {
        Self {
            display: PanelDisplay::Hidden,
            opacity: 0.0,
            offset_percent: 0.0,
            transition: None,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.display == PanelDisplay::Shown
    }

    /// Inline CSS equivalent of this style.
    pub fn css(&self) -> String {
        let mut css = String::new();
        if self.display == PanelDisplay::Hidden {
            css.push_str("display: none; ");
        }
        let _ = write!(css, "opacity: {};", self.opacity);
        if self.offset_percent != 0.0 {
            let _ = write!(css, " transform: translateX({}%);", self.offset_percent);
        }
        if let Some(transition) = self.transition {
            let ms = transition.duration.as_millis();
            if transition.transform {
                let _ = write!(css, " transition: opacity {ms}ms, transform {ms}ms;");
            } else {
                let _ = write!(css, " transition: opacity {ms}ms;");
            }
        }
        css
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPhase {
    Hidden,
    Appearing,
    Visible,
    Disappearing,
}

struct ViewInner {
    id: ViewId,
    store: Store,
    scheduler: Rc<dyn Scheduler>,
    style: RefCell<PanelStyle>,
    phase: Cell<ViewPhase>,
    // last computed active/inactive target, `None` until the first notification
    target: Cell<Option<bool>>,
    pending: RefCell<CancellationToken>,
}

/// One menu panel bound to the store's `view` key.
pub struct View {
    inner: Rc<ViewInner>,
    subscription: SubscriptionHandle,
}

impl View {
    /// Mounts a hidden panel and subscribes it to `view`. The first
    /// notification settles the panel without animating.
    pub fn mount(id: ViewId, store: &Store, scheduler: Rc<dyn Scheduler>) -> Self {
        let inner = Rc::new(ViewInner {
            id,
            store: store.clone(),
            scheduler,
            style: RefCell::new(PanelStyle::hidden()),
            phase: Cell::new(ViewPhase::Hidden),
            target: Cell::new(None),
            pending: RefCell::new(CancellationToken::new()),
        });

        let weak = Rc::downgrade(&inner);
        let subscription = store.subscribe(&[keys::VIEW], move |values| {
            if let Some(inner) = weak.upgrade() {
                inner.on_view(values.first().and_then(Option::as_ref));
            }
        });

        Self {
            inner,
            subscription,
        }
    }

    pub fn id(&self) -> &ViewId {
        &self.inner.id
    }

    pub fn style(&self) -> PanelStyle {
        self.inner.style.borrow().clone()
    }

    pub fn phase(&self) -> ViewPhase {
        self.inner.phase.get()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.style.borrow().is_shown()
    }
}

impl Drop for View {
    fn drop(&mut self) {
        self.subscription.cancel();
        self.inner.pending.borrow().cancel();
    }
}

impl ViewInner {
    fn on_view(self: &Rc<Self>, view: Option<&Value>) {
        let view = view.and_then(Value::as_str).unwrap_or(DEFAULT_VIEW);
        let mode = self
            .store
            .get_one(keys::TRANSITION)
            .as_ref()
            .and_then(Value::as_str)
            .and_then(TransitionMode::parse)
            .unwrap_or_default();
        let now_active = self.id.matches(view);

        let first = match self.target.replace(Some(now_active)) {
            Some(previous) if previous == now_active => return,
            Some(_) => false,
            None => true,
        };
        let token = self.restart();

        let duration = match mode.duration() {
            Some(duration) if !first => duration,
            _ => {
                self.settle(now_active);
                return;
            }
        };

        let is_visible = self.style.borrow().is_shown();
        debug!(
            view = %self.id,
            mode = mode.as_str(),
            is_visible,
            now_active,
            "view target changed"
        );
        match (is_visible, now_active) {
            (true, false) => self.leave(mode, duration, &token),
            (false, false) => self.phase.set(ViewPhase::Hidden),
            (true, true) => self.resume(mode, duration, &token),
            (false, true) => self.enter(mode, duration, &token),
        }
    }

    /// Cancels whatever the previous transition left scheduled.
    fn restart(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self.pending.replace(token.clone());
        previous.cancel();
        token
    }

    fn settle(&self, active: bool) {
        *self.style.borrow_mut() = PanelStyle {
            display: if active { PanelDisplay::Shown } else { PanelDisplay::Hidden },
            opacity: if active { 1.0 } else { 0.0 },
            offset_percent: 0.0,
            transition: None,
        };
        self.phase.set(if active {
            ViewPhase::Visible
        } else {
            ViewPhase::Hidden
        });
        if active && self.in_progress() {
            self.store
                .set_one(keys::TRANSITION_IN_PROGRESS, Value::Bool(false));
        }
    }

    fn leave(
        self: &Rc<Self>,
        mode: TransitionMode,
        duration: Duration,
        token: &CancellationToken,
    ) {
        self.store
            .set_one(keys::TRANSITION_IN_PROGRESS, Value::Bool(true));
        self.phase.set(ViewPhase::Disappearing);
        {
            let mut style = self.style.borrow_mut();
            style.transition = Some(StyleTransition {
                duration,
                transform: mode.is_slide(),
            });
            style.opacity = 0.0;
            if mode.is_slide() {
                style.offset_percent = mode.exit_offset();
            }
        }
        self.after(duration, token, |view, _| {
            {
                let mut style = view.style.borrow_mut();
                style.display = PanelDisplay::Hidden;
                style.offset_percent = 0.0;
            }
            view.phase.set(ViewPhase::Hidden);
            debug!(view = %view.id, "view hidden");
        });
    }

    fn enter(
        self: &Rc<Self>,
        mode: TransitionMode,
        duration: Duration,
        token: &CancellationToken,
    ) {
        self.phase.set(ViewPhase::Appearing);
        if mode.is_slide() {
            *self.style.borrow_mut() = PanelStyle {
                display: PanelDisplay::Shown,
                opacity: 0.0,
                offset_percent: mode.entry_offset(),
                transition: None,
            };
            self.when_idle(token, move |view, token| view.fade_in(mode, duration, token));
        } else {
            // outgoing panels get `duration` to clear before this one unhides
            self.after(duration, token, move |view, token| {
                {
                    let mut style = view.style.borrow_mut();
                    style.opacity = 0.0;
                    style.display = PanelDisplay::Shown;
                }
                view.when_idle(token, move |view, token| view.fade_in(mode, duration, token));
            });
        }
    }

    /// Re-activated while still shown, e.g. mid-exit: animate back from the
    /// current rendered state.
    fn resume(
        self: &Rc<Self>,
        mode: TransitionMode,
        duration: Duration,
        token: &CancellationToken,
    ) {
        self.phase.set(ViewPhase::Appearing);
        self.when_idle(token, move |view, token| view.fade_in(mode, duration, token));
    }

    fn fade_in(
        self: &Rc<Self>,
        mode: TransitionMode,
        duration: Duration,
        token: &CancellationToken,
    ) {
        {
            let mut style = self.style.borrow_mut();
            style.transition = Some(StyleTransition {
                duration,
                transform: mode.is_slide(),
            });
            style.offset_percent = 0.0;
            style.opacity = 1.0;
        }
        // flag clears only once the entrance animation has visually finished
        self.after(duration, token, |view, _| {
            view.phase.set(ViewPhase::Visible);
            view.store
                .set_one(keys::TRANSITION_IN_PROGRESS, Value::Bool(false));
            debug!(view = %view.id, "view settled");
        });
    }

    fn in_progress(&self) -> bool {
        matches!(
            self.store.get_one(keys::TRANSITION_IN_PROGRESS),
            Some(Value::Bool(true))
        )
    }

    fn after<F>(self: &Rc<Self>, delay: Duration, token: &CancellationToken, step: F)
    where
        F: FnOnce(&Rc<Self>, &CancellationToken) + 'static,
    {
        let weak = Rc::downgrade(self);
        let next = token.clone();
        self.scheduler.schedule_after(
            delay,
            token,
            Box::new(move || {
                if let Some(view) = weak.upgrade() {
                    step(&view, &next);
                }
            }),
        );
    }

    fn when_idle<F>(self: &Rc<Self>, token: &CancellationToken, step: F)
    where
        F: FnOnce(&Rc<Self>, &CancellationToken) + 'static,
    {
        let weak = Rc::downgrade(self);
        let next = token.clone();
        self.scheduler.schedule_idle(
            token,
            Box::new(move || {
                if let Some(view) = weak.upgrade() {
                    step(&view, &next);
                }
            }),
        );
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
