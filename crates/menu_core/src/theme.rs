use std::{cell::Cell, rc::Rc};

use serde_json::Value;
use shared::domain::{keys, Theme};

use crate::store::{Store, SubscriptionHandle};

pub const DEFAULT_ACCENT: &str = "rgb(235,87,87)";
pub const DARK_ACCENT: &str = "rgb(180,65,60)";

pub fn accent_for(theme: Option<Theme>) -> &'static str {
    match theme {
        Some(Theme::Dark) => DARK_ACCENT,
        Some(Theme::Light) | None => DEFAULT_ACCENT,
    }
}

/// An accent-coloured element re-rendered whenever the surface theme changes.
pub struct ThemeSwatch {
    accent: Rc<Cell<&'static str>>,
    renders: Rc<Cell<u32>>,
    subscription: SubscriptionHandle,
}

impl ThemeSwatch {
    pub fn mount(store: &Store) -> Self {
        let accent = Rc::new(Cell::new(DEFAULT_ACCENT));
        let renders = Rc::new(Cell::new(0));
        let (sink, counter) = (accent.clone(), renders.clone());
        let subscription = store.subscribe(&[keys::THEME], move |values| {
            let theme = values
                .first()
                .and_then(Option::as_ref)
                .and_then(Value::as_str)
                .and_then(Theme::parse);
            sink.set(accent_for(theme));
            counter.set(counter.get() + 1);
        });
        Self {
            accent,
            renders,
            subscription,
        }
    }

    pub fn accent(&self) -> &'static str {
        self.accent.get()
    }

    pub fn renders(&self) -> u32 {
        self.renders.get()
    }
}

impl Drop for ThemeSwatch {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}
