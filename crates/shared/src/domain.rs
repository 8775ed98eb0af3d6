use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Panel shown when the `view` key has never been written.
pub const DEFAULT_VIEW: &str = "welcome";

/// Names of the keys the menu surface keeps in its reactive store.
pub mod keys {
    pub const VIEW: &str = "view";
    pub const TRANSITION: &str = "transition";
    pub const TRANSITION_IN_PROGRESS: &str = "transitionInProgress";
    pub const THEME: &str = "theme";
    pub const HOTKEY: &str = "hotkey";
    pub const ICON: &str = "icon";
}

/// Identifier of one menu panel. Matched case-insensitively against `view`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, view: &str) -> bool {
        self.0.to_lowercase() == view.to_lowercase()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Animation policy applied uniformly to every panel switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionMode {
    #[default]
    None,
    Fade,
    SlideToLeft,
    SlideToRight,
}

impl TransitionMode {
    pub const FADE_DURATION: Duration = Duration::from_millis(100);
    pub const SLIDE_DURATION: Duration = Duration::from_millis(200);

    /// Unknown names fall back to `None`, matching an unset transition.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(Self::None),
            "fade" => Some(Self::Fade),
            "slide-to-left" => Some(Self::SlideToLeft),
            "slide-to-right" => Some(Self::SlideToRight),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fade => "fade",
            Self::SlideToLeft => "slide-to-left",
            Self::SlideToRight => "slide-to-right",
        }
    }

    /// `None` for the immediate mode.
    pub fn duration(self) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fade => Some(Self::FADE_DURATION),
            Self::SlideToLeft | Self::SlideToRight => Some(Self::SLIDE_DURATION),
        }
    }

    pub fn is_slide(self) -> bool {
        matches!(self, Self::SlideToLeft | Self::SlideToRight)
    }

    /// Horizontal offset (percent of panel width) an outgoing panel slides to.
    pub fn exit_offset(self) -> f32 {
        match self {
            Self::SlideToRight => -100.0,
            Self::SlideToLeft => 100.0,
            Self::None | Self::Fade => 0.0,
        }
    }

    /// Horizontal offset an incoming panel starts from.
    pub fn entry_offset(self) -> f32 {
        -self.exit_offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IconStyle {
    #[default]
    Colour,
    Monochrome,
}

impl IconStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Colour" => Some(Self::Colour),
            "Monochrome" => Some(Self::Monochrome),
            _ => None,
        }
    }
}

/// When the bundled theme override stylesheet gets injected into the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThemeOverrides {
    #[default]
    Auto,
    Enabled,
    Disabled,
}

impl ThemeOverrides {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Auto" => Some(Self::Auto),
            "Enabled" => Some(Self::Enabled),
            "Disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}
