use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{IconStyle, Theme},
    error::ProtocolError,
};

/// Namespace tag every menu envelope carries; anything else on the channel is foreign.
pub const NAMESPACE: &str = "notion-enhancer";
/// Inter-process channel shared with the background coordinator.
pub const IPC_CHANNEL: &str = "notion-enhancer";

/// Host-level state change requested by the menu surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuAction {
    OpenMenu,
    CloseMenu,
}

/// Host state pushed into the menu surface whenever the menu opens or the
/// host switches between light and dark mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSync {
    pub hotkey: String,
    pub theme: Theme,
    pub icon: IconStyle,
}

/// A validated cross-surface message. `action` is the discriminant on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuMessage {
    Sync(ThemeSync),
    Action(MenuAction),
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<MenuAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hotkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<IconStyle>,
}

impl MenuMessage {
    pub fn to_envelope(&self) -> Value {
        let envelope = match self {
            Self::Sync(sync) => Envelope {
                namespace: NAMESPACE.to_string(),
                action: None,
                hotkey: Some(sync.hotkey.clone()),
                theme: Some(sync.theme),
                icon: Some(sync.icon),
            },
            Self::Action(action) => Envelope {
                namespace: NAMESPACE.to_string(),
                action: Some(*action),
                hotkey: None,
                theme: None,
                icon: None,
            },
        };
        serde_json::to_value(envelope).unwrap_or(Value::Null)
    }

    pub fn decode(raw: &Value) -> Result<Self, ProtocolError> {
        let object = raw.as_object().ok_or(ProtocolError::NotAnObject)?;
        match object.get("namespace").and_then(Value::as_str) {
            Some(NAMESPACE) => {}
            other => {
                return Err(ProtocolError::ForeignNamespace(
                    other.map(ToString::to_string),
                ))
            }
        }

        let envelope: Envelope = serde_json::from_value(raw.clone())?;
        if let Some(action) = envelope.action {
            return Ok(Self::Action(action));
        }
        if envelope.hotkey.is_none() && envelope.theme.is_none() && envelope.icon.is_none() {
            return Err(ProtocolError::Empty);
        }

        Ok(Self::Sync(ThemeSync {
            hotkey: envelope.hotkey.ok_or(ProtocolError::MissingField("hotkey"))?,
            theme: envelope.theme.ok_or(ProtocolError::MissingField("theme"))?,
            icon: envelope.icon.ok_or(ProtocolError::MissingField("icon"))?,
        }))
    }
}

/// Payloads exchanged with the background coordinator over [`IPC_CHANNEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpcMessage {
    LoadComplete,
    OpenMenu,
}

impl IpcMessage {
    pub fn parse(payload: &Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }

    pub fn to_value(self) -> Value {
        match self {
            Self::LoadComplete => Value::from("load-complete"),
            Self::OpenMenu => Value::from("open-menu"),
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
