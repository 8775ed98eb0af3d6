use thiserror::Error;

/// Reasons an incoming cross-surface message is rejected at the boundary.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message payload is not an object")]
    NotAnObject,
    #[error("message belongs to foreign namespace {0:?}")]
    ForeignNamespace(Option<String>),
    #[error("malformed menu envelope: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("menu envelope carries neither an action nor a theme sync")]
    Empty,
    #[error("theme sync is missing `{0}`")]
    MissingField(&'static str),
}

impl ProtocolError {
    /// Traffic from other senders sharing the channel, to be ignored quietly.
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::NotAnObject | Self::ForeignNamespace(_))
    }
}
