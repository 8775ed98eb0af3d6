use std::{str::FromStr, time::Duration};

use anyhow::{anyhow, bail, Context};
use shared::{domain::TransitionMode, protocol::MenuAction};

/// One scripted interaction with the simulated page or menu.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Launcher click.
    Open,
    /// Backdrop click.
    Close,
    /// The configured open-menu hotkey.
    Hotkey,
    Key(String),
    Escape,
    Focus,
    /// Toggle host dark mode, then report the body mutation.
    Dark(bool),
    /// Toggle whether a text input on the host page has focus.
    Typing(bool),
    Regenerate,
    /// `open-menu` from the background coordinator.
    IpcOpen,
    Request(MenuAction),
    View(String),
    Transition(TransitionMode),
    Wait(Duration),
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (name, arg) = match raw.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (raw, None),
        };
        let need = |what: &str| {
            arg.ok_or_else(|| anyhow!("`{name}` needs a {what}: {name}:<{what}>"))
        };

        let step = match name {
            "open" => Step::Open,
            "close" => Step::Close,
            "hotkey" => Step::Hotkey,
            "key" => Step::Key(need("combo")?.to_string()),
            "escape" => Step::Escape,
            "focus" => Step::Focus,
            "dark" => Step::Dark(true),
            "light" => Step::Dark(false),
            "type" => Step::Typing(true),
            "blur" => Step::Typing(false),
            "regenerate" => Step::Regenerate,
            "ipc-open" => Step::IpcOpen,
            "request-open" => Step::Request(MenuAction::OpenMenu),
            "request-close" => Step::Request(MenuAction::CloseMenu),
            "view" => Step::View(need("id")?.to_string()),
            "transition" => {
                let mode = need("mode")?;
                Step::Transition(
                    TransitionMode::parse(mode)
                        .ok_or_else(|| anyhow!("unknown transition mode `{mode}`"))?,
                )
            }
            "wait" => {
                let ms: u64 = need("ms")?
                    .parse()
                    .with_context(|| format!("bad wait in `{raw}`"))?;
                Step::Wait(Duration::from_millis(ms))
            }
            _ => bail!("unknown step `{raw}`"),
        };
        Ok(step)
    }
}

/// Parses a comma-separated script.
pub fn parse_script(script: &str) -> anyhow::Result<Vec<Step>> {
    script
        .split(',')
        .filter(|step| !step.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
#[path = "tests/steps_tests.rs"]
mod tests;
