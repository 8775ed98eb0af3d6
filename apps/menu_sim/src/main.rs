mod config;
mod steps;

use std::{path::PathBuf, rc::Rc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use menu_core::{
    capabilities::{EnhancerUrls, FixedUpdate, RecordingIpc, SimulatedDocument, StaticMods},
    HostCapabilities, HostController, HostEvent, ManualScheduler, MenuSession,
};
use shared::protocol::{IpcMessage, IPC_CHANNEL};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{describe, load_settings, SimSettings},
    steps::{parse_script, Step},
};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "menu.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replays a comma-separated script and prints a snapshot after each step.
    Run {
        #[arg(long, default_value = "hotkey,wait:200")]
        steps: String,
    },
    /// Prints the resolved settings.
    Settings,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let settings = load_settings(&cli.config);

    match cli.command {
        Command::Settings => {
            println!("{}", serde_json::to_string_pretty(&describe(&settings))?);
        }
        Command::Run { steps } => {
            let steps = parse_script(&steps)?;
            run(&settings, steps).await?;
        }
    }

    Ok(())
}

async fn run(settings: &SimSettings, steps: Vec<Step>) -> Result<()> {
    let document = Rc::new(SimulatedDocument::new());
    document.set_dark_mode(settings.dark_mode);

    let caps = HostCapabilities {
        settings: Rc::new(settings.to_store()),
        database: Rc::new(settings.to_database()),
        mods: Rc::new(StaticMods::new()),
        document: document.clone(),
        ipc: Rc::new(RecordingIpc::default()),
        updates: Rc::new(FixedUpdate(settings.update_available)),
        urls: EnhancerUrls::new(&settings.enhancer_base_url)?,
        version: settings.version.clone(),
    };
    let host = HostController::start(caps).await?;
    let panels: Vec<&str> = settings.panels.iter().map(String::as_str).collect();
    let mut session = MenuSession::connect(host, Rc::new(ManualScheduler::new()), &panels);
    info!(panels = panels.len(), steps = steps.len(), "session connected");

    println!("{}", serde_json::to_string(&session.snapshot())?);
    for step in steps {
        apply(&mut session, &document, step);
        println!("{}", serde_json::to_string(&session.snapshot())?);
    }
    Ok(())
}

fn apply(session: &mut MenuSession, document: &SimulatedDocument, step: Step) {
    let outcome = match step {
        Step::Open => session.dispatch(HostEvent::LauncherClicked),
        Step::Close => session.dispatch(HostEvent::BackdropClicked),
        Step::Hotkey => {
            let combo = session.host().settings().open_menu_hotkey.clone();
            session.dispatch(HostEvent::KeyPress { combo })
        }
        Step::Key(combo) => session.dispatch(HostEvent::KeyPress { combo }),
        Step::Escape => session.dispatch(HostEvent::KeyPress {
            combo: menu_core::host::ESCAPE.into(),
        }),
        Step::Focus => session.dispatch(HostEvent::WindowFocused),
        Step::Dark(dark) => {
            document.set_dark_mode(dark);
            session.dispatch(HostEvent::BodyMutated)
        }
        Step::Typing(focused) => {
            document.set_text_input_focused(focused);
            return;
        }
        Step::Regenerate => {
            document.regenerate_navigation();
            session.dispatch(HostEvent::NavigationRegenerated)
        }
        Step::IpcOpen => session.dispatch(HostEvent::Ipc {
            channel: IPC_CHANNEL.into(),
            payload: IpcMessage::OpenMenu.to_value(),
        }),
        Step::Request(action) => {
            session.request(action);
            return;
        }
        Step::View(view) => {
            session.navigate(&view);
            return;
        }
        Step::Transition(mode) => {
            session.surface().set_transition(mode);
            return;
        }
        Step::Wait(by) => {
            session.advance(by);
            return;
        }
    };
    info!(?outcome, "host event handled");
}
