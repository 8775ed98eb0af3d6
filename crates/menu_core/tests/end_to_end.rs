use std::{rc::Rc, time::Duration};

use menu_core::{
    capabilities::{
        EnhancerUrls, FixedUpdate, MemorySettings, RecordingIpc, SimulatedDocument, StaticMods,
    },
    entangled,
    theme::{DARK_ACCENT, DEFAULT_ACCENT},
    EventOutcome, HostCapabilities, HostController, HostEvent, ManualScheduler, MenuSession,
    ViewPhase,
};
use serde_json::json;
use shared::protocol::MenuAction;

const PANELS: &[&str] = &["welcome", "core", "themes"];

async fn start_host(document: Rc<SimulatedDocument>, transition: &str) -> HostController {
    let caps = HostCapabilities {
        settings: Rc::new(
            MemorySettings::new()
                .with("openMenuHotkey", json!("Ctrl+Shift+,"))
                .with("menuTransition", json!(transition)),
        ),
        database: Rc::new(MemorySettings::new()),
        mods: Rc::new(StaticMods::new()),
        document,
        ipc: Rc::new(RecordingIpc::default()),
        updates: Rc::new(FixedUpdate(false)),
        urls: EnhancerUrls::new("chrome-extension://enhancer/").expect("urls"),
        version: "0.11.0".into(),
    };
    HostController::start(caps).await.expect("host start")
}

async fn session(document: Rc<SimulatedDocument>, transition: &str) -> MenuSession {
    let host = start_host(document, transition).await;
    MenuSession::connect(host, Rc::new(ManualScheduler::new()), PANELS)
}

#[tokio::test]
async fn opening_in_dark_mode_recolours_theme_bound_panels() {
    let document = Rc::new(SimulatedDocument::new());
    let mut session = session(document.clone(), "fade").await;
    assert_eq!(session.snapshot().accent, Some(DEFAULT_ACCENT));

    document.set_dark_mode(true);
    let outcome = session.dispatch(HostEvent::KeyPress {
        combo: "Ctrl+Shift+,".into(),
    });

    assert_eq!(outcome, EventOutcome::PreventDefault);
    let snapshot = session.snapshot();
    assert!(snapshot.open);
    assert_eq!(snapshot.theme, Some(json!("dark")));
    assert_eq!(snapshot.accent, Some(DARK_ACCENT));
}

#[tokio::test]
async fn close_button_inside_the_menu_closes_the_host_modal() {
    let document = Rc::new(SimulatedDocument::new());
    let mut session = session(document, "fade").await;

    session.dispatch(HostEvent::LauncherClicked);
    assert!(session.host().is_open());

    session.request(MenuAction::CloseMenu);
    assert!(!session.host().is_open());

    session.request(MenuAction::OpenMenu);
    session.request(MenuAction::OpenMenu);
    assert!(session.host().is_open());
}

#[tokio::test]
async fn fade_navigation_settles_after_both_halves_of_the_handoff() {
    let document = Rc::new(SimulatedDocument::new());
    let mut session = session(document, "fade").await;
    session.dispatch(HostEvent::LauncherClicked);

    session.navigate("Themes");
    assert!(!session.surface().is_settled());

    session.advance(Duration::from_millis(199));
    assert!(!session.surface().is_settled());

    session.advance(Duration::from_millis(1));
    assert!(session.surface().is_settled());
    let phases: Vec<_> = session
        .snapshot()
        .panels
        .into_iter()
        .map(|panel| (panel.id, panel.phase))
        .collect();
    assert_eq!(
        phases,
        vec![
            ("welcome".to_string(), ViewPhase::Hidden),
            ("core".to_string(), ViewPhase::Hidden),
            ("themes".to_string(), ViewPhase::Visible),
        ]
    );
}

#[tokio::test]
async fn foreign_traffic_on_shared_channels_is_ignored() {
    let document = Rc::new(SimulatedDocument::new());
    let mut session = session(document, "none").await;
    let before = session.snapshot();

    session.dispatch(HostEvent::Ipc {
        channel: "notion-enhancer".into(),
        payload: json!("reload"),
    });
    session.dispatch(HostEvent::KeyPress { combo: "a".into() });

    let after = session.snapshot();
    assert_eq!(after.open, before.open);
    assert_eq!(after.theme, before.theme);
    assert_eq!(after.view, before.view);
}

#[tokio::test]
async fn foreign_namespace_envelope_from_the_frame_does_not_close_the_menu() {
    let document = Rc::new(SimulatedDocument::new());
    let mut host = start_host(document.clone(), "fade").await;
    let (host_port, mut frame_port) = entangled();
    host.handle(HostEvent::FrameLoaded(host_port));
    host.handle(HostEvent::LauncherClicked);
    assert!(host.is_open());
    frame_port.drain();

    let foreign = json!({ "namespace": "grammarly", "action": "close-menu" });
    assert!(frame_port.post(foreign));
    assert_eq!(host.pump_frame(), 0);
    assert!(host.is_open());
    assert_eq!(document.frame_focus_count(), 1);

    let own = json!({ "namespace": "notion-enhancer", "action": "close-menu" });
    assert!(frame_port.post(own));
    assert_eq!(host.pump_frame(), 1);
    assert!(!host.is_open());
}
