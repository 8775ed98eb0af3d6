use super::*;
use crate::scheduler::ManualScheduler;
use serde_json::json;

const MS: Duration = Duration::from_millis(1);

struct Harness {
    store: Store,
    scheduler: Rc<ManualScheduler>,
    views: Vec<View>,
}

impl Harness {
    fn new(mode: &str, ids: &[&str]) -> Self {
        let store = Store::new();
        store.set_one(keys::TRANSITION, json!(mode));
        let scheduler = Rc::new(ManualScheduler::new());
        let views = ids
            .iter()
            .map(|id| View::mount(ViewId::new(*id), &store, scheduler.clone()))
            .collect();
        Self {
            store,
            scheduler,
            views,
        }
    }

    fn view(&self, id: &str) -> &View {
        self.views
            .iter()
            .find(|view| view.id().as_str() == id)
            .expect("mounted view")
    }

    fn show(&self, view: &str) {
        self.store.set_one(keys::VIEW, json!(view));
    }

    fn in_progress(&self) -> Option<Value> {
        self.store.get_one(keys::TRANSITION_IN_PROGRESS)
    }
}

#[test]
fn mount_settles_default_view_without_animating() {
    let h = Harness::new("fade", &["welcome", "core"]);

    assert!(h.view("welcome").is_visible());
    assert_eq!(h.view("welcome").style().opacity, 1.0);
    assert_eq!(h.view("welcome").phase(), ViewPhase::Visible);
    assert!(!h.view("core").is_visible());
    assert_eq!(h.view("core").phase(), ViewPhase::Hidden);
    assert_eq!(h.in_progress(), None);
    assert_eq!(h.scheduler.pending(), 0);
}

#[test]
fn view_value_matches_panel_ids_case_insensitively() {
    let store = Store::new();
    store.set_one(keys::VIEW, json!("Welcome"));
    let scheduler = Rc::new(ManualScheduler::new());
    let welcome = View::mount(ViewId::new("welcome"), &store, scheduler.clone());
    let core = View::mount(ViewId::new("core"), &store, scheduler);

    assert!(welcome.is_visible());
    assert!(!core.is_visible());

    store.set_one(keys::VIEW, json!("CORE"));
    assert!(core.is_visible());
    assert!(!welcome.is_visible());
}

#[test]
fn none_mode_switches_within_the_same_tick() {
    let h = Harness::new("none", &["welcome", "core"]);
    h.show("core");

    let welcome = h.view("welcome").style();
    let core = h.view("core").style();
    assert_eq!(welcome.display, PanelDisplay::Hidden);
    assert_eq!(welcome.opacity, 0.0);
    assert_eq!(core.display, PanelDisplay::Shown);
    assert_eq!(core.opacity, 1.0);
    assert_eq!(core.transition, None);
    assert_eq!(h.view("core").phase(), ViewPhase::Visible);
    assert_eq!(h.scheduler.pending(), 0);
    assert_eq!(h.in_progress(), None);
}

#[test]
fn fade_holds_the_in_progress_flag_until_the_entrance_completes() {
    let h = Harness::new("fade", &["welcome", "core"]);
    h.show("core");

    assert_eq!(h.in_progress(), Some(json!(true)));
    assert_eq!(h.view("welcome").phase(), ViewPhase::Disappearing);
    assert!(h.view("welcome").is_visible());
    assert_eq!(h.view("welcome").style().opacity, 0.0);
    assert_eq!(h.view("core").phase(), ViewPhase::Appearing);
    assert!(!h.view("core").is_visible());

    h.scheduler.advance(99 * MS);
    assert!(h.view("welcome").is_visible());
    assert!(!h.view("core").is_visible());

    h.scheduler.advance(MS);
    assert!(!h.view("welcome").is_visible());
    assert_eq!(h.view("welcome").phase(), ViewPhase::Hidden);
    let core = h.view("core").style();
    assert!(core.is_shown());
    assert_eq!(core.opacity, 1.0);
    assert_eq!(
        core.transition,
        Some(StyleTransition {
            duration: TransitionMode::FADE_DURATION,
            transform: false,
        })
    );
    assert_eq!(h.in_progress(), Some(json!(true)));

    h.scheduler.advance(99 * MS);
    assert_eq!(h.in_progress(), Some(json!(true)));

    h.scheduler.advance(MS);
    assert_eq!(h.in_progress(), Some(json!(false)));
    assert_eq!(h.view("core").phase(), ViewPhase::Visible);
    assert_eq!(h.scheduler.now(), 200 * MS);
}

#[test]
fn slide_to_right_offsets_outgoing_left_and_incoming_from_the_right() {
    let h = Harness::new("slide-to-right", &["welcome", "core"]);
    h.show("core");

    let welcome = h.view("welcome").style();
    assert_eq!(welcome.offset_percent, -100.0);
    assert_eq!(welcome.opacity, 0.0);
    assert!(welcome.is_shown());

    let core = h.view("core").style();
    assert!(core.is_shown());
    assert_eq!(core.offset_percent, 100.0);
    assert_eq!(core.opacity, 0.0);
    assert_eq!(core.transition, None);
    assert_eq!(h.in_progress(), Some(json!(true)));

    h.scheduler.run_idle();
    let core = h.view("core").style();
    assert_eq!(core.offset_percent, 0.0);
    assert_eq!(core.opacity, 1.0);
    assert_eq!(
        core.transition,
        Some(StyleTransition {
            duration: TransitionMode::SLIDE_DURATION,
            transform: true,
        })
    );

    h.scheduler.advance(199 * MS);
    assert!(h.view("welcome").is_visible());
    assert_eq!(h.in_progress(), Some(json!(true)));

    h.scheduler.advance(MS);
    let welcome = h.view("welcome").style();
    assert_eq!(welcome.display, PanelDisplay::Hidden);
    assert_eq!(welcome.offset_percent, 0.0);
    assert_eq!(h.in_progress(), Some(json!(false)));
    assert_eq!(h.view("core").phase(), ViewPhase::Visible);
}

#[test]
fn slide_to_left_mirrors_the_offsets() {
    let h = Harness::new("slide-to-left", &["welcome", "core"]);
    h.show("core");

    assert_eq!(h.view("welcome").style().offset_percent, 100.0);
    assert_eq!(h.view("core").style().offset_percent, -100.0);
    assert_eq!(
        h.view("welcome").style().css(),
        "opacity: 0; transform: translateX(100%); transition: opacity 200ms, transform 200ms;"
    );
}

#[test]
fn changing_transition_alone_does_not_rerender() {
    let h = Harness::new("fade", &["welcome", "core"]);
    let before = h.view("welcome").style();

    h.store.set_one(keys::TRANSITION, json!("slide-to-left"));
    assert_eq!(h.view("welcome").style(), before);
    assert_eq!(h.scheduler.pending(), 0);

    h.show("core");
    assert_eq!(h.view("welcome").style().offset_percent, 100.0);
}

#[test]
fn rewriting_the_active_view_is_a_no_op() {
    let h = Harness::new("fade", &["welcome", "core"]);
    h.show("welcome");
    h.show("WELCOME");

    assert_eq!(h.scheduler.pending(), 0);
    assert_eq!(h.in_progress(), None);
    assert_eq!(h.view("welcome").phase(), ViewPhase::Visible);
}

#[test]
fn reactivating_mid_exit_cancels_the_stale_hide() {
    let h = Harness::new("fade", &["welcome", "core"]);
    h.show("core");
    h.scheduler.advance(50 * MS);

    h.show("welcome");
    assert_eq!(h.view("welcome").phase(), ViewPhase::Appearing);
    assert_eq!(h.view("core").phase(), ViewPhase::Hidden);

    h.scheduler.advance(300 * MS);
    let welcome = h.view("welcome").style();
    assert_eq!(welcome.display, PanelDisplay::Shown);
    assert_eq!(welcome.opacity, 1.0);
    assert_eq!(h.view("welcome").phase(), ViewPhase::Visible);
    assert!(!h.view("core").is_visible());
    assert_eq!(h.in_progress(), Some(json!(false)));
}

#[test]
fn deactivating_mid_entrance_exits_from_the_rendered_state() {
    let h = Harness::new("slide-to-left", &["welcome", "core", "themes"]);
    h.show("core");
    h.scheduler.run_idle();
    h.scheduler.advance(50 * MS);

    h.show("themes");
    assert_eq!(h.view("core").phase(), ViewPhase::Disappearing);
    assert_eq!(h.view("core").style().offset_percent, 100.0);
    assert_eq!(h.view("themes").phase(), ViewPhase::Appearing);

    h.scheduler.advance(400 * MS);
    assert!(!h.view("welcome").is_visible());
    assert!(!h.view("core").is_visible());
    assert!(h.view("themes").is_visible());
    assert_eq!(h.view("themes").phase(), ViewPhase::Visible);
    assert_eq!(h.in_progress(), Some(json!(false)));
}

#[test]
fn immediate_switch_clears_a_flag_left_by_a_cancelled_animation() {
    let h = Harness::new("fade", &["welcome", "core"]);
    h.show("core");
    assert_eq!(h.in_progress(), Some(json!(true)));

    h.store.set_one(keys::TRANSITION, json!("none"));
    h.show("welcome");
    assert_eq!(h.in_progress(), Some(json!(false)));

    h.scheduler.advance(500 * MS);
    assert!(h.view("welcome").is_visible());
    assert_eq!(h.view("welcome").style().opacity, 1.0);
    assert!(!h.view("core").is_visible());
    assert_eq!(h.in_progress(), Some(json!(false)));
}

#[test]
fn unknown_transition_behaves_as_none() {
    let h = Harness::new("zoom", &["welcome", "core"]);
    h.show("core");

    assert!(h.view("core").is_visible());
    assert!(!h.view("welcome").is_visible());
    assert_eq!(h.scheduler.pending(), 0);
}

#[test]
fn dropping_a_view_releases_its_subscription() {
    let mut h = Harness::new("fade", &["welcome", "core"]);
    assert_eq!(h.store.subscription_count(), 2);

    h.views.pop();
    assert_eq!(h.store.subscription_count(), 1);
    h.show("core");
    assert_eq!(h.view("welcome").phase(), ViewPhase::Disappearing);
}
