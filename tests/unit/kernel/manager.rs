use super::*;
use crate::kernel::services::adapters::{ManualTimer, QueuedLoader, RecordingHierarchy};
use crate::kernel::services::ports::{Behaviors, LoadKind};
use crate::kernel::test_support::{drain, new_log, spied, toast_factory, HeldAnim, Log, MaskSpy, Spy};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

struct Harness {
    ui: UiManager,
    loader: QueuedLoader,
    scene: RecordingHierarchy,
    scaled: ManualTimer,
    realtime: ManualTimer,
    log: Log,
}

fn harness_with(config: UiConfig) -> Harness {
    let log = new_log();
    let loader = QueuedLoader::new();
    let scene = RecordingHierarchy::new();
    let scaled = ManualTimer::new();
    let realtime = ManualTimer::new();
    let mut ui = UiManager::new(UiParts {
        hierarchy: Box::new(scene.clone()),
        timer: Box::new(scaled.clone()),
        realtime_timer: Box::new(realtime.clone()),
        default_mask: Box::new(MaskSpy::new("mask", &log, 0.2)),
        toast_factory: Box::new(toast_factory(&log, 0.3)),
        config,
    });
    ui.init(Box::new(loader.clone())).unwrap();
    Harness {
        ui,
        loader,
        scene,
        scaled,
        realtime,
        log,
    }
}

fn harness() -> Harness {
    harness_with(UiConfig::default())
}

fn immediate() -> UiConfig {
    UiConfig {
        window_load_mask_key: None,
        ..UiConfig::default()
    }
}

impl Harness {
    fn resolve(&mut self, kind: LoadKind, name: &str, behaviors: Behaviors) -> InstanceId {
        let id = self.loader.resolve(kind, name, behaviors).unwrap();
        self.ui.pump();
        id
    }

    fn pass_load_delay(&mut self) {
        self.realtime.advance(0.1);
        self.ui.pump();
    }

    fn open_window(&mut self, name: &str, behaviors: Behaviors) -> InstanceId {
        self.ui.show_window(name, None, None);
        self.pass_load_delay();
        self.resolve(LoadKind::Window, name, behaviors)
    }

    fn open_popup(&mut self, name: &str, behaviors: Behaviors) -> InstanceId {
        self.ui.show_popup(name, None, None);
        self.resolve(LoadKind::Popup, name, behaviors)
    }
}

#[test]
fn init_twice_is_an_error() {
    let mut h = harness();
    assert_eq!(
        h.ui.init(Box::new(QueuedLoader::new())),
        Err(UiError::AlreadyInitialized)
    );
    assert!(h.ui.is_initialized());
}

#[test]
fn requests_before_init_are_ignored() {
    let log = new_log();
    let mut ui = UiManager::new(UiParts {
        hierarchy: Box::new(RecordingHierarchy::new()),
        timer: Box::new(ManualTimer::new()),
        realtime_timer: Box::new(ManualTimer::new()),
        default_mask: Box::new(MaskSpy::new("mask", &log, 0.2)),
        toast_factory: Box::new(toast_factory(&log, 0.3)),
        config: immediate(),
    });

    ui.show_window("lobby", None, None);
    ui.show_popup("bag", None, None);
    ui.set_loading_mask("spinner");
    assert!(!ui.close_popup("bag"));
    assert!(!ui.reset_loading_mask());

    assert_eq!(ui.current_window(), None);
    assert!(ui.popup_names().is_empty());
    assert!(!ui.is_initialized());
}

#[test]
fn window_load_is_wrapped_in_the_load_mask() {
    let mut h = harness();
    h.ui.show_window("lobby", None, None);

    assert_eq!(h.ui.loading_mask_held(), 1);
    assert!(h.ui.loading_mask_visible());
    assert_eq!(h.ui.focus_owner(), Some(FocusOwner::LoadingMask));
    assert_eq!(h.loader.pending_len(), 0);

    h.pass_load_delay();
    assert_eq!(h.loader.pending(), vec![(LoadKind::Window, "lobby".to_string())]);

    h.resolve(LoadKind::Window, "lobby", Behaviors::new());
    assert_eq!(h.ui.loading_mask_held(), 0);
    assert_eq!(h.ui.focus_owner(), Some(FocusOwner::Window("lobby".into())));
    assert_eq!(h.ui.window_state(), Some(LifecycleState::Active));
}

#[test]
fn without_a_mask_key_the_window_loads_at_once() {
    let mut h = harness_with(immediate());
    h.ui.show_window("lobby", None, None);

    assert_eq!(h.loader.pending_len(), 1);
    assert_eq!(h.ui.loading_mask_held(), 0);
    assert_eq!(h.realtime.pending_len(), 0);
}

#[test]
fn replacing_a_loading_window_keeps_the_mask_for_the_new_one() {
    let mut h = harness();
    h.ui.show_window("first", None, None);
    h.pass_load_delay();
    h.ui.show_window("second", None, None);
    assert_eq!(h.ui.loading_mask_held(), 1);

    let stale = h.resolve(LoadKind::Window, "first", Behaviors::new());
    assert!(h.loader.was_unloaded(stale));
    assert!(!h.scene.is_attached(stale));
    assert_eq!(h.ui.loading_mask_held(), 1);

    h.pass_load_delay();
    let fresh = h.resolve(LoadKind::Window, "second", Behaviors::new());
    assert!(h.scene.is_active(fresh));
    assert_eq!(h.ui.loading_mask_held(), 0);
}

#[test]
fn closing_during_the_load_delay_issues_no_load() {
    let mut h = harness();
    h.ui.show_window("lobby", None, None);
    h.ui.close_window();

    assert_eq!(h.ui.loading_mask_held(), 0);
    assert_eq!(h.realtime.pending_len(), 0);
    h.realtime.advance(1.0);
    h.ui.pump();
    assert_eq!(h.loader.pending_len(), 0);
    assert_eq!(h.ui.current_window(), None);
}

#[test]
fn loaded_callback_fires_only_for_the_current_window() {
    let mut h = harness_with(immediate());
    let first_hits = Rc::new(Cell::new(0));
    let second_hits = Rc::new(Cell::new(0));
    let (a, b) = (first_hits.clone(), second_hits.clone());

    h.ui.show_window("first", None, Some(Box::new(move || a.set(a.get() + 1))));
    h.ui.show_window("second", None, Some(Box::new(move || b.set(b.get() + 1))));
    h.resolve(LoadKind::Window, "first", Behaviors::new());
    h.resolve(LoadKind::Window, "second", Behaviors::new());

    assert_eq!(first_hits.get(), 0);
    assert_eq!(second_hits.get(), 1);
}

#[test]
fn failed_window_load_settles_without_instance() {
    let mut h = harness();
    h.ui.show_window("lobby", None, None);
    h.pass_load_delay();
    assert!(h.loader.fail(LoadKind::Window, "lobby"));
    h.ui.pump();

    assert_eq!(h.ui.window_state(), Some(LifecycleState::Active));
    assert_eq!(h.ui.loading_mask_held(), 0);
    assert!(!h.ui.handle_key(KeyCode::Enter));
}

#[test]
fn window_parameter_and_focus_reach_the_view() {
    let mut h = harness_with(immediate());
    h.ui.show_window("shop", Some(json!({"tab": "weapons"})), None);
    h.resolve(LoadKind::Window, "shop", spied("shop", &h.log));

    assert_eq!(
        drain(&h.log),
        vec![r#"shop:param:{"tab":"weapons"}"#, "shop:focus"]
    );
    assert!(h.ui.handle_key(KeyCode::Char('q')));
    assert_eq!(drain(&h.log), vec!["shop:key:Char('q')"]);
}

#[test]
fn popup_takes_focus_and_gives_it_back() {
    let mut h = harness_with(immediate());
    h.open_window("lobby", spied("lobby", &h.log));
    h.open_popup("bag", spied("bag", &h.log));
    drain(&h.log);

    assert!(h.ui.handle_key(KeyCode::Esc));
    assert_eq!(drain(&h.log), vec!["bag:key:Esc"]);

    assert!(h.ui.close_popup("bag"));
    assert_eq!(drain(&h.log), vec!["bag:lose", "lobby:focus", "bag:close"]);
    assert!(h.ui.handle_key(KeyCode::Esc));
    assert_eq!(drain(&h.log), vec!["lobby:key:Esc"]);
}

#[test]
fn showing_the_same_name_replaces_without_animation() {
    let mut h = harness_with(immediate());
    let anim = HeldAnim::default();
    let closes = Rc::new(Cell::new(0));
    let counter = closes.clone();

    h.ui.show_popup("bag", None, Some(Box::new(move || counter.set(counter.get() + 1))));
    let first = h.resolve(
        LoadKind::Popup,
        "bag",
        Behaviors::new().with_close_anim(anim.clone()),
    );
    h.ui.show_popup("bag", None, None);

    assert_eq!(anim.parked_len(), 0);
    assert_eq!(closes.get(), 1);
    assert!(h.loader.was_unloaded(first));
    assert_eq!(h.ui.popup_names(), vec!["bag"]);
}

#[test]
fn animated_close_releases_after_the_animation() {
    let mut h = harness_with(immediate());
    let anim = HeldAnim::default();
    h.open_popup("base", Behaviors::new());
    let top = h.open_popup("shop", Behaviors::new().with_close_anim(anim.clone()));

    assert!(h.ui.close_popup("shop"));
    assert_eq!(anim.parked_len(), 1);
    assert_eq!(h.ui.popup_names(), vec!["base"]);
    assert_eq!(h.ui.popup_visible("base"), Some(true));
    assert_eq!(h.ui.focus_owner(), Some(FocusOwner::Popup("base".into())));
    assert!(!h.loader.was_unloaded(top));

    anim.finish_all();
    h.ui.pump();
    assert!(h.loader.was_unloaded(top));
    assert_eq!(h.ui.stats().popups.live, 1);
}

#[test]
fn closing_a_buried_popup_does_not_animate_or_reveal() {
    let mut h = harness_with(immediate());
    let anim = HeldAnim::default();
    h.open_popup("a", Behaviors::new().with_close_anim(anim.clone()));
    h.open_popup("b", Behaviors::new());
    h.open_popup("c", Behaviors::new());

    assert!(h.ui.close_popup("a"));
    assert_eq!(anim.parked_len(), 0);
    assert_eq!(h.ui.popup_names(), vec!["b", "c"]);
    assert_eq!(h.ui.popup_visible("b"), Some(false));
}

#[test]
fn overlay_loading_after_the_popup_above_stays_visible() {
    let mut h = harness_with(immediate());
    h.ui.show_popup("hud", None, None);
    h.ui.show_popup("menu", None, None);
    let menu = h.resolve(LoadKind::Popup, "menu", Behaviors::new());
    assert_eq!(h.ui.popup_visible("hud"), Some(false));

    let hud = h.resolve(LoadKind::Popup, "hud", Behaviors::new().with_overlay(true));

    assert_eq!(h.ui.popup_visible("hud"), Some(true));
    assert!(h.scene.is_active(hud));
    assert!(h.scene.is_active(menu));
}

#[test]
fn close_by_instance_scans_the_stack() {
    let mut h = harness_with(immediate());
    let a = h.open_popup("a", Behaviors::new());
    h.open_popup("b", Behaviors::new());

    assert!(h.ui.close_popup_instance(a));
    assert!(!h.ui.close_popup_instance(a));
    assert_eq!(h.ui.popup_names(), vec!["b"]);
}

#[test]
fn empty_popup_load_leaves_the_one_below_visible() {
    let mut h = harness_with(immediate());
    let below = h.open_popup("a", Behaviors::new());
    h.ui.show_popup("b", None, None);
    assert!(h.loader.fail(LoadKind::Popup, "b"));
    h.ui.pump();

    assert!(h.scene.is_active(below));
    assert_eq!(h.ui.popup_visible("a"), Some(true));
}

#[test]
fn popup_closed_before_load_is_unloaded_on_delivery() {
    let mut h = harness_with(immediate());
    let closes = Rc::new(Cell::new(false));
    let flag = closes.clone();
    h.ui.show_popup("late", None, Some(Box::new(move || flag.set(true))));
    assert!(h.ui.close_popup("late"));
    assert!(closes.get());

    let id = h.resolve(LoadKind::Popup, "late", Behaviors::new());
    assert!(h.loader.was_unloaded(id));
    assert!(!h.scene.is_attached(id));
}

#[test]
fn loading_mask_swallows_keys() {
    let mut h = harness_with(immediate());
    h.open_window("lobby", Behaviors::new().with_key(Spy::new("lobby", &h.log)));
    h.ui.show_loading_mask("net");

    assert!(h.ui.handle_key(KeyCode::Enter));
    assert!(drain(&h.log).iter().all(|e| !e.starts_with("lobby:key")));

    h.ui.hide_loading_mask("net");
    drain(&h.log);
    assert!(h.ui.handle_key(KeyCode::Enter));
    assert_eq!(drain(&h.log), vec!["lobby:key:Enter"]);
}

#[test]
fn mask_fades_on_the_scaled_timer() {
    let mut h = harness_with(immediate());
    h.ui.show_loading_mask("net");
    h.ui.hide_loading_mask("net");
    assert!(h.ui.loading_mask_visible());

    h.scaled.advance(0.2);
    h.ui.pump();
    assert!(!h.ui.loading_mask_visible());
    assert_eq!(drain(&h.log), vec!["mask:show", "mask:close", "mask:hide"]);
}

#[test]
fn custom_mask_swap_and_reset() {
    let mut h = harness_with(immediate());
    h.ui.set_loading_mask("spinner");
    let id = h.resolve(
        LoadKind::LoadingMask,
        "spinner",
        Behaviors::new().with_loading_mask(MaskSpy::new("spinner", &h.log, 0.0)),
    );

    h.ui.show_loading_mask("k");
    assert_eq!(drain(&h.log), vec!["spinner:show"]);
    assert!(!h.ui.reset_loading_mask());

    h.ui.hide_loading_mask("k");
    assert!(h.ui.reset_loading_mask());
    assert!(h.loader.was_unloaded(id));
    assert!(!h.ui.reset_loading_mask());
}

#[test]
fn toast_lifecycle_through_the_facade() {
    let mut h = harness_with(immediate());
    h.ui.show_toast("first", 5.0);
    h.ui.show_toast("second", 3.0);
    assert_eq!(h.ui.toast_content(), Some("second"));
    assert_eq!(h.ui.toasts_on_screen(), 1);

    h.realtime.advance(3.0);
    h.ui.pump();
    assert_eq!(h.ui.toast_content(), None);
    assert_eq!(h.ui.toasts_on_screen(), 1);

    h.scaled.advance(0.3);
    h.ui.pump();
    assert_eq!(h.ui.toasts_on_screen(), 0);
}

#[test]
fn dismiss_toast_starts_the_out_transition() {
    let mut h = harness_with(immediate());
    assert!(!h.ui.dismiss_toast());
    h.ui.show_toast("hi", 10.0);
    assert!(h.ui.dismiss_toast());
    assert_eq!(h.ui.toast_content(), None);
    assert_eq!(drain(&h.log), vec!["toast1:show:hi", "toast1:out"]);
}
