use super::*;
use crate::kernel::services::adapters::hierarchy::{NodeState, RecordingHierarchy};
use crate::kernel::services::adapters::loader::QueuedLoader;
use crate::kernel::test_support::{drain, new_log, spied, Spy};
use serde_json::json;

#[test]
fn attach_hands_over_the_parameter_and_activates() {
    let log = new_log();
    let mut hierarchy = RecordingHierarchy::new();
    let mut slot = ViewSlot::default();

    slot.begin("shop", Some(json!({"tab": 2})));
    assert!(slot.is_loading());
    slot.attach(
        ViewInstance::new(InstanceId(7), spied("shop", &log)),
        Layer::Window,
        true,
        &mut hierarchy,
    );

    assert_eq!(drain(&log), vec![r#"shop:param:{"tab":2}"#.to_string()]);
    assert_eq!(slot.state, LifecycleState::Active);
    assert_eq!(slot.instance(), Some(InstanceId(7)));
    assert_eq!(
        hierarchy.node(InstanceId(7)),
        Some(NodeState {
            layer: Layer::Window,
            active: true
        })
    );
}

#[test]
fn focus_granted_while_loading_is_delivered_on_attach() {
    let log = new_log();
    let mut hierarchy = RecordingHierarchy::new();
    let mut slot = ViewSlot::default();

    slot.begin("bag", None);
    slot.gain_focus();
    assert_eq!(slot.focus, FocusState::Requested);
    assert!(drain(&log).is_empty());

    slot.attach(
        ViewInstance::new(InstanceId(1), Behaviors::new().with_focus(Spy::new("bag", &log))),
        Layer::Popup,
        true,
        &mut hierarchy,
    );
    assert_eq!(drain(&log), vec!["bag:focus"]);
    assert_eq!(slot.focus, FocusState::Dispatched);
}

#[test]
fn losing_focus_before_attach_cancels_the_request() {
    let log = new_log();
    let mut hierarchy = RecordingHierarchy::new();
    let mut slot = ViewSlot::default();

    slot.begin("bag", None);
    slot.gain_focus();
    slot.lose_focus();
    slot.attach(
        ViewInstance::new(InstanceId(1), Behaviors::new().with_focus(Spy::new("bag", &log))),
        Layer::Popup,
        true,
        &mut hierarchy,
    );
    assert!(drain(&log).is_empty());
    assert_eq!(slot.focus, FocusState::Unfocused);
}

#[test]
fn a_failing_handler_does_not_stop_the_others() {
    let log = new_log();
    let mut hierarchy = RecordingHierarchy::new();
    let mut slot = ViewSlot::default();
    let behaviors = Behaviors::new()
        .with_focus(Spy::failing("a", &log))
        .with_focus(Spy::new("b", &log))
        .with_parameter(Spy::failing("p", &log));

    slot.begin("multi", None);
    slot.attach(ViewInstance::new(InstanceId(3), behaviors), Layer::Popup, true, &mut hierarchy);
    slot.gain_focus();
    slot.notify_close();

    assert_eq!(
        drain(&log),
        vec!["p:param:none", "a:focus", "b:focus", "a:close", "b:close"]
    );
}

#[test]
fn parameter_without_handler_is_tolerated() {
    let mut hierarchy = RecordingHierarchy::new();
    let mut slot = ViewSlot::default();

    slot.begin("plain", Some(json!(5)));
    slot.attach(ViewInstance::bare(InstanceId(2)), Layer::Window, true, &mut hierarchy);
    assert_eq!(slot.state, LifecycleState::Active);
}

#[test]
fn keys_reach_every_key_handler() {
    let log = new_log();
    let mut hierarchy = RecordingHierarchy::new();
    let mut slot = ViewSlot::default();

    assert!(!slot.handle_key(KeyCode::Enter));

    slot.begin("menu", None);
    let behaviors = Behaviors::new()
        .with_key(Spy::new("k1", &log))
        .with_key(Spy::new("k2", &log));
    slot.attach(ViewInstance::new(InstanceId(4), behaviors), Layer::Window, true, &mut hierarchy);

    assert!(slot.handle_key(KeyCode::Esc));
    assert_eq!(drain(&log), vec!["k1:key:Esc", "k2:key:Esc"]);
}

#[test]
fn view_without_key_handlers_reports_unhandled() {
    let mut hierarchy = RecordingHierarchy::new();
    let mut slot = ViewSlot::default();
    slot.begin("bare", None);
    slot.attach(ViewInstance::bare(InstanceId(5)), Layer::Window, true, &mut hierarchy);
    assert!(!slot.handle_key(KeyCode::Char('x')));
}

#[test]
fn release_returns_the_instance_and_reset_clears_everything() {
    let mut hierarchy = RecordingHierarchy::new();
    let mut loader = QueuedLoader::new();
    let mut slot = ViewSlot::default();

    slot.begin("shop", Some(json!("x")));
    slot.attach(ViewInstance::bare(InstanceId(9)), Layer::Window, true, &mut hierarchy);
    slot.release_instance(&mut loader);
    slot.reset();

    assert_eq!(loader.unloaded(), vec![InstanceId(9)]);
    assert!(slot.name.is_empty());
    assert_eq!(slot.param, None);
    assert_eq!(slot.state, LifecycleState::Idle);
    assert_eq!(slot.instance(), None);
}
