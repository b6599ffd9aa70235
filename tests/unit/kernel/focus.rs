use super::*;
use slotmap::SlotMap;

fn popup_keys(n: usize) -> Vec<PopupKey> {
    let mut arena: SlotMap<PopupKey, ()> = SlotMap::with_key();
    (0..n).map(|_| arena.insert(())).collect()
}

fn window_key() -> WindowKey {
    let mut arena: SlotMap<WindowKey, ()> = SlotMap::with_key();
    arena.insert(())
}

#[test]
fn window_is_inserted_at_the_base() {
    let mut chain = FocusChain::new();
    let p = popup_keys(1)[0];
    let w = window_key();

    chain.add(FocusId::Popup(p), false, true);
    let transition = chain.add(FocusId::Window(w), true, true);

    assert_eq!(transition, None);
    assert_eq!(chain.top(), Some(FocusId::Popup(p)));
    assert_eq!(chain.iter().next(), Some(FocusId::Window(w)));
}

#[test]
fn appending_moves_focus_to_the_new_top() {
    let mut chain = FocusChain::new();
    let keys = popup_keys(2);
    let w = window_key();

    let t = chain.add(FocusId::Window(w), true, true);
    assert_eq!(
        t,
        Some(FocusTransition {
            lost: None,
            gained: Some(FocusId::Window(w))
        })
    );

    let t = chain.add(FocusId::Popup(keys[0]), false, true);
    assert_eq!(
        t,
        Some(FocusTransition {
            lost: Some(FocusId::Window(w)),
            gained: Some(FocusId::Popup(keys[0]))
        })
    );

    let t = chain.remove(FocusId::Popup(keys[0]), true);
    assert_eq!(
        t,
        Some(FocusTransition {
            lost: Some(FocusId::Popup(keys[0])),
            gained: Some(FocusId::Window(w))
        })
    );
}

#[test]
fn removing_a_non_top_entry_keeps_focus() {
    let mut chain = FocusChain::new();
    let keys = popup_keys(2);
    chain.add(FocusId::Popup(keys[0]), false, true);
    chain.add(FocusId::Popup(keys[1]), false, true);

    assert_eq!(chain.remove(FocusId::Popup(keys[0]), true), None);
    assert_eq!(chain.current(), Some(FocusId::Popup(keys[1])));
    assert_eq!(chain.len(), 1);
}

#[test]
fn undispatched_mutations_are_settled_by_the_next_dispatch() {
    let mut chain = FocusChain::new();
    let keys = popup_keys(3);
    chain.add(FocusId::Popup(keys[0]), false, true);

    assert_eq!(chain.add(FocusId::Popup(keys[1]), false, false), None);
    assert_eq!(chain.current(), Some(FocusId::Popup(keys[0])));
    assert_eq!(chain.remove(FocusId::Popup(keys[1]), false), None);

    let t = chain.add(FocusId::Popup(keys[2]), false, true);
    assert_eq!(
        t,
        Some(FocusTransition {
            lost: Some(FocusId::Popup(keys[0])),
            gained: Some(FocusId::Popup(keys[2]))
        })
    );
}

#[test]
fn removing_unknown_participant_is_a_no_op() {
    let mut chain = FocusChain::new();
    assert_eq!(chain.remove(FocusId::LoadingMask, true), None);
    assert!(chain.is_empty());
    assert_eq!(chain.current(), None);
}

#[test]
fn emptying_the_chain_reports_focus_loss() {
    let mut chain = FocusChain::new();
    chain.add(FocusId::LoadingMask, false, true);
    let t = chain.remove(FocusId::LoadingMask, true);
    assert_eq!(
        t,
        Some(FocusTransition {
            lost: Some(FocusId::LoadingMask),
            gained: None
        })
    );
    assert!(!chain.contains(FocusId::LoadingMask));
}
