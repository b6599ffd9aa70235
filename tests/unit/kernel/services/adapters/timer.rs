use super::*;
use crate::kernel::services::bus::{ui_bus, TimerTicket, UiMessage};

fn fired(rx: &mut crate::kernel::services::bus::UiBusReceiver) -> Vec<u64> {
    let mut out = Vec::new();
    while let Ok(UiMessage::TimerFired(TimerTicket::MaskFaded(seq))) = rx.try_recv() {
        out.push(seq);
    }
    out
}

#[test]
fn timers_fire_in_due_order() {
    let (tx, mut rx) = ui_bus();
    let mut timer = ManualTimer::new();
    timer.register(0.5, tx.timer_fire(TimerTicket::MaskFaded(2)));
    timer.register(0.2, tx.timer_fire(TimerTicket::MaskFaded(1)));
    timer.register(0.9, tx.timer_fire(TimerTicket::MaskFaded(3)));

    assert_eq!(timer.advance(0.6), 2);
    assert_eq!(fired(&mut rx), vec![1, 2]);
    assert_eq!(timer.pending_len(), 1);

    assert_eq!(timer.advance(0.3), 1);
    assert_eq!(fired(&mut rx), vec![3]);
}

#[test]
fn unregistered_timers_never_fire() {
    let (tx, mut rx) = ui_bus();
    let mut timer = ManualTimer::new();
    let id = timer.register(0.1, tx.timer_fire(TimerTicket::MaskFaded(7)));
    timer.unregister(id);
    timer.unregister(TimerId(999));

    assert_eq!(timer.advance(1.0), 0);
    assert!(fired(&mut rx).is_empty());
}

#[test]
fn negative_and_nan_delays_fire_on_the_next_advance() {
    let (tx, mut rx) = ui_bus();
    let mut timer = ManualTimer::new();
    timer.register(-3.0, tx.timer_fire(TimerTicket::MaskFaded(1)));
    timer.register(f32::NAN, tx.timer_fire(TimerTicket::MaskFaded(2)));

    assert_eq!(timer.advance(0.0), 2);
    assert_eq!(fired(&mut rx), vec![1, 2]);
}

#[test]
fn clones_share_one_clock() {
    let (tx, _rx) = ui_bus();
    let mut timer = ManualTimer::new();
    let host = timer.clone();
    timer.register(1.0, tx.timer_fire(TimerTicket::MaskFaded(1)));

    host.advance(0.25);
    assert_eq!(timer.now(), 0.25);
    assert_eq!(host.pending_len(), 1);
}
