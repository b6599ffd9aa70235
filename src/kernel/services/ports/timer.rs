use crate::kernel::services::bus::TimerFire;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Delayed-callback service.
///
/// The kernel holds two of these: one on scaled game time and a real-time one
/// for waits that must not stop while time is paused.
pub trait Timer {
    fn register(&mut self, delay: f32, fire: TimerFire) -> TimerId;

    /// Unknown or already fired ids are ignored.
    fn unregister(&mut self, id: TimerId);
}
