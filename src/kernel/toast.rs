//! Single-slot toast.
//!
//! A toast expires on the real-time timer so pausing game time never pins it
//! on screen; its out-transition wait runs on the scaled timer. "Begin close"
//! detaches the toast from the slot, "closed" hands its display back to the
//! display cache and pools the record.

use slotmap::new_key_type;

use super::pool::{PoolStats, ProcessPool, Recyclable};
use super::services::bus::{TimerTicket, UiBusSender};
use super::services::ports::{Timer, TimerId, ToastFactory, ToastView, UiConfig};

new_key_type! {
    pub struct ToastKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastPhase {
    #[default]
    Idle,
    Showing,
    Closing,
}

#[derive(Default)]
pub struct ToastRecord {
    pub content: String,
    pub duration: f32,
    pub phase: ToastPhase,
    display: Option<Box<dyn ToastView>>,
    expire_timer: Option<TimerId>,
    fade_timer: Option<TimerId>,
}

impl Recyclable for ToastRecord {
    fn recycle(&mut self) {
        self.content.clear();
        self.duration = 0.0;
        self.phase = ToastPhase::Idle;
        self.display = None;
        self.expire_timer = None;
        self.fade_timer = None;
    }
}

pub struct ToastController {
    pool: ProcessPool<ToastKey, ToastRecord>,
    current: Option<ToastKey>,
    displays: Vec<Box<dyn ToastView>>,
    factory: Box<dyn ToastFactory>,
}

impl ToastController {
    pub fn new(factory: Box<dyn ToastFactory>) -> Self {
        Self {
            pool: ProcessPool::new(),
            current: None,
            displays: Vec::new(),
            factory,
        }
    }

    pub fn current(&self) -> Option<ToastKey> {
        self.current
    }

    pub fn current_content(&self) -> Option<&str> {
        let key = self.current?;
        self.pool.get(key).map(|r| r.content.as_str())
    }

    pub fn phase(&self, key: ToastKey) -> Option<ToastPhase> {
        self.pool.get(key).map(|r| r.phase)
    }

    /// Toasts still on screen, the current one included.
    pub fn on_screen(&self) -> usize {
        self.pool
            .iter()
            .filter(|(_, r)| r.phase != ToastPhase::Idle)
            .count()
    }

    pub fn cached_displays(&self) -> usize {
        self.displays.len()
    }

    pub fn show(
        &mut self,
        content: &str,
        duration: f32,
        realtime: &mut dyn Timer,
        bus: &UiBusSender,
    ) -> ToastKey {
        if let Some(prev) = self.current.take() {
            self.force_close(prev, realtime);
        }
        let mut display = match self.displays.pop() {
            Some(display) => display,
            None => self.factory.create(),
        };
        display.show(content);

        let key = self.pool.acquire();
        let expire = realtime.register(duration, bus.timer_fire(TimerTicket::ToastExpired(key)));
        if let Some(record) = self.pool.get_mut(key) {
            record.content.push_str(content);
            record.duration = duration;
            record.phase = ToastPhase::Showing;
            record.display = Some(display);
            record.expire_timer = Some(expire);
        }
        self.current = Some(key);
        tracing::debug!(content, duration, "toast shown");
        key
    }

    /// Begins the animated close of the current toast. False when there is none.
    pub fn dismiss(
        &mut self,
        realtime: &mut dyn Timer,
        scaled: &mut dyn Timer,
        bus: &UiBusSender,
        config: &UiConfig,
    ) -> bool {
        let Some(key) = self.current else {
            return false;
        };
        self.begin_close(key, realtime, scaled, bus, config);
        true
    }

    pub fn on_expired(
        &mut self,
        key: ToastKey,
        realtime: &mut dyn Timer,
        scaled: &mut dyn Timer,
        bus: &UiBusSender,
        config: &UiConfig,
    ) {
        match self.pool.get_mut(key) {
            Some(record) if record.phase == ToastPhase::Showing => {
                record.expire_timer = None;
                self.begin_close(key, realtime, scaled, bus, config);
            }
            _ => tracing::debug!("expiry for a toast that is no longer showing"),
        }
    }

    pub fn on_faded(&mut self, key: ToastKey) {
        match self.pool.get_mut(key) {
            Some(record) if record.phase == ToastPhase::Closing => {
                record.fade_timer = None;
                self.finish(key);
            }
            _ => tracing::debug!("fade end for a toast that is not closing"),
        }
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    fn begin_close(
        &mut self,
        key: ToastKey,
        realtime: &mut dyn Timer,
        scaled: &mut dyn Timer,
        bus: &UiBusSender,
        config: &UiConfig,
    ) {
        if self.current == Some(key) {
            self.current = None;
        }
        let Some(record) = self.pool.get_mut(key) else {
            return;
        };
        if let Some(timer) = record.expire_timer.take() {
            realtime.unregister(timer);
        }
        record.phase = ToastPhase::Closing;
        let transition = record.display.as_mut().map_or(0.0, |d| d.play_out());
        let wait = config.close_wait(transition);
        record.fade_timer = Some(scaled.register(wait, bus.timer_fire(TimerTicket::ToastFaded(key))));
        tracing::debug!(content = %record.content, wait, "toast closing");
    }

    /// Replacement path: no out-transition, the display goes straight back.
    fn force_close(&mut self, key: ToastKey, realtime: &mut dyn Timer) {
        if let Some(record) = self.pool.get_mut(key) {
            if let Some(timer) = record.expire_timer.take() {
                realtime.unregister(timer);
            }
            tracing::debug!(content = %record.content, "toast replaced");
        }
        self.finish(key);
    }

    fn finish(&mut self, key: ToastKey) {
        let Some(record) = self.pool.get_mut(key) else {
            return;
        };
        if let Some(mut display) = record.display.take() {
            display.hide();
            self.displays.push(display);
        }
        self.pool.release(key);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/toast.rs"]
mod tests;
