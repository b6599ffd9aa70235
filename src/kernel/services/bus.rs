//! Completion bus: every asynchronous continuation comes back through here.
//!
//! Loaders, timers and close animations receive single-use handles
//! ([`LoadReply`], [`TimerFire`], [`CloseAnimDone`]). Completing a handle posts a
//! [`UiMessage`]; the host drains them on its own thread with `UiManager::pump`.

use std::sync::mpsc::{self, Receiver, SendError, Sender, TryRecvError};

use super::ports::ViewInstance;
use crate::kernel::popup::PopupKey;
use crate::kernel::toast::ToastKey;
use crate::kernel::window::WindowKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTicket {
    Window(WindowKey),
    Popup(PopupKey),
    LoadingMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTicket {
    WindowLoad(WindowKey),
    ToastExpired(ToastKey),
    ToastFaded(ToastKey),
    MaskFaded(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseAnimTicket(pub PopupKey);

#[derive(Debug)]
pub enum UiMessage {
    Loaded {
        ticket: LoadTicket,
        instance: Option<ViewInstance>,
    },
    TimerFired(TimerTicket),
    CloseAnimDone(CloseAnimTicket),
}

#[derive(Clone, Debug)]
pub struct UiBusSender {
    tx: Sender<UiMessage>,
}

#[derive(Debug)]
pub struct UiBusReceiver {
    rx: Receiver<UiMessage>,
}

pub fn ui_bus() -> (UiBusSender, UiBusReceiver) {
    let (tx, rx) = mpsc::channel();
    (UiBusSender { tx }, UiBusReceiver { rx })
}

impl UiBusSender {
    pub fn send(&self, msg: UiMessage) -> Result<(), SendError<UiMessage>> {
        self.tx.send(msg)
    }

    pub(crate) fn load_reply(&self, ticket: LoadTicket) -> LoadReply {
        LoadReply {
            ticket,
            tx: Some(self.clone()),
        }
    }

    pub(crate) fn timer_fire(&self, ticket: TimerTicket) -> TimerFire {
        TimerFire {
            ticket,
            tx: self.clone(),
        }
    }

    pub(crate) fn close_anim_done(&self, ticket: CloseAnimTicket) -> CloseAnimDone {
        CloseAnimDone {
            ticket,
            tx: Some(self.clone()),
        }
    }
}

impl UiBusReceiver {
    pub fn try_recv(&mut self) -> Result<UiMessage, TryRecvError> {
        self.rx.try_recv()
    }
}

/// Answer to one load request.
///
/// Dropping it undelivered counts as a failed load, so a request can never be
/// left without a completion.
#[derive(Debug)]
pub struct LoadReply {
    ticket: LoadTicket,
    tx: Option<UiBusSender>,
}

impl LoadReply {
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    pub fn deliver(mut self, instance: Option<ViewInstance>) {
        self.post(instance);
    }

    fn post(&mut self, instance: Option<ViewInstance>) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        let msg = UiMessage::Loaded {
            ticket: self.ticket,
            instance,
        };
        if tx.send(msg).is_err() {
            tracing::debug!(ticket = ?self.ticket, "ui bus closed, load reply dropped");
        }
    }
}

impl Drop for LoadReply {
    fn drop(&mut self) {
        self.post(None);
    }
}

/// Continuation registered with a timer. Dropping it (e.g. on unregister) does nothing.
#[derive(Debug)]
pub struct TimerFire {
    ticket: TimerTicket,
    tx: UiBusSender,
}

impl TimerFire {
    pub fn ticket(&self) -> TimerTicket {
        self.ticket
    }

    pub fn fire(self) {
        if self.tx.send(UiMessage::TimerFired(self.ticket)).is_err() {
            tracing::debug!(ticket = ?self.ticket, "ui bus closed, timer fire dropped");
        }
    }
}

/// Completion of one popup close animation.
///
/// Dropping it unsignalled counts as completion so a faulty animation cannot
/// keep its popup alive forever.
#[derive(Debug)]
pub struct CloseAnimDone {
    ticket: CloseAnimTicket,
    tx: Option<UiBusSender>,
}

impl CloseAnimDone {
    pub fn ticket(&self) -> CloseAnimTicket {
        self.ticket
    }

    pub fn signal(mut self) {
        self.post();
    }

    fn post(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        if tx.send(UiMessage::CloseAnimDone(self.ticket)).is_err() {
            tracing::debug!(ticket = ?self.ticket, "ui bus closed, close animation signal dropped");
        }
    }
}

impl Drop for CloseAnimDone {
    fn drop(&mut self) {
        self.post();
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/bus.rs"]
mod tests;
