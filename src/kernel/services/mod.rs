//! Services layer (ports + adapters).
//!
//! - `ports`: capability contracts the kernel consumes.
//! - `bus`: completion handles and the channel they report through.
//! - `adapters`: in-memory implementations of the ports plus config loading.

pub mod adapters;
pub mod bus;
pub mod ports;

pub use bus::{
    ui_bus, CloseAnimDone, CloseAnimTicket, LoadReply, LoadTicket, TimerFire, TimerTicket,
    UiBusReceiver, UiBusSender, UiMessage,
};
