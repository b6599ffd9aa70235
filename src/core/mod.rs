//! Frontend-neutral input types shared by the kernel and its hosts.

pub mod event;

pub use event::KeyCode;
