//! Terminal host for the demo binary (crossterm + ratatui).
//!
//! Kept apart from `kernel` so the core never depends on terminal crates.

pub mod crossterm;
pub mod demo;
pub mod render;
pub mod session;
