//! Controller layer: UI events, reducer-like state transitions, and command orchestration.

pub mod actions;
pub mod events;
pub mod orchestration;
pub mod state;
