//! Controller layer: UI events and command orchestration between the egui shell and the
//! session controller running on the backend worker.

pub mod events;
pub mod orchestration;
