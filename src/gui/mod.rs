//! egui front-end for library windows

pub mod components;
pub mod constants;
pub mod keys;
mod manager;

pub use manager::{Panel, run_gui};
