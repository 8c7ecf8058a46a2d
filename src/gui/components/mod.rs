pub mod controls;
pub mod overlays;
