//! GUI-specific constants for layout, colours and repaint intervals

use egui;

/// Smallest usable panel
pub const WINDOW_MIN_WIDTH: f32 = 320.0;
pub const WINDOW_MIN_HEIGHT: f32 = 200.0;

/// Layout spacing
pub const PADDING: f32 = 8.0;
pub const SECTION_SPACING: f32 = 15.0;
pub const ITEM_SPACING: f32 = 8.0;

/// Accent used for the selected tab and listening keybinds
pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x60, 0xcd, 0xff);

/// Notification overlay
pub const TOAST_WIDTH: f32 = 280.0;
pub const TOAST_MARGIN: f32 = 12.0;

/// Colour preview next to the transparency slider
pub const SWATCH_SIZE: f32 = 16.0;

/// Panel fill multiplier when window transparency is on
pub const TRANSPARENT_FILL: f32 = 0.8;

/// Repaint cadence so toasts expire without input
pub const REPAINT_INTERVAL_MS: u64 = 250;

/// Label on a keybind button while it waits for a key
pub const LISTENING_LABEL: &str = "...";
