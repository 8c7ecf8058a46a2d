//! Configuration for controls and for the host application
//!
//! - **controls**: one struct per control kind, listing every field and its default
//! - **settings**: AppSettings used by the binary (JSON file + env overrides)

pub mod controls;
pub mod settings;

// Re-export commonly used types
pub use controls::{
    ButtonConfig, ColorpickerConfig, DialogButton, DialogConfig, DropdownConfig, DropdownDefault,
    InputConfig, KeybindConfig, ParagraphConfig, SliderConfig, TabConfig, Theme, ToggleConfig,
    WindowConfig,
};
pub use settings::AppSettings;
