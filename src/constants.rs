//! Toolkit-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the toolkit, providing a single source of truth for constant values.

/// Durable store layout
pub mod storage {
    /// Namespace used when the host never calls `set_folder`
    pub const DEFAULT_FOLDER: &str = "FluentUI";

    /// Suffix appended to a colorpicker identifier for its transparency channel
    pub const TRANSPARENCY_SUFFIX: &str = "_Transparency";

    /// Record name holding interface (theme) state, next to the config slots
    pub const INTERFACE_SETTINGS_KEY: &str = "InterfaceSettings";

    /// Config slot loaded automatically when the config section is built
    pub const DEFAULT_CONFIG_NAME: &str = "default";

    /// File extension used by the file-backed store
    pub const RECORD_EXTENSION: &str = "json";
}

/// Key identifiers
pub mod keys {
    /// Sentinel for a keybind that has never been bound; matches nothing
    pub const NONE: &str = "None";

    /// Symbolic token for the space bar
    pub const SPACE: &str = "Space";

    /// Literal character the space bar produces
    pub const SPACE_CHAR: &str = " ";
}

/// Control defaults
pub mod defaults {
    /// Default colorpicker value
    pub const COLOR: &str = "#60cdff";

    /// Fully opaque
    pub const TRANSPARENCY: f64 = 1.0;

    /// Window size when the config omits one
    pub const WINDOW_WIDTH: f32 = 580.0;
    pub const WINDOW_HEIGHT: f32 = 460.0;

    /// Width of the tab strip
    pub const TAB_WIDTH: f32 = 160.0;
}

/// Notification durations (seconds)
pub mod notify {
    /// Used when a notification does not specify a duration
    pub const DEFAULT_DURATION: f32 = 5.0;

    /// Save/load/delete reports
    pub const CONFIG_DURATION: f32 = 3.0;

    /// Config listing
    pub const LIST_DURATION: f32 = 5.0;

    /// Theme change report
    pub const THEME_DURATION: f32 = 2.0;
}

/// Interface control identifiers owned by the interface manager
pub mod interface {
    pub const THEME_SELECTOR: &str = "ThemeSelector";
    pub const WINDOW_TRANSPARENCY: &str = "WindowTransparency";
}

/// Settings file location
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "fluent-panel";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";

    /// Directory (under `APP_DIR`) used by the file-backed store
    pub const STORE_DIR: &str = "store";
}

/// Bounds enforced on loaded settings
pub mod validation {
    pub const MIN_WINDOW_WIDTH: f32 = 320.0;
    pub const MAX_WINDOW_WIDTH: f32 = 4096.0;
    pub const MIN_WINDOW_HEIGHT: f32 = 200.0;
    pub const MAX_WINDOW_HEIGHT: f32 = 4096.0;
    pub const MIN_TAB_WIDTH: f32 = 60.0;
    pub const MAX_TAB_WIDTH: f32 = 400.0;
}
