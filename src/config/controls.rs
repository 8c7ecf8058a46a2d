//! Per-control configuration
//!
//! Every field a control factory recognises is listed here with its
//! default. Callbacks are optional and shared (`Rc`) so a config can be
//! cloned into the tab that renders it.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::options::KeybindMode;

/// Interface colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Dark" => Some(Theme::Dark),
            "Light" => Some(Theme::Light),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_title: Option<String>,
    #[serde(default = "default_tab_width")]
    pub tab_width: f32,
    #[serde(default = "default_size")]
    pub size: (f32, f32),
    /// Blurred translucent background where the host supports it
    #[serde(default)]
    pub acrylic: bool,
    #[serde(default)]
    pub theme: Theme,
    /// Key that collapses/expands the window body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimize_key: Option<String>,
}

fn default_tab_width() -> f32 {
    defaults::TAB_WIDTH
}

fn default_size() -> (f32, f32) {
    (defaults::WINDOW_WIDTH, defaults::WINDOW_HEIGHT)
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sub_title: None,
            tab_width: default_tab_width(),
            size: default_size(),
            acrylic: false,
            theme: Theme::default(),
            minimize_key: None,
        }
    }

    pub fn sub_title(mut self, sub_title: impl Into<String>) -> Self {
        self.sub_title = Some(sub_title.into());
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn tab_width(mut self, width: f32) -> Self {
        self.tab_width = width;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn minimize_key(mut self, key: impl Into<String>) -> Self {
        self.minimize_key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabConfig {
    pub title: String,
    pub icon: Option<String>,
}

impl TabConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: None,
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphConfig {
    pub title: String,
    pub content: String,
}

impl ParagraphConfig {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Clone)]
pub struct ButtonConfig {
    pub title: String,
    pub description: Option<String>,
    pub callback: Rc<dyn Fn()>,
}

impl ButtonConfig {
    pub fn new(title: impl Into<String>, callback: impl Fn() + 'static) -> Self {
        Self {
            title: title.into(),
            description: None,
            callback: Rc::new(callback),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToggleConfig {
    pub title: String,
    pub description: Option<String>,
    pub default: bool,
}

impl ToggleConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, value: bool) -> Self {
        self.default = value;
        self
    }
}

#[derive(Clone)]
pub struct SliderConfig {
    pub title: String,
    pub description: Option<String>,
    /// Starting value; `min` when unset
    pub default: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// Fractional digits; unset means integer values
    pub rounding: Option<u32>,
    /// Called with every value the UI produces
    pub callback: Option<Rc<dyn Fn(f64)>>,
}

impl SliderConfig {
    pub fn new(title: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            title: title.into(),
            description: None,
            default: None,
            min,
            max,
            rounding: None,
            callback: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, value: f64) -> Self {
        self.default = Some(value);
        self
    }

    pub fn rounding(mut self, digits: u32) -> Self {
        self.rounding = Some(digits);
        self
    }

    pub fn callback(mut self, callback: impl Fn(f64) + 'static) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn initial(&self) -> f64 {
        self.default.unwrap_or(self.min)
    }
}

/// Initial dropdown selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DropdownDefault {
    /// First value (single) or nothing (multi)
    #[default]
    Unset,
    /// 1-based position in `values`
    Index(usize),
    Value(String),
    Values(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DropdownConfig {
    pub title: String,
    pub description: Option<String>,
    pub values: Vec<String>,
    pub multi: bool,
    pub default: DropdownDefault,
}

impl DropdownConfig {
    pub fn new<S: Into<String>>(title: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            title: title.into(),
            values: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    pub fn with_default(mut self, default: DropdownDefault) -> Self {
        self.default = default;
        self
    }

    /// Starting value for single-select mode
    pub fn initial_single(&self) -> String {
        let by_index = |index: usize| index.checked_sub(1).and_then(|i| self.values.get(i)).cloned();
        let chosen = match &self.default {
            DropdownDefault::Index(index) => by_index(*index),
            DropdownDefault::Value(value) if !value.is_empty() => Some(value.clone()),
            DropdownDefault::Values(values) => values.first().cloned(),
            _ => None,
        };
        chosen
            .or_else(|| self.values.first().cloned())
            .unwrap_or_default()
    }

    /// Starting value for multi-select mode
    pub fn initial_multi(&self) -> Vec<String> {
        match &self.default {
            DropdownDefault::Values(values) => values.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorpickerConfig {
    pub title: String,
    pub description: Option<String>,
    /// Hex colour; `#60cdff` when unset
    pub default: Option<String>,
    /// Starting transparency; the transparency slider is only shown when set
    pub transparency: Option<f64>,
}

impl ColorpickerConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, color: impl Into<String>) -> Self {
        self.default = Some(color.into());
        self
    }

    pub fn transparency(mut self, transparency: f64) -> Self {
        self.transparency = Some(transparency);
        self
    }

    pub fn initial_color(&self) -> String {
        self.default
            .clone()
            .unwrap_or_else(|| defaults::COLOR.to_string())
    }
}

#[derive(Clone, Default)]
pub struct KeybindConfig {
    pub title: String,
    pub mode: KeybindMode,
    /// Bound key; the `None` sentinel when unset
    pub default: Option<String>,
    /// Called with every activation change
    pub callback: Option<Rc<dyn Fn(bool)>>,
    /// Called with the new key after a rebind
    pub changed_callback: Option<Rc<dyn Fn(&str)>>,
}

impl KeybindConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: KeybindMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_default(mut self, key: impl Into<String>) -> Self {
        self.default = Some(key.into());
        self
    }

    pub fn callback(mut self, callback: impl Fn(bool) + 'static) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn changed_callback(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.changed_callback = Some(Rc::new(callback));
        self
    }
}

#[derive(Clone, Default)]
pub struct InputConfig {
    pub title: String,
    pub default: String,
    pub placeholder: String,
    /// Render as a number field; the value stays text
    pub numeric: bool,
    /// Only commit on Enter instead of on every edit
    pub finished: bool,
    pub callback: Option<Rc<dyn Fn(&str)>>,
}

impl InputConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn finished(mut self) -> Self {
        self.finished = true;
        self
    }

    pub fn callback(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }
}

#[derive(Clone)]
pub struct DialogButton {
    pub title: String,
    pub callback: Rc<dyn Fn()>,
}

impl DialogButton {
    pub fn new(title: impl Into<String>, callback: impl Fn() + 'static) -> Self {
        Self {
            title: title.into(),
            callback: Rc::new(callback),
        }
    }
}

/// Modal dialog; clicking any button runs its callback and closes the dialog
#[derive(Clone)]
pub struct DialogConfig {
    pub title: String,
    pub content: String,
    pub buttons: Vec<DialogButton>,
}

impl DialogConfig {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            buttons: Vec::new(),
        }
    }

    pub fn button(mut self, title: impl Into<String>, callback: impl Fn() + 'static) -> Self {
        self.buttons.push(DialogButton::new(title, callback));
        self
    }
}
