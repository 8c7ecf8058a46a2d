//! Type-erased option handle and JSON conversion for persistence

use serde_json::{Number, Value};
use thiserror::Error;
use tracing::debug;

use super::{Colorpicker, Dropdown, DropdownSelection, Input, Keybind, Slider, Toggle};

/// A saved value that cannot be applied to the option it is keyed to
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot apply {found} to {kind} option")]
pub struct MalformedValue {
    pub kind: &'static str,
    pub found: String,
}

impl MalformedValue {
    fn new(kind: &'static str, found: &Value) -> Self {
        let mut found = found.to_string();
        if found.len() > 64 {
            let mut cut = 64;
            while !found.is_char_boundary(cut) {
                cut -= 1;
            }
            found.truncate(cut);
            found.push_str("...");
        }
        Self { kind, found }
    }
}

/// Any control's option, as stored in the registry
#[derive(Debug, Clone)]
pub enum AnyOption {
    Toggle(Toggle),
    Slider(Slider),
    Dropdown(Dropdown),
    Colorpicker(Colorpicker),
    Keybind(Keybind),
    Input(Input),
}

impl AnyOption {
    pub fn kind(&self) -> &'static str {
        match self {
            AnyOption::Toggle(_) => "toggle",
            AnyOption::Slider(_) => "slider",
            AnyOption::Dropdown(_) => "dropdown",
            AnyOption::Colorpicker(_) => "colorpicker",
            AnyOption::Keybind(_) => "keybind",
            AnyOption::Input(_) => "input",
        }
    }

    /// Current value in its saved-record form
    pub fn to_json(&self) -> Result<Value, MalformedValue> {
        Ok(match self {
            AnyOption::Toggle(toggle) => Value::Bool(toggle.value()),
            AnyOption::Slider(slider) => number_to_json(slider.value())
                .ok_or_else(|| MalformedValue {
                    kind: "slider",
                    found: slider.value().to_string(),
                })?,
            AnyOption::Dropdown(dropdown) => match dropdown.value() {
                super::DropdownValue::Single(value) => Value::String(value),
                super::DropdownValue::Multi(values) => {
                    Value::Array(values.into_iter().map(Value::String).collect())
                }
            },
            AnyOption::Colorpicker(picker) => Value::String(picker.value()),
            AnyOption::Keybind(keybind) => Value::String(keybind.value()),
            AnyOption::Input(input) => Value::String(input.value()),
        })
    }

    /// Transparency channel, for options that carry one
    pub fn transparency(&self) -> Option<f64> {
        match self {
            AnyOption::Colorpicker(picker) => Some(picker.transparency()),
            _ => None,
        }
    }

    /// Set the transparency channel without notifying subscribers
    pub fn restore_transparency(&self, value: &Value) -> Result<(), MalformedValue> {
        let AnyOption::Colorpicker(picker) = self else {
            return Err(MalformedValue::new(self.kind(), value));
        };
        let transparency = coerce_number(value).ok_or_else(|| MalformedValue::new("transparency", value))?;
        picker.restore_transparency(transparency.clamp(0.0, 1.0));
        Ok(())
    }

    /// Apply a saved value through the option's normal `set_value`, which
    /// notifies its subscribers. Lossless coercions are accepted; anything
    /// else is rejected without touching the option.
    pub fn apply_json(&self, value: &Value) -> Result<(), MalformedValue> {
        let malformed = || MalformedValue::new(self.kind(), value);
        match self {
            AnyOption::Toggle(toggle) => {
                let flag = match value {
                    Value::Bool(flag) => *flag,
                    Value::String(s) if s.eq_ignore_ascii_case("true") => true,
                    Value::String(s) if s.eq_ignore_ascii_case("false") => false,
                    Value::Number(n) if n.as_f64() == Some(1.0) => true,
                    Value::Number(n) if n.as_f64() == Some(0.0) => false,
                    _ => return Err(malformed()),
                };
                toggle.set_value(flag);
            }
            AnyOption::Slider(slider) => {
                let number = coerce_number(value).ok_or_else(malformed)?;
                slider.set_value(number);
            }
            AnyOption::Dropdown(dropdown) => {
                let selection = dropdown_selection(dropdown, value).ok_or_else(malformed)?;
                dropdown.set_value(selection);
            }
            AnyOption::Colorpicker(picker) => {
                let Value::String(color) = value else {
                    return Err(malformed());
                };
                picker.set_value(color.clone());
            }
            AnyOption::Keybind(keybind) => {
                let Value::String(key) = value else {
                    return Err(malformed());
                };
                keybind.set_value(key.clone(), None);
            }
            AnyOption::Input(input) => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return Err(malformed()),
                };
                input.set_value(text);
            }
        }
        Ok(())
    }
}

impl From<Toggle> for AnyOption {
    fn from(toggle: Toggle) -> Self {
        AnyOption::Toggle(toggle)
    }
}

impl From<Slider> for AnyOption {
    fn from(slider: Slider) -> Self {
        AnyOption::Slider(slider)
    }
}

impl From<Dropdown> for AnyOption {
    fn from(dropdown: Dropdown) -> Self {
        AnyOption::Dropdown(dropdown)
    }
}

impl From<Colorpicker> for AnyOption {
    fn from(picker: Colorpicker) -> Self {
        AnyOption::Colorpicker(picker)
    }
}

impl From<Keybind> for AnyOption {
    fn from(keybind: Keybind) -> Self {
        AnyOption::Keybind(keybind)
    }
}

impl From<Input> for AnyOption {
    fn from(input: Input) -> Self {
        AnyOption::Input(input)
    }
}

/// Whole numbers are written without a fractional part
fn number_to_json(value: f64) -> Option<Value> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Value::Number(Number::from(value as i64)))
    } else {
        Number::from_f64(value).map(Value::Number)
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn dropdown_selection(dropdown: &Dropdown, value: &Value) -> Option<DropdownSelection> {
    // Single-select configs may store a 1-based index
    if !dropdown.is_multi()
        && let Value::Number(n) = value
    {
        let index = n.as_u64()? as usize;
        let picked = dropdown.values().get(index.checked_sub(1)?)?;
        debug!(index, value = %picked, "Coerced dropdown index to value");
        return Some(DropdownSelection::One(picked.clone()));
    }
    serde_json::from_value(value.clone()).ok()
}
