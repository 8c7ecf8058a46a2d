use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{OptionCell, SubscriptionId};

/// Stored dropdown state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DropdownValue {
    Single(String),
    Multi(Vec<String>),
}

impl DropdownValue {
    /// Selected entries, whatever the mode
    pub fn selected(&self) -> Vec<&str> {
        match self {
            DropdownValue::Single(value) => vec![value.as_str()],
            DropdownValue::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            DropdownValue::Single(value) => Some(value),
            DropdownValue::Multi(_) => None,
        }
    }
}

/// Anything a dropdown accepts as a new selection.
///
/// Saved configs may hold either an explicit list or a map of
/// candidate -> selected flag; both normalize to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DropdownSelection {
    One(String),
    List(Vec<String>),
    Map(BTreeMap<String, bool>),
}

impl From<&str> for DropdownSelection {
    fn from(value: &str) -> Self {
        DropdownSelection::One(value.to_string())
    }
}

impl From<String> for DropdownSelection {
    fn from(value: String) -> Self {
        DropdownSelection::One(value)
    }
}

impl From<Vec<String>> for DropdownSelection {
    fn from(values: Vec<String>) -> Self {
        DropdownSelection::List(values)
    }
}

impl From<Vec<&str>> for DropdownSelection {
    fn from(values: Vec<&str>) -> Self {
        DropdownSelection::List(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for DropdownSelection {
    fn from(values: [&str; N]) -> Self {
        DropdownSelection::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<BTreeMap<String, bool>> for DropdownSelection {
    fn from(map: BTreeMap<String, bool>) -> Self {
        DropdownSelection::Map(map)
    }
}

impl From<HashMap<String, bool>> for DropdownSelection {
    fn from(map: HashMap<String, bool>) -> Self {
        DropdownSelection::Map(map.into_iter().collect())
    }
}

impl From<DropdownValue> for DropdownSelection {
    fn from(value: DropdownValue) -> Self {
        match value {
            DropdownValue::Single(value) => DropdownSelection::One(value),
            DropdownValue::Multi(values) => DropdownSelection::List(values),
        }
    }
}

/// Single- or multi-select option over a fixed list of strings
#[derive(Debug, Clone)]
pub struct Dropdown {
    cell: OptionCell<DropdownValue>,
    values: Rc<[String]>,
    multi: bool,
}

impl Dropdown {
    /// Single-select dropdown starting at `initial`
    pub fn single(values: Vec<String>, initial: String) -> Self {
        Self {
            cell: OptionCell::new(DropdownValue::Single(initial)),
            values: values.into(),
            multi: false,
        }
    }

    /// Multi-select dropdown; `initial` is normalized like any other selection
    pub fn multi(values: Vec<String>, initial: Vec<String>) -> Self {
        let values: Rc<[String]> = values.into();
        let initial = canonical_selection(&values, DropdownSelection::List(initial));
        Self {
            cell: OptionCell::new(DropdownValue::Multi(initial)),
            values,
            multi: true,
        }
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Configured candidate strings
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self) -> DropdownValue {
        self.cell.value()
    }

    pub fn is_selected(&self, candidate: &str) -> bool {
        self.cell.with(|value| value.selected().contains(&candidate))
    }

    /// Normalize `selection` for this dropdown's mode and store it.
    ///
    /// Multi mode keeps configured values only, in configured order. Single
    /// mode takes a string as-is; a list or map picks its first selected
    /// entry and is ignored when nothing is selected.
    pub fn set_value(&self, selection: impl Into<DropdownSelection>) {
        let selection = selection.into();
        if self.multi {
            let selected = canonical_selection(&self.values, selection);
            self.cell.set_value(DropdownValue::Multi(selected));
            return;
        }

        let chosen = match selection {
            DropdownSelection::One(value) => Some(value),
            other => canonical_selection(&self.values, other).into_iter().next(),
        };
        match chosen {
            Some(value) => {
                if !self.values.contains(&value) {
                    debug!(value = %value, "Dropdown value is not one of the configured values");
                }
                self.cell.set_value(DropdownValue::Single(value));
            }
            None => warn!("Ignoring empty selection for single-select dropdown"),
        }
    }

    /// Flip one candidate in a multi-select dropdown (UI checkbox)
    pub fn toggle_candidate(&self, candidate: &str) {
        let mut selected: Vec<String> = self.cell.with(|value| {
            value.selected().into_iter().map(str::to_string).collect()
        });
        if let Some(pos) = selected.iter().position(|s| s == candidate) {
            selected.remove(pos);
        } else {
            selected.push(candidate.to_string());
        }
        self.set_value(selected);
    }

    pub fn on_changed(&self, callback: impl Fn(&DropdownValue) + 'static) -> SubscriptionId {
        self.cell.on_changed(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }

    /// Underlying cell (read/subscribe only through the dropdown API)
    pub fn cell(&self) -> &OptionCell<DropdownValue> {
        &self.cell
    }
}

/// Selected configured values, in configured order
fn canonical_selection(values: &[String], selection: DropdownSelection) -> Vec<String> {
    let picked: Vec<String> = match selection {
        DropdownSelection::One(value) => vec![value],
        DropdownSelection::List(list) => list,
        DropdownSelection::Map(map) => map
            .into_iter()
            .filter_map(|(key, selected)| selected.then_some(key))
            .collect(),
    };

    for unknown in picked.iter().filter(|p| !values.contains(p)) {
        warn!(value = %unknown, "Dropping selection that is not a configured dropdown value");
    }

    values
        .iter()
        .filter(|candidate| picked.contains(candidate))
        .cloned()
        .collect()
}
