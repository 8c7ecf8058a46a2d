//! Identifier -> option map that persistence reads from and writes to

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::options::AnyOption;

/// Shared registry handle. Clones see the same entries.
///
/// Registering an identifier twice replaces the earlier option; entries are
/// never removed automatically.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    options: Rc<RefCell<HashMap<String, AnyOption>>>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: impl Into<String>, option: impl Into<AnyOption>) {
        let id = id.into();
        let option = option.into();
        debug!(id = %id, kind = option.kind(), "Registered option");
        if let Some(previous) = self.options.borrow_mut().insert(id.clone(), option) {
            warn!(id = %id, replaced = previous.kind(), "Option identifier reused, previous option replaced");
        }
    }

    pub fn get(&self, id: &str) -> Option<AnyOption> {
        self.options.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.options.borrow().contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Option<AnyOption> {
        self.options.borrow_mut().remove(id)
    }

    pub fn len(&self) -> usize {
        self.options.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.borrow().is_empty()
    }

    /// Identifiers in sorted order
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.options.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Snapshot of every entry, sorted by identifier.
    ///
    /// Taken up front so callers can run option callbacks that touch the
    /// registry while iterating.
    pub fn entries(&self) -> Vec<(String, AnyOption)> {
        let mut entries: Vec<(String, AnyOption)> = self
            .options
            .borrow()
            .iter()
            .map(|(id, option)| (id.clone(), option.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
