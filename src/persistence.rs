//! Named configuration slots
//!
//! A [`SaveManager`] snapshots every registered option into a flat JSON
//! object stored under `"<folder>/<name>"`, and restores it later. Colour
//! pickers write a second `<id>_Transparency` key. Outcomes are reported to
//! the library's notifier; failures are logged and returned, never raised.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{ButtonConfig, DialogConfig, InputConfig, ParagraphConfig};
use crate::constants::{interface, notify, storage};
use crate::library::{Library, Tab};
use crate::notify::Notification;
use crate::options::MalformedValue;
use crate::store::{DurableStore, StoreError, store_key};

/// Identifier of the config-name input added by `build_config_section`
pub const CONFIG_NAME_INPUT: &str = "ConfigName";

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("configuration {0:?} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration {name:?} is not valid JSON: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration {0:?} is not a JSON object")]
    NotAnObject(String),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("option {id:?} has no saveable value: {source}")]
    Unsaveable {
        id: String,
        #[source]
        source: MalformedValue,
    },
}

/// What a load changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Values and transparencies applied
    pub applied: usize,
    /// Record keys that could not be applied to their option
    pub skipped: Vec<String>,
}

struct SaveManagerInner {
    library: Library,
    store: Rc<dyn DurableStore>,
    folder: RefCell<String>,
    ignore: RefCell<BTreeSet<String>>,
    ignore_theme: Cell<bool>,
}

/// Saves and loads the library's registry. Clones share state.
#[derive(Clone)]
pub struct SaveManager {
    inner: Rc<SaveManagerInner>,
}

impl SaveManager {
    pub fn new(library: Library, store: Rc<dyn DurableStore>) -> Self {
        Self {
            inner: Rc::new(SaveManagerInner {
                library,
                store,
                folder: RefCell::new(storage::DEFAULT_FOLDER.to_string()),
                ignore: RefCell::new(BTreeSet::new()),
                ignore_theme: Cell::new(false),
            }),
        }
    }

    pub fn folder(&self) -> String {
        self.inner.folder.borrow().clone()
    }

    pub fn set_folder(&self, folder: impl Into<String>) {
        let folder = folder.into();
        debug!(folder = %folder, "Config folder set");
        *self.inner.folder.borrow_mut() = folder;
    }

    /// Replace the set of identifiers left out of saved records
    pub fn set_ignore_indexes<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.inner.ignore.borrow_mut() = ids.into_iter().map(Into::into).collect();
    }

    /// Leave the interface manager's controls out of saved records
    pub fn ignore_theme_settings(&self) {
        self.inner.ignore_theme.set(true);
    }

    pub fn is_ignored(&self, id: &str) -> bool {
        if self.inner.ignore_theme.get()
            && (id == interface::THEME_SELECTOR || id == interface::WINDOW_TRANSPARENCY)
        {
            return true;
        }
        self.inner.ignore.borrow().contains(id)
    }

    fn key(&self, name: &str) -> String {
        store_key(&self.inner.folder.borrow(), name)
    }

    /// Current registry values as a saved record
    pub fn snapshot(&self) -> Result<Map<String, Value>, PersistError> {
        let mut record = Map::new();
        for (id, option) in self.inner.library.registry().entries() {
            if self.is_ignored(&id) {
                continue;
            }
            let value = option
                .to_json()
                .map_err(|source| PersistError::Unsaveable { id: id.clone(), source })?;
            if let Some(transparency) = option.transparency()
                && let Some(number) = serde_json::Number::from_f64(transparency)
            {
                record.insert(format!("{id}{}", storage::TRANSPARENCY_SUFFIX), Value::Number(number));
            }
            record.insert(id, value);
        }
        Ok(record)
    }

    fn try_save(&self, name: &str) -> Result<usize, PersistError> {
        let record = self.snapshot()?;
        let json = serde_json::to_string(&record)?;
        self.inner.store.set(&self.key(name), &json)?;
        Ok(record.len())
    }

    /// Write the registry under `name`. Returns the number of keys written.
    pub fn save(&self, name: &str) -> Result<usize, PersistError> {
        match self.try_save(name) {
            Ok(keys) => {
                info!(config = %name, folder = %self.folder(), keys, "Saved configuration");
                self.report(
                    "Configuration Saved",
                    format!("Successfully saved configuration: {name}"),
                );
                Ok(keys)
            }
            Err(e) => {
                error!(config = %name, error = %e, "Failed to save configuration");
                self.report("Save Error", "Failed to save configuration");
                Err(e)
            }
        }
    }

    /// Parsed record for `name`, without applying it
    pub fn record(&self, name: &str) -> Result<Map<String, Value>, PersistError> {
        let Some(json) = self.inner.store.get(&self.key(name))? else {
            return Err(PersistError::NotFound(name.to_string()));
        };
        let record: Value = serde_json::from_str(&json).map_err(|source| PersistError::Parse {
            name: name.to_string(),
            source,
        })?;
        match record {
            Value::Object(record) => Ok(record),
            _ => Err(PersistError::NotAnObject(name.to_string())),
        }
    }

    fn try_load(&self, name: &str) -> Result<LoadSummary, PersistError> {
        let record = self.record(name)?;
        let registry = self.inner.library.registry();
        let mut summary = LoadSummary::default();

        // Transparency goes first and silently, so colour subscribers see it
        for (key, value) in &record {
            let Some(base) = key.strip_suffix(storage::TRANSPARENCY_SUFFIX) else {
                continue;
            };
            let Some(option) = registry.get(base) else {
                continue;
            };
            match option.restore_transparency(value) {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    warn!(config = %name, key = %key, error = %e, "Skipping malformed transparency");
                    summary.skipped.push(key.clone());
                }
            }
        }

        for (key, value) in &record {
            if key
                .strip_suffix(storage::TRANSPARENCY_SUFFIX)
                .is_some_and(|base| registry.contains(base))
            {
                continue;
            }
            let Some(option) = registry.get(key) else {
                debug!(config = %name, key = %key, "No option registered for saved key");
                continue;
            };
            match option.apply_json(value) {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    warn!(config = %name, key = %key, error = %e, "Skipping malformed saved value");
                    summary.skipped.push(key.clone());
                }
            }
        }
        Ok(summary)
    }

    /// Restore the registry from `name`.
    ///
    /// Values already applied stay applied if a later key is skipped; there
    /// is no rollback.
    pub fn load(&self, name: &str) -> Result<LoadSummary, PersistError> {
        match self.try_load(name) {
            Ok(summary) => {
                info!(config = %name, applied = summary.applied, skipped = summary.skipped.len(), "Loaded configuration");
                let mut report = Notification::new(
                    "Configuration Loaded",
                    format!("Successfully loaded configuration: {name}"),
                )
                .duration(notify::CONFIG_DURATION);
                if !summary.skipped.is_empty() {
                    report = report.sub_content(format!("Skipped: {}", summary.skipped.join(", ")));
                }
                self.inner.library.notify(report);
                Ok(summary)
            }
            Err(PersistError::NotFound(missing)) => {
                warn!(config = %missing, "Configuration not found");
                self.report("Load Error", format!("Configuration \"{missing}\" not found"));
                Err(PersistError::NotFound(missing))
            }
            Err(e) => {
                error!(config = %name, error = %e, "Failed to load configuration");
                self.report("Load Error", "Failed to load configuration");
                Err(e)
            }
        }
    }

    /// Remove the record for `name`; removing a missing record is not an error
    pub fn delete(&self, name: &str) -> Result<(), PersistError> {
        match self.inner.store.remove(&self.key(name)) {
            Ok(()) => {
                info!(config = %name, "Deleted configuration");
                self.report(
                    "Configuration Deleted",
                    format!("Successfully deleted configuration: {name}"),
                );
                Ok(())
            }
            Err(e) => {
                error!(config = %name, error = %e, "Failed to delete configuration");
                self.report("Delete Error", "Failed to delete configuration");
                Err(e.into())
            }
        }
    }

    /// Names saved in the current folder, sorted
    pub fn get_configs(&self) -> Vec<String> {
        let keys = match self.inner.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!(error = %e, "Failed to enumerate configurations");
                return Vec::new();
            }
        };
        let prefix = format!("{}/", self.folder());
        let mut names: Vec<String> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|name| !name.contains('/') && *name != storage::INTERFACE_SETTINGS_KEY)
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// Report the saved names through the notifier
    pub fn list_configs(&self) -> Vec<String> {
        let configs = self.get_configs();
        let content = if configs.is_empty() {
            "No configurations found".to_string()
        } else {
            configs.join(", ")
        };
        self.inner.library.notify(
            Notification::new("Saved Configurations", content).duration(notify::LIST_DURATION),
        );
        configs
    }

    /// Load `default` if it has been saved
    pub fn autoload_default(&self) -> Option<LoadSummary> {
        if !self
            .get_configs()
            .iter()
            .any(|name| name == storage::DEFAULT_CONFIG_NAME)
        {
            debug!("No default configuration to load");
            return None;
        }
        self.load(storage::DEFAULT_CONFIG_NAME).ok()
    }

    /// Add the config-name input and Save/Load/Delete/List buttons to `tab`.
    ///
    /// Loading `default` is left to [`SaveManager::autoload_default`], which
    /// the host runs once every tab has been built.
    pub fn build_config_section(&self, tab: &Tab) {
        tab.add_paragraph(ParagraphConfig::new(
            "Configuration",
            "Save and load your settings",
        ));

        let name_input = tab.add_input(
            CONFIG_NAME_INPUT,
            InputConfig::new("Configuration Name")
                .with_default(storage::DEFAULT_CONFIG_NAME)
                .placeholder("Enter configuration name"),
        );
        let config_name = {
            let input = name_input.clone();
            move || {
                let name = input.value().trim().to_string();
                if name.is_empty() {
                    storage::DEFAULT_CONFIG_NAME.to_string()
                } else {
                    name
                }
            }
        };

        let manager = self.clone();
        let name = config_name.clone();
        tab.add_button(
            ButtonConfig::new("Save Configuration", move || {
                let _ = manager.save(&name());
            })
            .description("Save current settings"),
        );

        let manager = self.clone();
        let name = config_name.clone();
        tab.add_button(
            ButtonConfig::new("Load Configuration", move || {
                let _ = manager.load(&name());
            })
            .description("Load saved settings"),
        );

        let manager = self.clone();
        let name = config_name;
        let confirm_tab = tab.clone();
        tab.add_button(
            ButtonConfig::new("Delete Configuration", move || {
                let target = name();
                let manager = manager.clone();
                let confirmed = target.clone();
                confirm_tab.dialog(
                    DialogConfig::new(
                        "Delete Configuration",
                        format!("Are you sure you want to delete configuration \"{target}\"?"),
                    )
                    .button("Delete", move || {
                        let _ = manager.delete(&confirmed);
                    })
                    .button("Cancel", || {}),
                );
            })
            .description("Delete a saved configuration"),
        );

        let manager = self.clone();
        tab.add_button(
            ButtonConfig::new("List Configurations", move || {
                manager.list_configs();
            })
            .description("Show all saved configurations"),
        );
    }

    fn report(&self, title: &str, content: impl Into<String>) {
        self.inner
            .library
            .notify(Notification::new(title, content).duration(notify::CONFIG_DURATION));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ColorpickerConfig, DropdownConfig, SliderConfig, TabConfig, ToggleConfig, WindowConfig,
    };
    use crate::library::Element;
    use crate::notify::ToastQueue;
    use crate::options::{DropdownValue, Keybind, KeybindMode};
    use crate::store::MemoryStore;

    struct Fixture {
        library: Library,
        tab: Tab,
        store: MemoryStore,
        toasts: ToastQueue,
        manager: SaveManager,
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryStore::new())
    }

    fn fixture_with(store: MemoryStore) -> Fixture {
        let library = Library::new();
        let toasts = ToastQueue::new();
        library.set_notifier(Rc::new(toasts.clone()));
        let window = library.create_window(WindowConfig::new("Test"));
        let tab = window.add_tab(TabConfig::new("Main"));
        let manager = SaveManager::new(library.clone(), Rc::new(store.clone()));
        Fixture {
            library,
            tab,
            store,
            toasts,
            manager,
        }
    }

    fn last_title(toasts: &ToastQueue) -> String {
        toasts.snapshot().last().map(|n| n.title.clone()).unwrap_or_default()
    }

    #[test]
    fn test_round_trip_restores_values_and_transparency() {
        let f = fixture();
        let toggle = f.tab.add_toggle("Flag", ToggleConfig::new("Flag"));
        let slider = f.tab.add_slider("Speed", SliderConfig::new("Speed", 0.0, 10.0).rounding(1));
        let picker = f.tab.add_colorpicker("Colors", ColorpickerConfig::new("Colors").transparency(1.0));

        toggle.set_value(true);
        slider.set_value(7.5);
        picker.set_value("#ff0000".to_string());
        picker.set_transparency(0.4);
        f.manager.save("t1").unwrap();

        toggle.set_value(false);
        slider.set_value(1.0);
        picker.set_value("#000000".to_string());
        picker.set_transparency(1.0);

        let toggle_fired = Rc::new(Cell::new(0));
        let slider_fired = Rc::new(Cell::new(0));
        let picker_fired = Rc::new(Cell::new(0));
        let (t, s, p) = (Rc::clone(&toggle_fired), Rc::clone(&slider_fired), Rc::clone(&picker_fired));
        toggle.on_changed(move |_| t.set(t.get() + 1));
        slider.on_changed(move |_| s.set(s.get() + 1));
        picker.on_changed(move |_| p.set(p.get() + 1));

        let summary = f.manager.load("t1").unwrap();

        assert!(toggle.value());
        assert_eq!(slider.value(), 7.5);
        assert_eq!(picker.value(), "#ff0000");
        assert_eq!(picker.transparency(), 0.4);
        assert_eq!(toggle_fired.get(), 1);
        assert_eq!(slider_fired.get(), 1);
        // Only the colour write notifies; the transparency restore is silent
        assert_eq!(picker_fired.get(), 1);
        assert_eq!(summary.applied, 4);
        assert!(summary.skipped.is_empty());
        assert_eq!(last_title(&f.toasts), "Configuration Loaded");
    }

    #[test]
    fn test_record_shape() {
        let f = fixture();
        f.tab.add_slider("Speed", SliderConfig::new("Speed", 0.0, 10.0).with_default(5.0));
        f.tab.add_dropdown("Mode", DropdownConfig::new("Mode", ["Slow", "Fast"]).with_default(crate::config::DropdownDefault::Value("Fast".into())));
        f.tab.add_colorpicker("Colors", ColorpickerConfig::new("Colors").transparency(0.8));
        f.manager.save("shape").unwrap();

        let raw = f.store.get("FluentUI/shape").unwrap().unwrap();
        let record: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(record["Speed"], serde_json::json!(5));
        assert_eq!(record["Mode"], "Fast");
        assert_eq!(record["Colors"], "#60cdff");
        assert_eq!(record["Colors_Transparency"], 0.8);
        assert!(record.get("Speed_Transparency").is_none());
    }

    #[test]
    fn test_load_missing_config_changes_nothing() {
        let f = fixture();
        let toggle = f.tab.add_toggle("Flag", ToggleConfig::new("Flag").with_default(true));
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        toggle.on_changed(move |_| flag.set(true));

        let result = f.manager.load("missing");

        assert!(matches!(result, Err(PersistError::NotFound(ref name)) if name == "missing"));
        assert!(toggle.value());
        assert!(!fired.get());
        let report = f.toasts.snapshot().pop().unwrap();
        assert_eq!(report.title, "Load Error");
        assert_eq!(report.content, "Configuration \"missing\" not found");
    }

    #[test]
    fn test_delete_keeps_other_configs() {
        let f = fixture();
        let toggle = f.tab.add_toggle("Flag", ToggleConfig::new("Flag"));
        toggle.set_value(true);
        f.manager.save("a").unwrap();
        toggle.set_value(false);
        f.manager.save("b").unwrap();
        let before_b = f.store.get("FluentUI/b").unwrap();

        f.manager.delete("a").unwrap();

        assert_eq!(f.manager.get_configs(), vec!["b"]);
        assert_eq!(f.store.get("FluentUI/b").unwrap(), before_b);
        assert_eq!(last_title(&f.toasts), "Configuration Deleted");
    }

    #[test]
    fn test_quota_failure_is_reported_not_raised() {
        let f = fixture_with(MemoryStore::with_quota(16));
        f.tab.add_input("Name", InputConfig::new("Name").with_default("a long value that will not fit"));

        let result = f.manager.save("big");

        assert!(matches!(result, Err(PersistError::Store(StoreError::QuotaExceeded { .. }))));
        assert!(f.manager.get_configs().is_empty());
        let report = f.toasts.snapshot().pop().unwrap();
        assert_eq!(report.title, "Save Error");
        assert_eq!(report.duration, Some(3.0));
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        let f = fixture();
        let toggle = f.tab.add_toggle("Flag", ToggleConfig::new("Flag"));
        let slider = f.tab.add_slider("Speed", SliderConfig::new("Speed", 0.0, 10.0));
        let input = f.tab.add_input("Name", InputConfig::new("Name"));
        f.store
            .set(
                "FluentUI/odd",
                r#"{"Flag": "yes", "Speed": "4", "Name": 12, "Unknown": 1}"#,
            )
            .unwrap();

        let summary = f.manager.load("odd").unwrap();

        assert!(!toggle.value());
        assert_eq!(slider.value(), 4.0);
        assert_eq!(input.value(), "12");
        assert_eq!(summary.applied, 2);
        assert_eq!(summary.skipped, vec!["Flag"]);
        let report = f.toasts.snapshot().pop().unwrap();
        assert_eq!(report.sub_content.as_deref(), Some("Skipped: Flag"));
    }

    #[test]
    fn test_unparseable_record_is_a_load_error() {
        let f = fixture();
        f.store.set("FluentUI/bad", "{oops").unwrap();
        assert!(matches!(f.manager.load("bad"), Err(PersistError::Parse { .. })));
        f.store.set("FluentUI/list", "[1, 2]").unwrap();
        assert!(matches!(f.manager.load("list"), Err(PersistError::NotAnObject(_))));
        assert_eq!(last_title(&f.toasts), "Load Error");
    }

    #[test]
    fn test_ignore_indexes_and_theme() {
        let f = fixture();
        f.tab.add_toggle("Flag", ToggleConfig::new("Flag"));
        f.tab.add_toggle("Secret", ToggleConfig::new("Secret"));
        f.tab.add_toggle(interface::WINDOW_TRANSPARENCY, ToggleConfig::new("Transparency"));
        f.manager.set_ignore_indexes(["Secret"]);
        f.manager.ignore_theme_settings();

        f.manager.save("x").unwrap();

        let raw = f.store.get("FluentUI/x").unwrap().unwrap();
        let record: Value = serde_json::from_str(&raw).unwrap();
        assert!(record.get("Flag").is_some());
        assert!(record.get("Secret").is_none());
        assert!(record.get(interface::WINDOW_TRANSPARENCY).is_none());
    }

    #[test]
    fn test_get_configs_filters_folder() {
        let f = fixture();
        f.store.set("FluentUI/zeta", "{}").unwrap();
        f.store.set("FluentUI/alpha", "{}").unwrap();
        f.store.set("FluentUI/InterfaceSettings", "{}").unwrap();
        f.store.set("Other/beta", "{}").unwrap();

        assert_eq!(f.manager.get_configs(), vec!["alpha", "zeta"]);
        f.manager.set_folder("Other");
        assert_eq!(f.manager.get_configs(), vec!["beta"]);
    }

    #[test]
    fn test_multi_dropdown_and_keybind_round_trip() {
        let f = fixture();
        let pick = f.tab.add_dropdown("Pick", DropdownConfig::new("Pick", ["a", "b", "c"]).multi());
        let bind = Keybind::new("None", KeybindMode::Hold);
        f.library.registry().register("Bind", bind.clone());

        pick.set_value(["c", "a"]);
        bind.set_value("F", None);
        f.manager.save("mix").unwrap();
        pick.set_value(Vec::<String>::new());
        bind.set_value("G", None);
        f.manager.load("mix").unwrap();

        assert_eq!(pick.value(), DropdownValue::Multi(vec!["a".into(), "c".into()]));
        assert_eq!(bind.value(), "F");
        assert_eq!(bind.mode(), KeybindMode::Hold);
    }

    #[test]
    fn test_autoload_reaches_controls_added_after_section() {
        let f = fixture();
        let early = f.tab.add_toggle("Flag", ToggleConfig::new("Flag"));
        f.store
            .set("FluentUI/default", r#"{"Flag": true, "Later": true}"#)
            .unwrap();

        f.manager.build_config_section(&f.tab);
        assert!(!early.value());

        let later_tab = f.library.windows().remove(0).add_tab(TabConfig::new("Later"));
        let later = later_tab.add_toggle("Later", ToggleConfig::new("Later"));

        let summary = f.manager.autoload_default().unwrap();
        assert_eq!(summary.applied, 2);
        assert!(early.value());
        assert!(later.value());
    }

    #[test]
    fn test_autoload_without_default_is_noop() {
        let f = fixture();
        f.manager.save("other").unwrap();
        assert!(f.manager.autoload_default().is_none());
    }

    #[test]
    fn test_config_section_buttons_in_order() {
        let f = fixture();
        f.manager.build_config_section(&f.tab);

        let buttons: Vec<String> = f
            .tab
            .elements()
            .into_iter()
            .filter_map(|e| match e {
                Element::Button(b) => Some(b.title),
                _ => None,
            })
            .collect();
        assert_eq!(
            buttons,
            vec![
                "Save Configuration",
                "Load Configuration",
                "Delete Configuration",
                "List Configurations"
            ]
        );
    }

    #[test]
    fn test_config_section_buttons() {
        let f = fixture();
        f.tab.add_toggle("Flag", ToggleConfig::new("Flag"));
        f.manager.build_config_section(&f.tab);
        let window = f.library.windows().remove(0);

        let press = |title: &str| {
            for element in f.tab.elements() {
                if let Element::Button(b) = element
                    && b.title == title
                {
                    (b.callback)();
                }
            }
        };

        let Some(crate::options::AnyOption::Input(name)) = f.library.option(CONFIG_NAME_INPUT) else {
            panic!("expected config name input");
        };
        name.set_value("mine".to_string());
        press("Save Configuration");
        assert!(f.manager.get_configs().contains(&"mine".to_string()));

        press("Delete Configuration");
        assert_eq!(window.dialogs().len(), 1);
        assert!(f.manager.get_configs().contains(&"mine".to_string()));
        window.press_dialog_button(0, 0);
        assert!(!f.manager.get_configs().contains(&"mine".to_string()));

        press("List Configurations");
        let report = f.toasts.snapshot().pop().unwrap();
        assert_eq!(report.title, "Saved Configurations");
        assert_eq!(report.content, "No configurations found");
        assert_eq!(report.duration, Some(5.0));
    }
}
