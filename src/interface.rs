//! Interface appearance settings
//!
//! Theme choice is written to `"<folder>/InterfaceSettings"` as soon as it
//! changes. Window transparency is session state driven by its toggle.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{ButtonConfig, DropdownConfig, DropdownDefault, ParagraphConfig, Theme, ToggleConfig};
use crate::constants::{interface, notify, storage};
use crate::library::{Library, Tab};
use crate::notify::Notification;
use crate::store::{DurableStore, store_key};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct InterfaceSettings {
    #[serde(default)]
    theme: Theme,
}

struct InterfaceInner {
    library: Library,
    store: Rc<dyn DurableStore>,
    folder: RefCell<String>,
    theme: Cell<Theme>,
    transparent: Cell<bool>,
}

/// Theme and window transparency. Clones share state.
#[derive(Clone)]
pub struct InterfaceManager {
    inner: Rc<InterfaceInner>,
}

impl InterfaceManager {
    pub fn new(library: Library, store: Rc<dyn DurableStore>) -> Self {
        Self {
            inner: Rc::new(InterfaceInner {
                library,
                store,
                folder: RefCell::new(storage::DEFAULT_FOLDER.to_string()),
                theme: Cell::new(Theme::default()),
                transparent: Cell::new(false),
            }),
        }
    }

    pub fn set_folder(&self, folder: impl Into<String>) {
        *self.inner.folder.borrow_mut() = folder.into();
    }

    pub fn theme(&self) -> Theme {
        self.inner.theme.get()
    }

    pub fn window_transparency(&self) -> bool {
        self.inner.transparent.get()
    }

    /// Switch theme and persist it
    pub fn set_theme(&self, theme: Theme) {
        self.inner.theme.set(theme);
        info!(theme = %theme, "Theme set");
        self.save_settings();
    }

    fn key(&self) -> String {
        store_key(&self.inner.folder.borrow(), storage::INTERFACE_SETTINGS_KEY)
    }

    fn save_settings(&self) {
        let settings = InterfaceSettings { theme: self.theme() };
        let json = match serde_json::to_string(&settings) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to serialize interface settings");
                return;
            }
        };
        if let Err(e) = self.inner.store.set(&self.key(), &json) {
            error!(error = %e, "Failed to save interface settings");
        }
    }

    /// Apply the stored theme, if any. Returns the theme applied.
    pub fn load_settings(&self) -> Option<Theme> {
        let json = match self.inner.store.get(&self.key()) {
            Ok(Some(json)) => json,
            Ok(None) => {
                debug!("No saved interface settings");
                return None;
            }
            Err(e) => {
                error!(error = %e, "Failed to read interface settings");
                return None;
            }
        };
        match serde_json::from_str::<InterfaceSettings>(&json) {
            Ok(settings) => {
                self.inner.theme.set(settings.theme);
                info!(theme = %settings.theme, "Loaded interface settings");
                Some(settings.theme)
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable interface settings");
                None
            }
        }
    }

    /// Add the theme dropdown, transparency toggle and reset button to `tab`
    pub fn build_interface_section(&self, tab: &Tab) {
        self.load_settings();

        tab.add_paragraph(ParagraphConfig::new(
            "Interface Settings",
            "Customize the appearance of the interface",
        ));

        let theme_dropdown = tab.add_dropdown(
            interface::THEME_SELECTOR,
            DropdownConfig::new("Theme", [Theme::Dark.as_str(), Theme::Light.as_str()])
                .description("Select interface theme")
                .with_default(DropdownDefault::Value(self.theme().as_str().to_string())),
        );
        let weak = Rc::downgrade(&self.inner);
        theme_dropdown.on_changed(move |value| {
            let Some(manager) = upgrade(&weak) else {
                return;
            };
            let Some(theme) = value.as_single().and_then(Theme::parse) else {
                warn!(value = ?value, "Unknown theme selected");
                return;
            };
            manager.set_theme(theme);
            manager.inner.library.notify(
                Notification::new("Theme Changed", format!("Theme set to {theme}"))
                    .duration(notify::THEME_DURATION),
            );
        });

        let transparency_toggle = tab.add_toggle(
            interface::WINDOW_TRANSPARENCY,
            ToggleConfig::new("Window Transparency")
                .description("Enable transparent window background (if supported)"),
        );
        let weak = Rc::downgrade(&self.inner);
        transparency_toggle.on_changed(move |enabled| {
            if let Some(inner) = weak.upgrade() {
                inner.transparent.set(*enabled);
                debug!(enabled, "Window transparency changed");
            }
        });

        let weak = Rc::downgrade(&self.inner);
        tab.add_button(
            ButtonConfig::new("Reset Interface Settings", move || {
                let Some(manager) = upgrade(&weak) else {
                    return;
                };
                manager.set_theme(Theme::Dark);
                theme_dropdown.set_value(Theme::Dark.as_str());
                transparency_toggle.set_value(false);
                manager.inner.library.notify(
                    Notification::new("Interface Reset", "Interface settings have been reset to defaults")
                        .duration(notify::CONFIG_DURATION),
                );
            })
            .description("Reset to default interface settings"),
        );
    }
}

fn upgrade(weak: &Weak<InterfaceInner>) -> Option<InterfaceManager> {
    weak.upgrade().map(|inner| InterfaceManager { inner })
}
