//! Toolkit context, windows and tabs
//!
//! A [`Library`] is created once per host application and shared by handle
//! with every window, tab and manager. It owns the option registry, the
//! keybind dispatcher and the (optional) notifier. Tabs expose the
//! `add_*` control factories: each creates an option, registers it under the
//! caller's identifier and records an [`Element`] for the renderer.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::config::{
    ButtonConfig, ColorpickerConfig, DialogConfig, DropdownConfig, InputConfig, KeybindConfig,
    ParagraphConfig, SliderConfig, TabConfig, ToggleConfig, WindowConfig,
};
use crate::constants::{defaults, keys};
use crate::hotkeys::{DispatchOutcome, KeyEvent, KeyEventKind, KeybindDispatcher, keys_match};
use crate::notify::{Notification, Notifier};
use crate::options::{AnyOption, Colorpicker, Dropdown, Input, Keybind, OptionCell, Slider, Toggle};
use crate::registry::OptionRegistry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

struct LibraryInner {
    registry: OptionRegistry,
    keybinds: KeybindDispatcher,
    notifier: RefCell<Option<Rc<dyn Notifier>>>,
    windows: RefCell<Vec<Window>>,
    unloaded: Cell<bool>,
}

/// Shared toolkit context. Clones refer to the same context.
#[derive(Clone)]
pub struct Library {
    inner: Rc<LibraryInner>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(LibraryInner {
                registry: OptionRegistry::new(),
                keybinds: KeybindDispatcher::new(),
                notifier: RefCell::new(None),
                windows: RefCell::new(Vec::new()),
                unloaded: Cell::new(false),
            }),
        }
    }

    pub fn version(&self) -> &'static str {
        VERSION
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.inner.registry
    }

    pub fn keybinds(&self) -> &KeybindDispatcher {
        &self.inner.keybinds
    }

    /// Registered option by identifier
    pub fn option(&self, id: &str) -> Option<AnyOption> {
        self.inner.registry.get(id)
    }

    pub fn set_notifier(&self, notifier: Rc<dyn Notifier>) {
        *self.inner.notifier.borrow_mut() = Some(notifier);
    }

    pub fn clear_notifier(&self) {
        *self.inner.notifier.borrow_mut() = None;
    }

    /// Report to the notifier, if one is set
    pub fn notify(&self, notification: Notification) {
        let notifier = self.inner.notifier.borrow().clone();
        match notifier {
            Some(notifier) => notifier.notify(notification),
            None => debug!(title = %notification.title, "No notifier set, dropping notification"),
        }
    }

    pub fn create_window(&self, config: WindowConfig) -> Window {
        info!(title = %config.title, "Creating window");
        let window = Window {
            library: self.clone(),
            state: Rc::new(RefCell::new(WindowState {
                config,
                tabs: Vec::new(),
                selected: None,
                minimized: false,
                closed: false,
                dialogs: Vec::new(),
            })),
        };
        self.inner.windows.borrow_mut().push(window.clone());
        window
    }

    pub fn windows(&self) -> Vec<Window> {
        self.inner.windows.borrow().clone()
    }

    /// Feed a raw key event to keybinds, then to window minimise keys.
    ///
    /// Events captured by a keybind that is listening for a new key stop here.
    pub fn dispatch_key(&self, event: &KeyEvent) -> DispatchOutcome {
        if self.is_unloaded() {
            return DispatchOutcome::Evaluated(0);
        }
        let outcome = self.inner.keybinds.dispatch(event);
        if outcome == DispatchOutcome::Captured {
            return outcome;
        }
        for window in self.windows() {
            window.handle_minimize_key(event);
        }
        outcome
    }

    /// Close every window and stop reacting to input
    pub fn unload(&self) {
        for window in self.windows() {
            window.close();
        }
        self.inner.windows.borrow_mut().clear();
        self.inner.unloaded.set(true);
        info!("Library unloaded");
    }

    pub fn is_unloaded(&self) -> bool {
        self.inner.unloaded.get()
    }
}

/// Something a tab renders, in insertion order
#[derive(Clone)]
pub enum Element {
    Paragraph(ParagraphConfig),
    Button(ButtonConfig),
    Toggle {
        id: String,
        config: ToggleConfig,
        option: Toggle,
    },
    Slider {
        id: String,
        config: SliderConfig,
        option: Slider,
    },
    Dropdown {
        id: String,
        config: DropdownConfig,
        option: Dropdown,
    },
    Colorpicker {
        id: String,
        config: ColorpickerConfig,
        option: Colorpicker,
    },
    Keybind {
        id: String,
        config: KeybindConfig,
        option: Keybind,
    },
    Input {
        id: String,
        config: InputConfig,
        option: Input,
    },
}

impl Element {
    /// Registry identifier, for controls
    pub fn id(&self) -> Option<&str> {
        match self {
            Element::Paragraph(_) | Element::Button(_) => None,
            Element::Toggle { id, .. }
            | Element::Slider { id, .. }
            | Element::Dropdown { id, .. }
            | Element::Colorpicker { id, .. }
            | Element::Keybind { id, .. }
            | Element::Input { id, .. } => Some(id),
        }
    }
}

struct WindowState {
    config: WindowConfig,
    tabs: Vec<Tab>,
    /// 0-based index into `tabs`
    selected: Option<usize>,
    minimized: bool,
    closed: bool,
    dialogs: Vec<DialogConfig>,
}

/// Window handle
#[derive(Clone)]
pub struct Window {
    library: Library,
    state: Rc<RefCell<WindowState>>,
}

impl Window {
    pub fn config(&self) -> WindowConfig {
        self.state.borrow().config.clone()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Add a tab; the first tab added becomes the selected one
    pub fn add_tab(&self, config: TabConfig) -> Tab {
        debug!(title = %config.title, "Adding tab");
        let tab = Tab {
            library: self.library.clone(),
            window: Rc::downgrade(&self.state),
            state: Rc::new(RefCell::new(TabState {
                config,
                elements: Vec::new(),
            })),
        };
        let mut state = self.state.borrow_mut();
        state.tabs.push(tab.clone());
        if state.selected.is_none() {
            state.selected = Some(0);
        }
        tab
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.borrow().tabs.clone()
    }

    /// Select by 1-based position; out-of-range indices are ignored
    pub fn select_tab(&self, index: usize) -> bool {
        let mut state = self.state.borrow_mut();
        if index < 1 || index > state.tabs.len() {
            warn!(index, tabs = state.tabs.len(), "Ignoring out-of-range tab selection");
            return false;
        }
        state.selected = Some(index - 1);
        true
    }

    /// 1-based position of the selected tab
    pub fn selected_index(&self) -> Option<usize> {
        self.state.borrow().selected.map(|i| i + 1)
    }

    pub fn selected_tab(&self) -> Option<Tab> {
        let state = self.state.borrow();
        state.selected.and_then(|i| state.tabs.get(i).cloned())
    }

    pub fn toggle_minimize(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.minimized = !state.minimized;
        state.minimized
    }

    pub fn is_minimized(&self) -> bool {
        self.state.borrow().minimized
    }

    pub fn close(&self) {
        self.state.borrow_mut().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Queue a modal dialog for the renderer
    pub fn dialog(&self, config: DialogConfig) {
        self.state.borrow_mut().dialogs.push(config);
    }

    pub fn dialogs(&self) -> Vec<DialogConfig> {
        self.state.borrow().dialogs.clone()
    }

    /// Run a dialog button's callback and close the dialog
    pub fn press_dialog_button(&self, dialog: usize, button: usize) {
        let callback = {
            let mut state = self.state.borrow_mut();
            if dialog >= state.dialogs.len() {
                return;
            }
            let config = state.dialogs.remove(dialog);
            config.buttons.get(button).map(|b| Rc::clone(&b.callback))
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Close a dialog without running any callback
    pub fn dismiss_dialog(&self, dialog: usize) {
        let mut state = self.state.borrow_mut();
        if dialog < state.dialogs.len() {
            state.dialogs.remove(dialog);
        }
    }

    fn handle_minimize_key(&self, event: &KeyEvent) {
        if event.kind != KeyEventKind::Down || self.is_closed() {
            return;
        }
        let minimize_key = self.state.borrow().config.minimize_key.clone();
        if let Some(key) = minimize_key
            && keys_match(&key, &event.key)
        {
            let minimized = self.toggle_minimize();
            debug!(key = %key, minimized, "Window minimise key pressed");
        }
    }
}

struct TabState {
    config: TabConfig,
    elements: Vec<Element>,
}

/// Tab handle exposing the control factories
#[derive(Clone)]
pub struct Tab {
    library: Library,
    window: Weak<RefCell<WindowState>>,
    state: Rc<RefCell<TabState>>,
}

impl Tab {
    pub fn title(&self) -> String {
        self.state.borrow().config.title.clone()
    }

    pub fn icon(&self) -> Option<String> {
        self.state.borrow().config.icon.clone()
    }

    pub fn elements(&self) -> Vec<Element> {
        self.state.borrow().elements.clone()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Open a dialog on the window owning this tab
    pub fn dialog(&self, config: DialogConfig) {
        match self.window.upgrade() {
            Some(window) => window.borrow_mut().dialogs.push(config),
            None => warn!(title = %config.title, "Tab has no window, dropping dialog"),
        }
    }

    fn push(&self, element: Element) {
        self.state.borrow_mut().elements.push(element);
    }

    pub fn add_paragraph(&self, config: ParagraphConfig) {
        self.push(Element::Paragraph(config));
    }

    pub fn add_button(&self, config: ButtonConfig) {
        self.push(Element::Button(config));
    }

    pub fn add_toggle(&self, id: &str, config: ToggleConfig) -> Toggle {
        let toggle = OptionCell::new(config.default);
        self.library.registry().register(id, toggle.clone());
        self.push(Element::Toggle {
            id: id.to_string(),
            config,
            option: toggle.clone(),
        });
        toggle
    }

    pub fn add_slider(&self, id: &str, config: SliderConfig) -> Slider {
        let slider = Slider::new(config.initial(), config.min, config.max, config.rounding);
        self.library.registry().register(id, slider.clone());
        self.push(Element::Slider {
            id: id.to_string(),
            config,
            option: slider.clone(),
        });
        slider
    }

    pub fn add_dropdown(&self, id: &str, config: DropdownConfig) -> Dropdown {
        let dropdown = if config.multi {
            Dropdown::multi(config.values.clone(), config.initial_multi())
        } else {
            Dropdown::single(config.values.clone(), config.initial_single())
        };
        self.library.registry().register(id, dropdown.clone());
        self.push(Element::Dropdown {
            id: id.to_string(),
            config,
            option: dropdown.clone(),
        });
        dropdown
    }

    pub fn add_colorpicker(&self, id: &str, config: ColorpickerConfig) -> Colorpicker {
        let picker = Colorpicker::new(
            config.initial_color(),
            config.transparency.unwrap_or(defaults::TRANSPARENCY),
        );
        self.library.registry().register(id, picker.clone());
        self.push(Element::Colorpicker {
            id: id.to_string(),
            config,
            option: picker.clone(),
        });
        picker
    }

    pub fn add_keybind(&self, id: &str, config: KeybindConfig) -> Keybind {
        let key = config.default.clone().unwrap_or_else(|| keys::NONE.to_string());
        let keybind = Keybind::new(key, config.mode);
        if let Some(callback) = config.callback.clone() {
            keybind.on_activated(move |active| callback(active));
        }
        if let Some(callback) = config.changed_callback.clone() {
            keybind.on_key_changed(move |key| callback(key));
        }
        self.library.keybinds().register(keybind.clone());
        self.library.registry().register(id, keybind.clone());
        self.push(Element::Keybind {
            id: id.to_string(),
            config,
            option: keybind.clone(),
        });
        keybind
    }

    pub fn add_input(&self, id: &str, config: InputConfig) -> Input {
        let input = OptionCell::new(config.default.clone());
        self.library.registry().register(id, input.clone());
        self.push(Element::Input {
            id: id.to_string(),
            config,
            option: input.clone(),
        });
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DropdownDefault;
    use crate::notify::ToastQueue;
    use crate::options::{DropdownValue, KeybindMode};

    fn window() -> (Library, Window) {
        let library = Library::new();
        let window = library.create_window(WindowConfig::new("Test").minimize_key("RightControl"));
        (library, window)
    }

    #[test]
    fn test_factories_register_options() {
        let (library, window) = window();
        let tab = window.add_tab(TabConfig::new("Main"));

        tab.add_toggle("Flag", ToggleConfig::new("Flag").with_default(true));
        tab.add_slider("Speed", SliderConfig::new("Speed", 0.0, 10.0).with_default(5.0));
        tab.add_dropdown("Mode", DropdownConfig::new("Mode", ["Slow", "Fast"]));
        tab.add_colorpicker("Colors", ColorpickerConfig::new("Colors").transparency(0.5));
        tab.add_keybind("Bind", KeybindConfig::new("Bind"));
        tab.add_input("Name", InputConfig::new("Name").with_default("abc"));
        tab.add_paragraph(ParagraphConfig::new("Hello", "World"));

        assert_eq!(library.registry().len(), 6);
        assert_eq!(tab.elements().len(), 7);
        assert!(matches!(library.option("Mode"), Some(AnyOption::Dropdown(_))));
        let Some(AnyOption::Dropdown(mode)) = library.option("Mode") else {
            panic!("expected dropdown");
        };
        assert_eq!(mode.value(), DropdownValue::Single("Slow".to_string()));
        let Some(AnyOption::Keybind(bind)) = library.option("Bind") else {
            panic!("expected keybind");
        };
        assert_eq!(bind.value(), "None");
        assert_eq!(bind.mode(), KeybindMode::Toggle);
    }

    #[test]
    fn test_registry_handle_is_the_returned_option() {
        let (library, window) = window();
        let tab = window.add_tab(TabConfig::new("Main"));
        let toggle = tab.add_toggle("Flag", ToggleConfig::new("Flag"));

        toggle.set_value(true);

        let Some(AnyOption::Toggle(registered)) = library.option("Flag") else {
            panic!("expected toggle");
        };
        assert!(registered.value());
        assert!(registered.ptr_eq(&toggle));
    }

    #[test]
    fn test_keybind_callbacks_from_config() {
        let (library, window) = window();
        let tab = window.add_tab(TabConfig::new("Main"));
        let log = Rc::new(RefCell::new(Vec::new()));
        let changed = Rc::new(RefCell::new(String::new()));
        let (l, c) = (Rc::clone(&log), Rc::clone(&changed));

        let bind = tab.add_keybind(
            "Bind",
            KeybindConfig::new("Bind")
                .mode(KeybindMode::Hold)
                .with_default("e")
                .callback(move |active| l.borrow_mut().push(active))
                .changed_callback(move |key| *c.borrow_mut() = key.to_string()),
        );

        library.dispatch_key(&KeyEvent::down("e"));
        library.dispatch_key(&KeyEvent::up("e"));
        assert_eq!(*log.borrow(), vec![true, false]);

        bind.begin_listening();
        library.dispatch_key(&KeyEvent::down("q"));
        assert_eq!(*changed.borrow(), "q");
    }

    #[test]
    fn test_minimize_key() {
        let (library, window) = window();
        library.dispatch_key(&KeyEvent::down("RightControl"));
        assert!(window.is_minimized());
        library.dispatch_key(&KeyEvent::up("RightControl"));
        assert!(window.is_minimized());
        library.dispatch_key(&KeyEvent::down("RightControl"));
        assert!(!window.is_minimized());
    }

    #[test]
    fn test_minimize_key_not_fired_while_rebinding() {
        let (library, window) = window();
        let tab = window.add_tab(TabConfig::new("Main"));
        let bind = tab.add_keybind("Bind", KeybindConfig::new("Bind"));

        bind.begin_listening();
        library.dispatch_key(&KeyEvent::down("RightControl"));

        assert!(!window.is_minimized());
        assert_eq!(bind.value(), "RightControl");
    }

    #[test]
    fn test_select_tab_is_one_based() {
        let (_library, window) = window();
        window.add_tab(TabConfig::new("One"));
        window.add_tab(TabConfig::new("Two"));

        assert_eq!(window.selected_index(), Some(1));
        assert!(window.select_tab(2));
        assert_eq!(window.selected_tab().map(|t| t.title()), Some("Two".to_string()));
        assert!(!window.select_tab(0));
        assert!(!window.select_tab(3));
        assert_eq!(window.selected_index(), Some(2));
    }

    #[test]
    fn test_dialog_button_runs_callback_and_closes() {
        let (_library, window) = window();
        let tab = window.add_tab(TabConfig::new("Main"));
        let pressed = Rc::new(Cell::new(false));
        let p = Rc::clone(&pressed);

        tab.dialog(DialogConfig::new("Sure?", "Really").button("Yes", move || p.set(true)).button("No", || {}));
        assert_eq!(window.dialogs().len(), 1);

        window.press_dialog_button(0, 0);
        assert!(pressed.get());
        assert!(window.dialogs().is_empty());
    }

    #[test]
    fn test_notify_without_notifier_is_silent() {
        let library = Library::new();
        library.notify(Notification::new("Nobody", "listening"));

        let queue = ToastQueue::new();
        library.set_notifier(Rc::new(queue.clone()));
        library.notify(Notification::new("Somebody", "listening"));
        assert_eq!(queue.snapshot().len(), 1);
    }

    #[test]
    fn test_multi_dropdown_default_values() {
        let (library, window) = window();
        let tab = window.add_tab(TabConfig::new("Main"));
        tab.add_dropdown(
            "Pick",
            DropdownConfig::new("Pick", ["a", "b", "c"])
                .multi()
                .with_default(DropdownDefault::Values(vec!["c".to_string(), "a".to_string()])),
        );
        let Some(AnyOption::Dropdown(pick)) = library.option("Pick") else {
            panic!("expected dropdown");
        };
        assert_eq!(
            pick.value(),
            DropdownValue::Multi(vec!["a".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_unload_closes_windows() {
        let (library, window) = window();
        library.unload();
        assert!(window.is_closed());
        assert!(library.is_unloaded());
        assert!(library.windows().is_empty());
    }

    #[test]
    fn test_unloaded_library_ignores_keys() {
        let (library, window) = window();
        let tab = window.add_tab(TabConfig::new("Main"));
        let bind = tab.add_keybind("Bind", KeybindConfig::new("Bind").mode(KeybindMode::Toggle).with_default("k"));

        library.unload();
        assert_eq!(library.dispatch_key(&KeyEvent::down("k")), DispatchOutcome::Evaluated(0));
        assert!(!bind.state());
    }
}
