use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{OptionCell, SubscriptionId};
use crate::constants::keys;
use crate::hotkeys::{KeyEvent, KeyEventKind, canonical_key, keys_match};

/// How key presses map onto the keybind's activation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeybindMode {
    /// Every press activates
    Always,
    /// Every press flips the state
    #[default]
    Toggle,
    /// Active while the key is held down
    Hold,
}

/// What a key event did to a keybind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyHandling {
    /// The keybind was listening and consumed the event (new key on key-down)
    Captured(Option<String>),
    /// Activation state was (re)evaluated to this value
    Activated(bool),
    /// Event did not concern this keybind
    Ignored,
}

struct KeybindState {
    mode: KeybindMode,
    active: bool,
    listening: bool,
    next_id: SubscriptionId,
    activation: Vec<(SubscriptionId, Rc<dyn Fn(bool)>)>,
    clicks: Vec<(SubscriptionId, Rc<dyn Fn()>)>,
    key_changed: Vec<(SubscriptionId, Rc<dyn Fn(&str)>)>,
}

impl KeybindState {
    fn next_id(&mut self) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Key identifier option plus a latched activation state.
///
/// Value subscribers (`on_changed`) fire when the bound key is reassigned.
/// Activation subscribers (`on_activated`) fire with the new state whenever
/// a matching key event is evaluated. Click subscribers (`on_click`) fire on
/// activating key-downs only.
#[derive(Clone)]
pub struct Keybind {
    cell: OptionCell<String>,
    state: Rc<RefCell<KeybindState>>,
}

impl fmt::Debug for Keybind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Keybind")
            .field("key", &self.cell.value())
            .field("mode", &state.mode)
            .field("active", &state.active)
            .field("listening", &state.listening)
            .finish()
    }
}

impl Keybind {
    pub fn new(key: impl Into<String>, mode: KeybindMode) -> Self {
        Self {
            cell: OptionCell::new(key.into()),
            state: Rc::new(RefCell::new(KeybindState {
                mode,
                active: false,
                listening: false,
                next_id: 0,
                activation: Vec::new(),
                clicks: Vec::new(),
                key_changed: Vec::new(),
            })),
        }
    }

    /// Unbound keybind; the sentinel key never matches a keystroke
    pub fn unbound(mode: KeybindMode) -> Self {
        Self::new(keys::NONE, mode)
    }

    /// Bound key identifier
    pub fn value(&self) -> String {
        self.cell.value()
    }

    /// Rebind the key and optionally change the mode in one call
    pub fn set_value(&self, key: impl Into<String>, mode: Option<KeybindMode>) {
        if let Some(mode) = mode {
            self.state.borrow_mut().mode = mode;
        }
        self.cell.set_value(key.into());
    }

    pub fn mode(&self) -> KeybindMode {
        self.state.borrow().mode
    }

    pub fn set_mode(&self, mode: KeybindMode) {
        self.state.borrow_mut().mode = mode;
    }

    /// Latched activation state
    pub fn state(&self) -> bool {
        self.state.borrow().active
    }

    /// Overwrite the activation state without notifying anyone
    pub fn set_state(&self, active: bool) {
        self.state.borrow_mut().active = active;
    }

    pub fn is_listening(&self) -> bool {
        self.state.borrow().listening
    }

    /// Start waiting for the next key-down to become the bound key
    pub fn begin_listening(&self) {
        self.state.borrow_mut().listening = true;
        debug!(key = %self.cell.value(), "Keybind listening for a new key");
    }

    /// True when `pressed` triggers this keybind
    pub fn matches(&self, pressed: &str) -> bool {
        self.cell.with(|bound| keys_match(bound, pressed))
    }

    /// Run one raw key event through the state machine
    pub fn handle_key_event(&self, event: &KeyEvent) -> KeyHandling {
        if self.is_listening() {
            if event.kind != KeyEventKind::Down {
                return KeyHandling::Captured(None);
            }
            let key = canonical_key(&event.key).to_string();
            self.state.borrow_mut().listening = false;
            info!(key = %key, "Keybind rebound");
            self.cell.set_value(key.clone());
            self.fire_key_changed(&key);
            return KeyHandling::Captured(Some(key));
        }

        if !self.matches(&event.key) {
            return KeyHandling::Ignored;
        }

        let (mode, active) = {
            let state = self.state.borrow();
            (state.mode, state.active)
        };

        let next = match (mode, event.kind) {
            (KeybindMode::Always, KeyEventKind::Down) => true,
            (KeybindMode::Toggle, KeyEventKind::Down) => !active,
            (KeybindMode::Hold, KeyEventKind::Down) => true,
            (KeybindMode::Hold, KeyEventKind::Up) => false,
            (_, KeyEventKind::Up) => return KeyHandling::Ignored,
        };

        self.state.borrow_mut().active = next;
        if event.kind == KeyEventKind::Down {
            self.trigger_click();
        }
        self.fire_activation(next);
        KeyHandling::Activated(next)
    }

    pub fn on_changed(&self, callback: impl Fn(&String) + 'static) -> SubscriptionId {
        self.cell.on_changed(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }

    /// Subscribe to activation changes
    pub fn on_activated(&self, callback: impl Fn(bool) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.activation.push((id, Rc::new(callback)));
        id
    }

    /// Subscribe to activating key presses
    pub fn on_click(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.clicks.push((id, Rc::new(callback)));
        id
    }

    /// Subscribe to rebinds made by listening
    pub fn on_key_changed(&self, callback: impl Fn(&str) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.key_changed.push((id, Rc::new(callback)));
        id
    }

    /// Remove an activation, click or key-change subscriber
    pub fn remove_listener(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.activation.len() + state.clicks.len() + state.key_changed.len();
        state.activation.retain(|(sub_id, _)| *sub_id != id);
        state.clicks.retain(|(sub_id, _)| *sub_id != id);
        state.key_changed.retain(|(sub_id, _)| *sub_id != id);
        before != state.activation.len() + state.clicks.len() + state.key_changed.len()
    }

    /// Invoke click subscribers
    pub fn trigger_click(&self) {
        let clicks: Vec<_> = self
            .state
            .borrow()
            .clicks
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in clicks {
            callback();
        }
    }

    fn fire_activation(&self, active: bool) {
        let callbacks: Vec<_> = self
            .state
            .borrow()
            .activation
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(active);
        }
    }

    fn fire_key_changed(&self, key: &str) {
        let callbacks: Vec<_> = self
            .state
            .borrow()
            .key_changed
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(key);
        }
    }

    /// Underlying cell
    pub fn cell(&self) -> &OptionCell<String> {
        &self.cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn record_activations(keybind: &Keybind) -> Rc<RefCell<Vec<bool>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        keybind.on_activated(move |active| l.borrow_mut().push(active));
        log
    }

    #[test]
    fn test_toggle_mode_parity() {
        for presses in 0..7 {
            let keybind = Keybind::new("F", KeybindMode::Toggle);
            for _ in 0..presses {
                keybind.handle_key_event(&KeyEvent::down("F"));
                keybind.handle_key_event(&KeyEvent::up("F"));
            }
            assert_eq!(keybind.state(), presses % 2 == 1, "presses = {presses}");
        }
    }

    #[test]
    fn test_hold_mode_press_release() {
        let keybind = Keybind::new("Shift", KeybindMode::Hold);
        let log = record_activations(&keybind);

        keybind.handle_key_event(&KeyEvent::down("Shift"));
        assert!(keybind.state());
        keybind.handle_key_event(&KeyEvent::up("Shift"));
        assert!(!keybind.state());

        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn test_hold_mode_ignores_other_key_up() {
        let keybind = Keybind::new("Shift", KeybindMode::Hold);
        keybind.handle_key_event(&KeyEvent::down("Shift"));

        assert_eq!(keybind.handle_key_event(&KeyEvent::up("a")), KeyHandling::Ignored);
        assert!(keybind.state());
    }

    #[test]
    fn test_always_mode_fires_true_each_press() {
        let keybind = Keybind::new("q", KeybindMode::Always);
        let log = record_activations(&keybind);

        keybind.handle_key_event(&KeyEvent::down("q"));
        keybind.handle_key_event(&KeyEvent::up("q"));
        keybind.handle_key_event(&KeyEvent::down("q"));

        assert_eq!(*log.borrow(), vec![true, true]);
        assert!(keybind.state());
    }

    #[test]
    fn test_listening_captures_next_key_without_activation() {
        let keybind = Keybind::new("a", KeybindMode::Toggle);
        let log = record_activations(&keybind);
        let changed = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&changed);
        keybind.on_key_changed(move |k| c.borrow_mut().push(k.to_string()));

        keybind.begin_listening();
        let handled = keybind.handle_key_event(&KeyEvent::down("b"));

        assert_eq!(handled, KeyHandling::Captured(Some("b".to_string())));
        assert_eq!(keybind.value(), "b");
        assert!(!keybind.is_listening());
        assert!(log.borrow().is_empty());
        assert_eq!(*changed.borrow(), vec!["b".to_string()]);

        // Evaluation resumes on the next event
        keybind.handle_key_event(&KeyEvent::down("b"));
        assert_eq!(*log.borrow(), vec![true]);
    }

    #[test]
    fn test_listening_key_up_is_swallowed() {
        let keybind = Keybind::new("a", KeybindMode::Hold);
        keybind.begin_listening();
        assert_eq!(keybind.handle_key_event(&KeyEvent::up("a")), KeyHandling::Captured(None));
        assert!(keybind.is_listening());
    }

    #[test]
    fn test_space_is_canonicalized_and_matched_both_ways() {
        let keybind = Keybind::new("x", KeybindMode::Toggle);
        keybind.begin_listening();
        keybind.handle_key_event(&KeyEvent::down(" "));
        assert_eq!(keybind.value(), "Space");

        keybind.handle_key_event(&KeyEvent::down(" "));
        assert!(keybind.state());
        keybind.handle_key_event(&KeyEvent::down("Space"));
        assert!(!keybind.state());
    }

    #[test]
    fn test_unbound_never_matches() {
        let keybind = Keybind::unbound(KeybindMode::Always);
        assert_eq!(keybind.value(), "None");
        assert_eq!(keybind.handle_key_event(&KeyEvent::down("None")), KeyHandling::Ignored);
        assert!(!keybind.state());
    }

    #[test]
    fn test_set_value_with_mode() {
        let keybind = Keybind::new("a", KeybindMode::Toggle);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        keybind.on_changed(move |_| h.set(h.get() + 1));

        keybind.set_value("b", Some(KeybindMode::Hold));
        assert_eq!(keybind.mode(), KeybindMode::Hold);
        keybind.set_value("c", None);
        assert_eq!(keybind.mode(), KeybindMode::Hold);

        assert_eq!(keybind.value(), "c");
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_click_fires_on_key_down_only() {
        let keybind = Keybind::new("h", KeybindMode::Hold);
        let clicks = Rc::new(Cell::new(0));
        let c = Rc::clone(&clicks);
        keybind.on_click(move || c.set(c.get() + 1));

        keybind.handle_key_event(&KeyEvent::down("h"));
        keybind.handle_key_event(&KeyEvent::up("h"));

        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_remove_listener() {
        let keybind = Keybind::new("t", KeybindMode::Toggle);
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let id = keybind.on_activated(move |active| l.borrow_mut().push(active));

        keybind.handle_key_event(&KeyEvent::down("t"));
        assert!(keybind.remove_listener(id));
        assert!(!keybind.remove_listener(id));
        keybind.handle_key_event(&KeyEvent::down("t"));

        assert_eq!(*log.borrow(), vec![true]);
    }
}
