//! Keyboard events and keybind dispatch
//!
//! Hosts feed raw key-down/key-up events into a [`KeybindDispatcher`], which
//! runs them through every registered keybind's state machine. A keybind that
//! is listening for a new binding swallows key-down events, and no other
//! keybind evaluates them. Key-ups still reach the other keybinds so a held
//! binding always releases.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::constants::keys;
use crate::options::{KeyHandling, Keybind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// One raw keyboard event, identified by the key's name (`"a"`, `"F1"`, `" "`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub fn down(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: KeyEventKind::Down,
        }
    }

    pub fn up(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: KeyEventKind::Up,
        }
    }
}

/// Map the literal space character onto the symbolic `Space` token
pub fn canonical_key(key: &str) -> &str {
    if key == keys::SPACE_CHAR { keys::SPACE } else { key }
}

/// True when a key press named `pressed` triggers a binding to `bound`.
///
/// `Space` and `" "` are interchangeable on both sides; the `None` sentinel
/// matches nothing.
pub fn keys_match(bound: &str, pressed: &str) -> bool {
    if bound == keys::NONE {
        return false;
    }
    canonical_key(bound) == canonical_key(pressed)
}

/// Result of dispatching one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A listening keybind took the event (rebinding in progress)
    Captured,
    /// Number of keybinds whose activation was evaluated
    Evaluated(usize),
}

/// Routes key events to every live keybind.
///
/// Cloning shares the same keybind list.
#[derive(Debug, Clone, Default)]
pub struct KeybindDispatcher {
    keybinds: Rc<RefCell<Vec<Keybind>>>,
}

impl KeybindDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, keybind: Keybind) {
        self.keybinds.borrow_mut().push(keybind);
    }

    pub fn len(&self) -> usize {
        self.keybinds.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keybinds.borrow().is_empty()
    }

    /// True while any keybind waits for its next key
    pub fn is_listening(&self) -> bool {
        self.keybinds.borrow().iter().any(Keybind::is_listening)
    }

    pub fn dispatch(&self, event: &KeyEvent) -> DispatchOutcome {
        trace!(key = %event.key, kind = ?event.kind, "Key event");

        // Snapshot: callbacks may register more keybinds
        let keybinds: Vec<Keybind> = self.keybinds.borrow().clone();

        let (listening, idle): (Vec<&Keybind>, Vec<&Keybind>) =
            keybinds.iter().partition(|k| k.is_listening());
        if !listening.is_empty() {
            for keybind in listening {
                keybind.handle_key_event(event);
            }
            if event.kind == KeyEventKind::Up {
                for keybind in idle {
                    keybind.handle_key_event(event);
                }
            }
            return DispatchOutcome::Captured;
        }

        let evaluated = keybinds
            .iter()
            .filter(|keybind| matches!(keybind.handle_key_event(event), KeyHandling::Activated(_)))
            .count();
        if evaluated > 0 {
            debug!(key = %event.key, kind = ?event.kind, evaluated, "Keybind event dispatched");
        }
        DispatchOutcome::Evaluated(evaluated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::KeybindMode;

    #[test]
    fn test_keys_match_space_both_directions() {
        assert!(keys_match("Space", " "));
        assert!(keys_match("Space", "Space"));
        assert!(keys_match(" ", "Space"));
        assert!(!keys_match("Space", "s"));
    }

    #[test]
    fn test_none_matches_nothing() {
        assert!(!keys_match("None", "None"));
        assert!(!keys_match("None", "a"));
    }

    #[test]
    fn test_dispatch_evaluates_all_matching() {
        let dispatcher = KeybindDispatcher::new();
        let a = Keybind::new("k", KeybindMode::Toggle);
        let b = Keybind::new("k", KeybindMode::Always);
        let c = Keybind::new("j", KeybindMode::Toggle);
        dispatcher.register(a.clone());
        dispatcher.register(b.clone());
        dispatcher.register(c.clone());

        assert_eq!(dispatcher.dispatch(&KeyEvent::down("k")), DispatchOutcome::Evaluated(2));
        assert!(a.state());
        assert!(b.state());
        assert!(!c.state());
    }

    #[test]
    fn test_listening_keybind_swallows_event() {
        let dispatcher = KeybindDispatcher::new();
        let rebinding = Keybind::new("a", KeybindMode::Toggle);
        let other = Keybind::new("f", KeybindMode::Toggle);
        dispatcher.register(rebinding.clone());
        dispatcher.register(other.clone());

        rebinding.begin_listening();
        assert!(dispatcher.is_listening());
        assert_eq!(dispatcher.dispatch(&KeyEvent::down("f")), DispatchOutcome::Captured);

        assert_eq!(rebinding.value(), "f");
        assert!(!other.state());
        assert!(!dispatcher.is_listening());
    }

    #[test]
    fn test_hold_releases_while_another_keybind_listens() {
        let dispatcher = KeybindDispatcher::new();
        let hold = Keybind::new("h", KeybindMode::Hold);
        let rebinding = Keybind::new("a", KeybindMode::Toggle);
        dispatcher.register(hold.clone());
        dispatcher.register(rebinding.clone());

        dispatcher.dispatch(&KeyEvent::down("h"));
        assert!(hold.state());

        rebinding.begin_listening();
        assert_eq!(dispatcher.dispatch(&KeyEvent::up("h")), DispatchOutcome::Captured);
        assert!(!hold.state());
        assert!(rebinding.is_listening());

        // Key-downs are still captured for the rebind
        dispatcher.dispatch(&KeyEvent::down("h"));
        assert!(!hold.state());
        assert_eq!(rebinding.value(), "h");
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key(" "), "Space");
        assert_eq!(canonical_key("Enter"), "Enter");
    }
}
