//! Translate egui input into toolkit key events

use egui;

use crate::hotkeys::KeyEvent;

/// Key event for an egui key press/release. Auto-repeat presses are dropped
/// so a held key reads as one key-down.
pub fn key_event(event: &egui::Event) -> Option<KeyEvent> {
    let egui::Event::Key {
        key, pressed, repeat, ..
    } = event
    else {
        return None;
    };
    if *repeat {
        return None;
    }
    let name = key.name();
    Some(if *pressed {
        KeyEvent::down(name)
    } else {
        KeyEvent::up(name)
    })
}

/// egui reports modifiers as state, not key events; diff two snapshots into
/// `Shift`/`Control`/`Alt` downs and ups
pub fn modifier_events(previous: egui::Modifiers, current: egui::Modifiers) -> Vec<KeyEvent> {
    let pairs = [
        ("Shift", previous.shift, current.shift),
        ("Control", previous.ctrl, current.ctrl),
        ("Alt", previous.alt, current.alt),
    ];
    pairs
        .into_iter()
        .filter(|(_, before, now)| before != now)
        .map(|(name, _, now)| if now { KeyEvent::down(name) } else { KeyEvent::up(name) })
        .collect()
}
