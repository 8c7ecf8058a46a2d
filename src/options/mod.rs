//! Observable option cells backing every control
//!
//! An [`OptionCell<T>`] is a shared, single-threaded value holder. Every
//! `set_value` stores the new value and then notifies every subscriber, in
//! registration order, before returning. There is no equality short-circuit:
//! setting the same value twice notifies twice.
//!
//! Re-entrant writes (a subscriber calling `set_value` on the cell it is
//! subscribed to) are queued and delivered after the current round, so every
//! subscriber sees the writes in call order and is never handed a value other
//! than the one the cell currently holds.

mod any;
mod colorpicker;
mod dropdown;
mod keybind;
mod slider;

pub use any::{AnyOption, MalformedValue};
pub use colorpicker::Colorpicker;
pub use dropdown::{Dropdown, DropdownSelection, DropdownValue};
pub use keybind::{KeyHandling, Keybind, KeybindMode};
pub use slider::Slider;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Boolean switch
pub type Toggle = OptionCell<bool>;

/// Free text (numeric inputs are still stored as text)
pub type Input = OptionCell<String>;

/// Handle returned by [`OptionCell::on_changed`], used to unsubscribe
pub type SubscriptionId = u64;

type Callback<T> = Rc<dyn Fn(&T)>;

struct CellInner<T> {
    value: T,
    next_id: SubscriptionId,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
    /// True while a notification round is running
    dispatching: bool,
    /// Writes made by subscribers during a round
    pending: VecDeque<T>,
}

/// A mutable, observable value shared by a control and the code reading it.
///
/// Cloning creates another handle to the same value and subscriber list.
pub struct OptionCell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Clone for OptionCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OptionCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("OptionCell")
            .field("value", &inner.value)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + 'static> OptionCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                next_id: 0,
                subscribers: Vec::new(),
                dispatching: false,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Current value (cloned)
    pub fn value(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify every subscriber with it.
    ///
    /// Performs no validation of any kind.
    pub fn set_value(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.dispatching {
                inner.pending.push_back(value);
                return;
            }
            inner.dispatching = true;
            inner.value = value;
        }

        loop {
            // Snapshot so callbacks run without the cell borrowed
            let (value, callbacks): (T, Vec<Callback<T>>) = {
                let inner = self.inner.borrow();
                let callbacks = inner
                    .subscribers
                    .iter()
                    .map(|(_, callback)| Rc::clone(callback))
                    .collect();
                (inner.value.clone(), callbacks)
            };

            for callback in &callbacks {
                callback(&value);
            }

            let mut inner = self.inner.borrow_mut();
            match inner.pending.pop_front() {
                Some(next) => inner.value = next,
                None => {
                    inner.dispatching = false;
                    break;
                }
            }
        }
    }

    /// Re-deliver the current value to every subscriber
    pub fn notify(&self) {
        self.set_value(self.value());
    }

    /// Register a subscriber. It is called after every future `set_value`.
    pub fn on_changed(&self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Rc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
        inner.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// True when both handles point at the same cell
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
