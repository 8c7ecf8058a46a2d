use std::cell::Cell;
use std::ops::Deref;
use std::rc::Rc;

use super::OptionCell;

/// Colour string option with a separate transparency channel.
///
/// Changing the transparency through [`Colorpicker::set_transparency`]
/// re-notifies subscribers with the current colour so they repaint.
/// [`Colorpicker::restore_transparency`] stores silently; config loading
/// uses it.
#[derive(Debug, Clone)]
pub struct Colorpicker {
    cell: OptionCell<String>,
    transparency: Rc<Cell<f64>>,
}

impl Colorpicker {
    pub fn new(color: String, transparency: f64) -> Self {
        Self {
            cell: OptionCell::new(color),
            transparency: Rc::new(Cell::new(transparency)),
        }
    }

    /// 0.0 (invisible) to 1.0 (opaque)
    pub fn transparency(&self) -> f64 {
        self.transparency.get()
    }

    pub fn set_transparency(&self, transparency: f64) {
        self.transparency.set(transparency);
        self.cell.notify();
    }

    pub fn restore_transparency(&self, transparency: f64) {
        self.transparency.set(transparency);
    }

    /// Alias kept for hosts that set colours from RGB pickers
    pub fn set_value_rgb(&self, color: impl Into<String>) {
        self.cell.set_value(color.into());
    }
}

impl Deref for Colorpicker {
    type Target = OptionCell<String>;

    fn deref(&self) -> &Self::Target {
        &self.cell
    }
}
