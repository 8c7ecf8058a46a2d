use std::ops::Deref;

use super::OptionCell;

/// Numeric option with a range and rounding policy.
///
/// The range and rounding live beside the cell: `set_value` accepts any
/// number unchanged, and the producer (the UI binding) is expected to call
/// [`Slider::quantize`] first.
#[derive(Debug, Clone)]
pub struct Slider {
    cell: OptionCell<f64>,
    min: f64,
    max: f64,
    rounding: Option<u32>,
}

impl Slider {
    pub fn new(value: f64, min: f64, max: f64, rounding: Option<u32>) -> Self {
        Self {
            cell: OptionCell::new(value),
            min,
            max,
            rounding,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Fractional digits kept; `None` means integer values
    pub fn rounding(&self) -> Option<u32> {
        self.rounding
    }

    /// UI step size: 10^-rounding, or 1 for integer sliders
    pub fn step(&self) -> f64 {
        match self.rounding {
            Some(digits) => 10f64.powi(-(digits as i32)),
            None => 1.0,
        }
    }

    /// Clamp `raw` to the range and round it to the configured precision
    pub fn quantize(&self, raw: f64) -> f64 {
        quantize(raw, self.min, self.max, self.rounding)
    }

    /// Quantize `raw` and store it
    pub fn set_from_ui(&self, raw: f64) -> f64 {
        let value = self.quantize(raw);
        self.cell.set_value(value);
        value
    }
}

impl Deref for Slider {
    type Target = OptionCell<f64>;

    fn deref(&self) -> &Self::Target {
        &self.cell
    }
}

pub(crate) fn quantize(raw: f64, min: f64, max: f64, rounding: Option<u32>) -> f64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let clamped = raw.clamp(lo, hi);
    match rounding {
        Some(digits) => {
            let factor = 10f64.powi(digits as i32);
            (clamped * factor).round() / factor
        }
        None => clamped.round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_is_not_validated() {
        let slider = Slider::new(5.0, 0.0, 10.0, None);
        slider.set_value(250.5);
        assert_eq!(slider.value(), 250.5);
    }

    #[test]
    fn test_quantize_clamps_and_rounds() {
        let slider = Slider::new(0.0, 0.0, 10.0, Some(1));
        assert_eq!(slider.quantize(7.46), 7.5);
        assert_eq!(slider.quantize(-3.0), 0.0);
        assert_eq!(slider.quantize(12.0), 10.0);
    }

    #[test]
    fn test_quantize_without_rounding_is_integer() {
        let slider = Slider::new(0.0, 0.0, 100.0, None);
        assert_eq!(slider.quantize(41.6), 42.0);
        assert_eq!(slider.step(), 1.0);
    }

    #[test]
    fn test_step_from_rounding() {
        let slider = Slider::new(0.0, 0.0, 1.0, Some(2));
        assert!((slider.step() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_set_from_ui_stores_quantized() {
        let slider = Slider::new(0.0, 1.0, 5.0, Some(0));
        assert_eq!(slider.set_from_ui(3.7), 4.0);
        assert_eq!(slider.value(), 4.0);
    }
}
