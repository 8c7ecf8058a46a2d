//! Control widgets bound to option handles

use std::collections::HashMap;

use eframe::egui;
use tracing::{debug, warn};

use crate::color::HexColor;
use crate::config::{ColorpickerConfig, DropdownConfig, InputConfig, KeybindConfig, SliderConfig};
use crate::gui::constants::*;
use crate::library::Element;
use crate::options::{Colorpicker, Dropdown, Input, Keybind, Slider};

/// Text typed into inputs that only commit on Enter
#[derive(Default)]
pub struct ControlsState {
    input_buffers: HashMap<String, String>,
}

impl ControlsState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Render one tab element
pub fn ui(ui: &mut egui::Ui, element: &Element, state: &mut ControlsState) {
    match element {
        Element::Paragraph(config) => {
            ui.label(egui::RichText::new(&config.title).strong());
            ui.label(&config.content);
        }
        Element::Button(config) => {
            let mut response = ui.button(&config.title);
            if let Some(description) = &config.description {
                response = response.on_hover_text(description);
            }
            if response.clicked() {
                debug!(button = %config.title, "Button clicked");
                (config.callback)();
            }
        }
        Element::Toggle { config, option, .. } => {
            let mut value = option.value();
            let mut response = ui.checkbox(&mut value, &config.title);
            if let Some(description) = &config.description {
                response = response.on_hover_text(description);
            }
            if response.changed() {
                option.set_value(value);
            }
        }
        Element::Slider { config, option, .. } => slider(ui, config, option),
        Element::Dropdown { id, config, option } => dropdown(ui, id, config, option),
        Element::Colorpicker { config, option, .. } => colorpicker(ui, config, option),
        Element::Keybind { config, option, .. } => keybind(ui, config, option),
        Element::Input { id, config, option } => input(ui, id, config, option, state),
    }
    ui.add_space(ITEM_SPACING);
}

fn slider(ui: &mut egui::Ui, config: &SliderConfig, option: &Slider) {
    ui.horizontal(|ui| {
        ui.label(&config.title);
        let mut value = option.value();
        let widget = egui::Slider::new(&mut value, option.min()..=option.max()).step_by(option.step());
        if ui.add(widget).changed() {
            let value = option.set_from_ui(value);
            if let Some(callback) = &config.callback {
                callback(value);
            }
        }
    });
    if let Some(description) = &config.description {
        ui.label(egui::RichText::new(description).small().weak());
    }
}

fn dropdown(ui: &mut egui::Ui, id: &str, config: &DropdownConfig, option: &Dropdown) {
    ui.horizontal(|ui| {
        ui.label(&config.title);
        let value = option.value();
        let selected = value.selected();
        let text = if selected.is_empty() {
            "None".to_string()
        } else {
            selected.join(", ")
        };

        let mut combo = egui::ComboBox::from_id_salt(id).selected_text(text);
        if option.is_multi() {
            combo = combo.close_behavior(egui::PopupCloseBehavior::CloseOnClickOutside);
        }
        combo.show_ui(ui, |ui| {
            for candidate in option.values() {
                let is_selected = option.is_selected(candidate);
                if option.is_multi() {
                    let mut checked = is_selected;
                    if ui.checkbox(&mut checked, candidate).changed() {
                        option.toggle_candidate(candidate);
                    }
                } else if ui.selectable_label(is_selected, candidate).clicked() && !is_selected {
                    option.set_value(candidate.as_str());
                }
            }
        });
    });
    if let Some(description) = &config.description {
        ui.label(egui::RichText::new(description).small().weak());
    }
}

fn colorpicker(ui: &mut egui::Ui, config: &ColorpickerConfig, option: &Colorpicker) {
    ui.horizontal(|ui| {
        ui.label(&config.title);
        let current = option.value();
        let mut rgb = match HexColor::parse(&current) {
            Some(color) => color.to_array(),
            None => {
                warn!(value = %current, "Colorpicker holds an unparseable colour");
                [0, 0, 0]
            }
        };
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            option.set_value_rgb(HexColor::rgb(rgb[0], rgb[1], rgb[2]).to_hex());
        }
        ui.label(egui::RichText::new(current).monospace().weak());
    });
    if config.transparency.is_some() {
        ui.horizontal(|ui| {
            ui.label("Transparency");
            let mut transparency = option.transparency();
            if ui
                .add(egui::Slider::new(&mut transparency, 0.0..=1.0).step_by(0.01))
                .changed()
            {
                option.set_transparency(transparency);
            }
            if let Some(color) = HexColor::parse(&option.value()) {
                let color = color.with_transparency(option.transparency());
                let (rect, _) = ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::hover());
                ui.painter().rect_filled(
                    rect,
                    2.0,
                    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a),
                );
            }
        });
    }
}

fn keybind(ui: &mut egui::Ui, config: &KeybindConfig, option: &Keybind) {
    ui.horizontal(|ui| {
        ui.label(&config.title);
        let label = if option.is_listening() {
            egui::RichText::new(LISTENING_LABEL).color(ACCENT)
        } else {
            egui::RichText::new(option.value()).monospace()
        };
        if ui.button(label).on_hover_text("Click, then press a key").clicked() {
            option.begin_listening();
        }
        ui.label(egui::RichText::new(format!("{:?}", option.mode())).small().weak());
        if option.state() {
            ui.colored_label(ACCENT, "\u{25CF}");
        }
    });
}

fn input(ui: &mut egui::Ui, id: &str, config: &InputConfig, option: &Input, state: &mut ControlsState) {
    ui.horizontal(|ui| {
        ui.label(&config.title);

        if !config.finished {
            let mut text = option.value();
            let response = ui.add(egui::TextEdit::singleline(&mut text).hint_text(&config.placeholder));
            if response.changed() && accept(config, &text) {
                option.set_value(text.clone());
                if let Some(callback) = &config.callback {
                    callback(&text);
                }
            }
            return;
        }

        let buffer = state
            .input_buffers
            .entry(id.to_string())
            .or_insert_with(|| option.value());
        let response = ui.add(egui::TextEdit::singleline(buffer).hint_text(&config.placeholder));
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            if accept(config, buffer) {
                option.set_value(buffer.clone());
                if let Some(callback) = &config.callback {
                    callback(buffer);
                }
            } else {
                *buffer = option.value();
            }
        } else if !response.has_focus() {
            *buffer = option.value();
        }
    });
}

/// Numeric inputs only take text that parses as a number (or nothing)
fn accept(config: &InputConfig, text: &str) -> bool {
    if !config.numeric || text.trim().is_empty() {
        return true;
    }
    let ok = text.trim().parse::<f64>().is_ok();
    if !ok {
        debug!(input = %config.title, text = %text, "Rejected non-numeric input");
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_inputs_reject_text() {
        let numeric = InputConfig::new("Count").numeric();
        assert!(accept(&numeric, "12.5"));
        assert!(accept(&numeric, ""));
        assert!(!accept(&numeric, "twelve"));
        assert!(accept(&InputConfig::new("Name"), "twelve"));
    }
}
