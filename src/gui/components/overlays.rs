//! Toast notifications and modal dialogs drawn above the panel

use std::time::Instant;

use eframe::egui;

use crate::gui::constants::*;
use crate::library::Window;
use crate::notify::ToastQueue;

pub fn toasts(ctx: &egui::Context, queue: &ToastQueue) {
    let active = queue.active(Instant::now());
    if active.is_empty() {
        return;
    }

    let mut dismissed = None;
    egui::Area::new(egui::Id::new("toasts"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-TOAST_MARGIN, -TOAST_MARGIN])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.set_max_width(TOAST_WIDTH);
            for (index, notification) in active.iter().enumerate() {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&notification.title).strong());
                        if notification.duration.is_none() && ui.small_button("\u{2715}").clicked() {
                            dismissed = Some(index);
                        }
                    });
                    ui.label(&notification.content);
                    if let Some(sub) = &notification.sub_content {
                        ui.label(egui::RichText::new(sub).small().weak());
                    }
                });
                ui.add_space(ITEM_SPACING / 2.0);
            }
        });

    if let Some(index) = dismissed {
        queue.dismiss(index);
    }
}

pub fn dialogs(ctx: &egui::Context, window: &Window) {
    let mut pressed = None;
    for (index, dialog) in window.dialogs().iter().enumerate() {
        egui::Window::new(&dialog.title)
            .id(egui::Id::new("dialog").with(index))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&dialog.content);
                ui.add_space(ITEM_SPACING);
                ui.horizontal(|ui| {
                    for (button, config) in dialog.buttons.iter().enumerate() {
                        if ui.button(&config.title).clicked() {
                            pressed = Some((index, button));
                        }
                    }
                    if dialog.buttons.is_empty() && ui.button("Close").clicked() {
                        pressed = Some((index, usize::MAX));
                    }
                });
            });
    }

    // Callbacks run after drawing so they may open further dialogs
    if let Some((dialog, button)) = pressed {
        window.press_dialog_button(dialog, button);
    }
}
