//! Panel window implemented with egui/eframe

use std::time::Duration;

use anyhow::{Result, anyhow};
use eframe::{CreationContext, NativeOptions, egui};
use tracing::{debug, info};

use super::components::{controls, overlays};
use super::constants::*;
use super::keys;
use crate::config::Theme;
use crate::hotkeys::DispatchOutcome;
use crate::interface::InterfaceManager;
use crate::library::{Library, Window};
use crate::notify::ToastQueue;
use crate::persistence::SaveManager;

/// Everything the panel draws from
pub struct Panel {
    pub library: Library,
    pub window: Window,
    pub toasts: ToastQueue,
    pub interface: Option<InterfaceManager>,
    /// Loads `default` once every tab exists
    pub saves: Option<SaveManager>,
}

struct PanelApp {
    panel: Panel,
    controls: controls::ControlsState,
    modifiers: egui::Modifiers,
    applied_theme: Option<(Theme, bool)>,
}

impl PanelApp {
    fn new(_cc: &CreationContext<'_>, panel: Panel) -> Self {
        info!(title = %panel.window.config().title, "Initializing egui panel");
        if let Some(saves) = &panel.saves
            && let Some(summary) = saves.autoload_default()
        {
            info!(applied = summary.applied, "Default configuration loaded");
        }
        Self {
            panel,
            controls: controls::ControlsState::new(),
            modifiers: egui::Modifiers::NONE,
            applied_theme: None,
        }
    }

    /// Feed this frame's keyboard input to keybinds and the minimise key
    fn process_keys(&mut self, ctx: &egui::Context) {
        let (events, modifiers) = ctx.input(|i| (i.events.clone(), i.modifiers));

        let mut key_events = keys::modifier_events(self.modifiers, modifiers);
        self.modifiers = modifiers;
        key_events.extend(events.iter().filter_map(keys::key_event));

        for event in key_events {
            if self.panel.library.dispatch_key(&event) == DispatchOutcome::Captured {
                debug!(key = %event.key, "Key captured for rebinding");
            }
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        let theme = self
            .panel
            .interface
            .as_ref()
            .map(|interface| interface.theme())
            .unwrap_or(self.panel.window.config().theme);
        let transparent = self
            .panel
            .interface
            .as_ref()
            .is_some_and(|interface| interface.window_transparency());
        if self.applied_theme == Some((theme, transparent)) {
            return;
        }

        let mut visuals = match theme {
            Theme::Dark => egui::Visuals::dark(),
            Theme::Light => egui::Visuals::light(),
        };
        visuals.selection.bg_fill = ACCENT;
        if transparent {
            visuals.panel_fill = visuals.panel_fill.gamma_multiply(TRANSPARENT_FILL);
            visuals.window_fill = visuals.window_fill.gamma_multiply(TRANSPARENT_FILL);
        }
        ctx.set_visuals(visuals);
        self.applied_theme = Some((theme, transparent));
        debug!(theme = %theme, transparent, "Applied visuals");
    }

    fn title_bar(&self, ui: &mut egui::Ui) {
        let config = self.panel.window.config();
        ui.horizontal(|ui| {
            ui.heading(&config.title);
            if let Some(sub_title) = &config.sub_title {
                ui.label(egui::RichText::new(sub_title).weak());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("\u{2715}").on_hover_text("Close").clicked() {
                    self.panel.window.close();
                }
                let symbol = if self.panel.window.is_minimized() { "\u{25A1}" } else { "\u{2014}" };
                if ui.small_button(symbol).on_hover_text("Minimize").clicked() {
                    self.panel.window.toggle_minimize();
                }
            });
        });
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_keys(ctx);
        self.apply_theme(ctx);

        if self.panel.window.is_closed() || self.panel.library.is_unloaded() {
            info!("Panel closed");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        egui::TopBottomPanel::top("title_bar").show(ctx, |ui| {
            ui.add_space(PADDING / 2.0);
            self.title_bar(ui);
            ui.add_space(PADDING / 2.0);
        });

        if !self.panel.window.is_minimized() {
            let tabs = self.panel.window.tabs();
            let selected = self.panel.window.selected_index();

            egui::SidePanel::left("tab_strip")
                .exact_width(self.panel.window.config().tab_width)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.add_space(PADDING);
                    for (index, tab) in tabs.iter().enumerate() {
                        let position = index + 1;
                        let title = match tab.icon() {
                            Some(icon) => format!("{icon}  {}", tab.title()),
                            None => tab.title(),
                        };
                        if ui.selectable_label(selected == Some(position), title).clicked() {
                            self.panel.window.select_tab(position);
                        }
                    }
                });

            egui::CentralPanel::default().show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(PADDING);
                    match self.panel.window.selected_tab() {
                        Some(tab) => {
                            ui.heading(tab.title());
                            ui.add_space(SECTION_SPACING);
                            for element in tab.elements() {
                                controls::ui(ui, &element, &mut self.controls);
                            }
                        }
                        None => {
                            ui.label(egui::RichText::new("No tabs").weak());
                        }
                    }
                });
            });
        }

        overlays::dialogs(ctx, &self.panel.window);
        overlays::toasts(ctx, &self.panel.toasts);

        ctx.request_repaint_after(Duration::from_millis(REPAINT_INTERVAL_MS));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.panel.library.unload();
        info!("Panel exiting");
    }
}

pub fn run_gui(panel: Panel) -> Result<()> {
    let config = panel.window.config();
    let (width, height) = config.size;
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_transparent(config.acrylic)
            .with_title(&config.title),
        ..Default::default()
    };

    let app_name = config.title.clone();
    eframe::run_native(
        &app_name,
        options,
        Box::new(move |cc| Ok(Box::new(PanelApp::new(cc, panel)))),
    )
    .map_err(|err| anyhow!("Failed to launch egui panel: {err}"))
}
