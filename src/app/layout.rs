//! The selection form: the top panel next to the map.
//!
//! In view mode it shows the "Grab some data" button and the OpenStreetMap
//! link. In select mode it shows cancel/reset, the serialized token, the
//! count message, the feature-count annotation and session save/load.

use eframe::egui;
use egui_phosphor::regular::{
    ARROW_COUNTER_CLOCKWISE, FLOPPY_DISK, FOLDER_OPEN, GLOBE, GRID_FOUR, X,
};

use crate::events::MapInput;
use crate::persistence::{load_session_from_path, save_session_to_path, SessionStateSerde};
use crate::sink::PanelMode;
use crate::viewport::Viewport;

use super::CellPickApp;

impl CellPickApp {
    pub(super) fn render_form(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| match self.form.panel {
            PanelMode::View => {
                if ui
                    .button(format!("{GRID_FOUR} Grab some data"))
                    .on_hover_text("Pick grid cells on the map")
                    .clicked()
                {
                    self.pending_inputs.push(MapInput::Start);
                }
                self.render_deep_link(ui);
            }
            PanelMode::Select => {
                if ui.button(format!("{X} Cancel")).clicked() {
                    self.pending_inputs.push(MapInput::Cancel);
                }
                if ui
                    .button(format!("{ARROW_COUNTER_CLOCKWISE} Reset"))
                    .on_hover_text("Deselect all cells")
                    .clicked()
                {
                    self.pending_inputs.push(MapInput::Reset);
                }
                ui.separator();
                self.render_session_buttons(ui);
                ui.separator();
                ui.label(format!("{} cells/degree", self.controller.density()));
                self.render_deep_link(ui);
            }
        });

        if self.form.panel == PanelMode::Select {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.form.status).strong());
                let info = self.feature_counts.info();
                if info.pending {
                    ui.spinner();
                } else if let Some(text) = info.info {
                    ui.label(text);
                }
            });
            ui.horizontal(|ui| {
                ui.label("Cells:");
                let mut token = self.form.token.clone();
                ui.add(
                    egui::TextEdit::singleline(&mut token)
                        .interactive(false)
                        .desired_width(f32::INFINITY),
                );
            });
        }

        if let Some(notice) = &self.notice {
            ui.colored_label(egui::Color32::LIGHT_RED, notice.as_str());
        }
    }

    fn render_deep_link(&self, ui: &mut egui::Ui) {
        if let Some(url) = &self.form.deep_link {
            ui.hyperlink_to(format!("{GLOBE} View in OpenStreetMap"), url);
        }
    }

    fn render_session_buttons(&mut self, ui: &mut egui::Ui) {
        if ui
            .button(format!("{FLOPPY_DISK} Save…"))
            .on_hover_text("Save the selection and view to a JSON file")
            .clicked()
        {
            self.save_session_dialog();
        }
        if ui
            .button(format!("{FOLDER_OPEN} Load…"))
            .on_hover_text("Restore a saved selection")
            .clicked()
        {
            self.load_session_dialog();
        }
    }

    fn save_session_dialog(&mut self) {
        let Some(viewport) = self.viewport else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("selection.json")
            .save_file()
        else {
            return;
        };
        let state = SessionStateSerde::capture(&self.controller, viewport.visible_bounds());
        self.notice = match save_session_to_path(&state, &path) {
            Ok(()) => None,
            Err(err) => {
                tracing::error!(%err, path = %path.display(), "failed to save session");
                Some(format!("Could not save session: {err}"))
            }
        };
    }

    fn load_session_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        else {
            return;
        };
        match load_session_from_path(&path) {
            Ok(state) => {
                tracing::info!(path = %path.display(), "selection session loaded");
                self.schedule_restore(state);
            }
            Err(err) => {
                tracing::error!(%err, path = %path.display(), "failed to load session");
                self.notice = Some(format!("Could not load session: {err}"));
            }
        }
    }
}
