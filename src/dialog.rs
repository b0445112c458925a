use eframe::egui;

use crate::models::enums::DialogKind;
use crate::models::structs::Dialog;

fn kind_color(kind: DialogKind, dark_mode: bool) -> egui::Color32 {
    match (kind, dark_mode) {
        (DialogKind::Info, _) => egui::Color32::from_rgb(70, 140, 230),
        (DialogKind::Warning, true) => egui::Color32::from_rgb(240, 190, 60),
        (DialogKind::Warning, false) => egui::Color32::from_rgb(190, 130, 0),
        (DialogKind::Error, _) => egui::Color32::from_rgb(255, 80, 60),
    }
}

/// Modal-style message box. Returns true once the user dismisses it.
pub(crate) fn render_message_dialog(dialog: &Dialog, ctx: &egui::Context) -> bool {
    let mut dismissed = false;
    egui::Window::new(dialog.title.as_str())
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let color = kind_color(dialog.kind, ui.visuals().dark_mode);
                ui.label(egui::RichText::new("●").color(color).size(18.0));
                ui.label(&dialog.text);
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Aceptar").clicked() {
                    dismissed = true;
                }
            });
        });
    if ctx.input(|i| i.key_pressed(egui::Key::Escape) || i.key_pressed(egui::Key::Enter)) {
        dismissed = true;
    }
    dismissed
}

/// OK/Cancel prompt. `Some(true)` on confirm, `Some(false)` on cancel.
pub(crate) fn render_confirm_dialog(
    title: &str,
    prompt: &str,
    ctx: &egui::Context,
) -> Option<bool> {
    let mut answer = None;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(prompt);
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Aceptar").clicked() {
                    answer = Some(true);
                }
                if ui.button("Cancelar").clicked() {
                    answer = Some(false);
                }
            });
        });
    if answer.is_none() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        answer = Some(false);
    }
    answer
}
