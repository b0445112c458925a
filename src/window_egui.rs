use std::time::Instant;

use eframe::{App, Frame, egui};
use egui_extras::{Column, TableBuilder};
use log::{debug, info};

use crate::controller::SessionController;
use crate::dialog;
use crate::login_view::{self, LoginAction, LoginState};
use crate::main_view::{self, MainAction, MainState};
use crate::models::enums::{NodeType, Surface};
use crate::models::structs::TreeNode;
use crate::ui_state::UiState;

pub const LOGIN_SIZE: [f32; 2] = [400.0, 300.0];
pub const MAIN_SIZE: [f32; 2] = [1020.0, 780.0];

pub struct DeskApp {
    controller: SessionController,
    ui: UiState,
    // Surface whose window geometry was last applied.
    applied_surface: Surface,
}

impl DeskApp {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller,
            ui: UiState::new(Instant::now()),
            applied_surface: Surface::Login,
        }
    }

    fn apply_surface_geometry(&mut self, ctx: &egui::Context) {
        if self.applied_surface == self.ui.surface {
            return;
        }
        let (title, size, resizable) = match self.ui.surface {
            Surface::Login => (login_view::TITLE, LOGIN_SIZE, false),
            Surface::Main => (main_view::TITLE, MAIN_SIZE, true),
        };
        debug!("Switching window to {:?}", self.ui.surface);
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.to_string()));
        ctx.send_viewport_cmd(egui::ViewportCommand::Resizable(resizable));
        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(size[0], size[1])));
        self.applied_surface = self.ui.surface;
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if self.ui.exit_requested || !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        match self.ui.surface {
            Surface::Login => {
                login_view::dispatch(LoginAction::Cancel, &mut self.ui, &mut self.controller)
            }
            Surface::Main => {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                main_view::dispatch(MainAction::RequestClose, &mut self.ui, &mut self.controller);
            }
        }
    }
}

fn render_login(state: &mut LoginState, ctx: &egui::Context) -> Option<LoginAction> {
    let mut action = None;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.add_space(12.0);
        ui.add_enabled_ui(state.dialog.is_none(), |ui| {
            egui::Grid::new("login_form")
                .num_columns(2)
                .spacing([10.0, 10.0])
                .show(ui, |ui| {
                    ui.label("Usuario:");
                    ui.add(egui::TextEdit::singleline(&mut state.user).desired_width(220.0));
                    ui.end_row();

                    ui.label("Contraseña:");
                    ui.add(
                        egui::TextEdit::singleline(&mut state.password)
                            .password(true)
                            .desired_width(220.0),
                    );
                    ui.end_row();

                    ui.label("Base de Datos:");
                    egui::ComboBox::from_id_salt("login_database")
                        .width(220.0)
                        .selected_text(state.selected_database.as_str())
                        .show_ui(ui, |ui| {
                            for name in &state.databases {
                                ui.selectable_value(
                                    &mut state.selected_database,
                                    name.clone(),
                                    name,
                                );
                            }
                        });
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Actualizar Bases Disponibles").clicked() {
                        action = Some(LoginAction::Refresh);
                    }
                });
            });

            ui.add_space(16.0);
            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Conectar").clicked() {
                        action = Some(LoginAction::Connect);
                    }
                    if ui.button("Cancelar").clicked() {
                        action = Some(LoginAction::Cancel);
                    }
                });
            });
        });
    });

    if let Some(dialog) = &state.dialog
        && dialog::render_message_dialog(dialog, ctx)
    {
        action = Some(LoginAction::DismissDialog);
    }

    action
}

fn render_tree_node(ui: &mut egui::Ui, node: &TreeNode, path: &str) {
    if node.node_type() == NodeType::Column {
        ui.label(&node.name);
        return;
    }
    let id = format!("{}/{}", path, node.name);
    egui::CollapsingHeader::new(node.name.as_str())
        .id_salt(&id)
        .default_open(node.is_expanded)
        .show(ui, |ui| {
            for child in &node.children {
                render_tree_node(ui, child, &id);
            }
        });
}

fn render_results(ui: &mut egui::Ui, columns: &[String], rows: &[Vec<String>]) {
    if columns.is_empty() {
        ui.weak("Sin resultados");
        return;
    }

    let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;
    egui::ScrollArea::horizontal()
        .id_salt("results_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::initial(100.0).at_least(40.0).clip(true), columns.len())
                .header(row_height, |mut header| {
                    for name in columns {
                        header.col(|ui| {
                            ui.strong(name.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(row_height, rows.len(), |mut row| {
                        let values = &rows[row.index()];
                        for idx in 0..columns.len() {
                            row.col(|ui| {
                                ui.label(values.get(idx).map(String::as_str).unwrap_or(""));
                            });
                        }
                    });
                });
        });
}

fn render_main(state: &mut MainState, ctx: &egui::Context) -> Option<MainAction> {
    let mut action = None;
    let interactive = !state.is_modal_open();

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.label(&state.status);
    });

    egui::SidePanel::left("schema_tree")
        .resizable(true)
        .default_width(250.0)
        .min_width(150.0)
        .show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                ui.strong("Estructura de la Base de Datos");
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_salt("schema_tree_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if let Some(root) = &state.tree {
                            render_tree_node(ui, root, "");
                        }
                    });
            });
        });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.add_enabled_ui(interactive, |ui| {
            ui.strong("Editor SQL");
            ui.add(
                egui::TextEdit::multiline(&mut state.query_text)
                    .code_editor()
                    .desired_rows(8)
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Limpiar").clicked() {
                        action = Some(MainAction::Clear);
                    }
                    if ui.button("Ejecutar").clicked() {
                        action = Some(MainAction::Execute);
                    }
                });
            });

            ui.separator();
            ui.strong("Resultados");
            render_results(ui, &state.result_columns, &state.result_rows);
        });
    });

    if interactive && ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Enter)) {
        action = Some(MainAction::Execute);
    }

    if let Some(dialog) = &state.dialog
        && dialog::render_message_dialog(dialog, ctx)
    {
        action = Some(MainAction::DismissDialog);
    }

    if state.confirm_exit {
        match dialog::render_confirm_dialog(main_view::EXIT_TITLE, main_view::EXIT_PROMPT, ctx) {
            Some(true) => action = Some(MainAction::ConfirmClose),
            Some(false) => action = Some(MainAction::CancelClose),
            None => {}
        }
    }

    action
}

impl App for DeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.apply_surface_geometry(ctx);
        self.handle_close_request(ctx);

        match self.ui.surface {
            Surface::Login => {
                let now = Instant::now();
                if let Some(probe) = self.ui.login.poll_probe(now) {
                    login_view::dispatch(probe, &mut self.ui, &mut self.controller);
                } else if let Some(remaining) = self.ui.login.probe_remaining(now) {
                    ctx.request_repaint_after(remaining);
                }

                if let Some(action) = render_login(&mut self.ui.login, ctx) {
                    login_view::dispatch(action, &mut self.ui, &mut self.controller);
                }
            }
            Surface::Main => {
                if let Some(action) = render_main(&mut self.ui.main, ctx) {
                    main_view::dispatch(action, &mut self.ui, &mut self.controller);
                }
            }
        }

        if self.ui.exit_requested {
            info!("Closing window");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
