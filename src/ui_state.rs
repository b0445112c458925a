use std::time::Instant;

use crate::controller::{ColumnSource, SessionView};
use crate::login_view::{self, LoginState};
use crate::main_view::MainState;
use crate::models::enums::{DialogKind, Surface};
use crate::models::structs::Dialog;

/// State of both surfaces plus which one is on screen.
#[derive(Debug)]
pub struct UiState {
    pub surface: Surface,
    pub login: LoginState,
    pub main: MainState,
    /// Set once the user has asked to leave and the window should close.
    pub exit_requested: bool,
}

impl UiState {
    pub fn new(now: Instant) -> Self {
        Self {
            surface: Surface::Login,
            login: LoginState::new(now),
            main: MainState::default(),
            exit_requested: false,
        }
    }
}

impl SessionView for UiState {
    fn close_login(&mut self) {
        self.login.is_open = false;
        self.login.dialog = None;
        // Credentials are not kept around once the session is open.
        self.login.password.clear();
    }

    fn show_login_error(&mut self, message: &str) {
        self.login.dialog = Some(Dialog::titled(
            DialogKind::Error,
            login_view::CONNECTION_ERROR_TITLE,
            message,
        ));
    }

    fn load_structure(
        &mut self,
        database: &str,
        tables: &[String],
        columns: &mut dyn ColumnSource,
    ) {
        self.main.load_structure(database, tables, columns);
    }

    fn reveal_main(&mut self) {
        self.surface = Surface::Main;
    }

    fn show_results(&mut self, columns: Vec<String>, rows: Vec<Vec<String>>) {
        self.main.show_results(columns, rows);
    }

    fn show_message(&mut self, message: &str) {
        self.main.show_message(message);
    }
}
