use std::time::{Duration, Instant};

use log::debug;

use crate::controller::SessionController;
use crate::models::enums::DialogKind;
use crate::models::structs::Dialog;
use crate::ui_state::UiState;

/// Delay between the login window opening and the first database listing,
/// so the window gets a frame on screen before the UI thread blocks.
pub const PROBE_DELAY: Duration = Duration::from_millis(100);

pub const TITLE: &str = "Login - Gestor de Base de Datos";
pub const MISSING_FIELDS_MESSAGE: &str = "Todos los campos son obligatorios";
pub const NO_DATABASES_MESSAGE: &str =
    "No se encontraron bases de datos disponibles\nVerifique las credenciales";
pub const CONNECTION_ERROR_TITLE: &str = "Error de conexión";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoginAction {
    /// One-shot listing with empty credentials right after opening.
    Probe,
    Refresh,
    Connect,
    Cancel,
    DismissDialog,
}

#[derive(Debug)]
pub struct LoginState {
    pub user: String,
    pub password: String,
    pub databases: Vec<String>,
    pub selected_database: String,
    pub dialog: Option<Dialog>,
    pub is_open: bool,
    probe_at: Option<Instant>,
}

impl LoginState {
    pub fn new(opened_at: Instant) -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            databases: Vec::new(),
            selected_database: String::new(),
            dialog: None,
            is_open: true,
            probe_at: Some(opened_at + PROBE_DELAY),
        }
    }

    /// Returns the probe action once its deadline has passed, exactly once.
    pub fn poll_probe(&mut self, now: Instant) -> Option<LoginAction> {
        match self.probe_at {
            Some(at) if now >= at => {
                self.probe_at = None;
                Some(LoginAction::Probe)
            }
            _ => None,
        }
    }

    /// Time left until the probe fires, for scheduling a repaint.
    pub fn probe_remaining(&self, now: Instant) -> Option<Duration> {
        self.probe_at.map(|at| at.saturating_duration_since(now))
    }

    /// Fills the selector and pre-selects the first entry.
    pub fn set_databases(&mut self, databases: Vec<String>) {
        self.selected_database = databases.first().cloned().unwrap_or_default();
        self.databases = databases;
    }

    pub fn fields_complete(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty() && !self.selected_database.is_empty()
    }
}

pub fn dispatch(action: LoginAction, ui: &mut UiState, controller: &mut SessionController) {
    debug!("Login action: {:?}", action);
    match action {
        LoginAction::Probe => {
            let databases = controller.list_databases("", "");
            if !databases.is_empty() {
                ui.login.set_databases(databases);
            }
        }
        LoginAction::Refresh => {
            let databases = controller.list_databases(&ui.login.user, &ui.login.password);
            if databases.is_empty() {
                ui.login.dialog = Some(Dialog::new(DialogKind::Warning, NO_DATABASES_MESSAGE));
            } else {
                ui.login.set_databases(databases);
            }
        }
        LoginAction::Connect => {
            if !ui.login.fields_complete() {
                ui.login.dialog = Some(Dialog::new(DialogKind::Error, MISSING_FIELDS_MESSAGE));
                return;
            }
            let user = ui.login.user.clone();
            let password = ui.login.password.clone();
            let database = ui.login.selected_database.clone();
            controller.login(&user, &password, &database, ui);
        }
        LoginAction::Cancel => {
            ui.login.is_open = false;
            ui.exit_requested = true;
        }
        LoginAction::DismissDialog => ui.login.dialog = None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_fires_once_after_delay() {
        let opened = Instant::now();
        let mut state = LoginState::new(opened);
        assert_eq!(state.poll_probe(opened), None);
        assert_eq!(state.probe_remaining(opened), Some(PROBE_DELAY));

        let later = opened + PROBE_DELAY;
        assert_eq!(state.poll_probe(later), Some(LoginAction::Probe));
        assert_eq!(state.poll_probe(later + PROBE_DELAY), None);
        assert_eq!(state.probe_remaining(later), None);
    }

    #[test]
    fn set_databases_selects_first() {
        let mut state = LoginState::new(Instant::now());
        state.set_databases(vec!["shop".into(), "blog".into()]);
        assert_eq!(state.selected_database, "shop");

        state.set_databases(Vec::new());
        assert_eq!(state.selected_database, "");
    }

    #[test]
    fn every_field_is_required() {
        let mut state = LoginState::new(Instant::now());
        state.user = "root".into();
        state.password = "secret".into();
        assert!(!state.fields_complete());
        state.selected_database = "shop".into();
        assert!(state.fields_complete());
        state.password.clear();
        assert!(!state.fields_complete());
    }
}
