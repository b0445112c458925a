#[cfg(feature = "egui_ui")]
use eframe::egui;

pub mod config;
pub mod controller;
pub mod data_access;

#[cfg(feature = "egui_ui")]
pub mod dialog;

pub mod driver_mysql;
pub mod login_view;
pub mod main_view;
pub mod models;
pub mod ui_state;

#[cfg(feature = "egui_ui")]
pub mod window_egui;

/// Builds the one data access instance and controller, then runs the window
/// until the user leaves.
#[cfg(feature = "egui_ui")]
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    config::init_logging();
    let app_config = config::AppConfig::from_env();
    log::info!("Using server {}:{}", app_config.host, app_config.port);

    let client = driver_mysql::MySqlClient::new(app_config.connect_timeout);
    let data_access = data_access::DataAccess::new(Box::new(client), app_config.port)?;
    let controller = controller::SessionController::new(data_access, &app_config);

    let mut options = eframe::NativeOptions::default();
    let [w, h] = window_egui::LOGIN_SIZE;
    options.viewport.inner_size = Some(egui::vec2(w, h));
    options.viewport.resizable = Some(false);

    eframe::run_native(
        login_view::TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(window_egui::DeskApp::new(controller)))),
    )?;
    Ok(())
}
