use log::{debug, info, warn};

use crate::config::AppConfig;
use crate::data_access::DataAccess;
use crate::models::enums::QueryOutcome;
use crate::models::structs::ColumnInfo;

pub const CONNECTION_ERROR_MESSAGE: &str = "Error de conexión. Verifique las credenciales";

/// Where the main surface gets each table's columns while it builds the tree.
pub trait ColumnSource {
    fn columns_for(&mut self, table_name: &str) -> Vec<ColumnInfo>;
}

/// Everything the controller can ask the presentation layer to do.
pub trait SessionView {
    fn close_login(&mut self);
    fn show_login_error(&mut self, message: &str);
    fn load_structure(&mut self, database: &str, tables: &[String], columns: &mut dyn ColumnSource);
    fn reveal_main(&mut self);
    fn show_results(&mut self, columns: Vec<String>, rows: Vec<Vec<String>>);
    fn show_message(&mut self, message: &str);
}

pub struct SessionController {
    data_access: DataAccess,
    host: String,
    database_name: String,
}

impl SessionController {
    pub fn new(data_access: DataAccess, config: &AppConfig) -> Self {
        Self {
            data_access,
            host: config.host.clone(),
            database_name: String::new(),
        }
    }

    /// Name recorded by the last successful login; empty before that.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn list_databases(&mut self, user: &str, password: &str) -> Vec<String> {
        self.data_access.list_databases(&self.host, user, password)
    }

    pub fn login(
        &mut self,
        user: &str,
        password: &str,
        database: &str,
        view: &mut dyn SessionView,
    ) {
        if !self.data_access.connect(&self.host, user, password, database) {
            warn!(
                "Login as {} to {} failed: {}",
                user,
                database,
                self.data_access.last_error().unwrap_or("unknown reason")
            );
            view.show_login_error(CONNECTION_ERROR_MESSAGE);
            return;
        }

        self.database_name = database.to_string();
        view.close_login();

        let tables = self.data_access.list_tables();
        info!("Loaded {} tables from {}", tables.len(), database);
        let database = self.database_name.clone();
        view.load_structure(&database, &tables, self);
        view.reveal_main();
    }

    pub fn list_columns(&mut self, table_name: &str) -> Vec<ColumnInfo> {
        self.data_access.list_columns(table_name)
    }

    pub fn execute_query(&mut self, sql: &str, view: &mut dyn SessionView) {
        match self.data_access.execute(sql) {
            QueryOutcome::Rows { columns, rows } => {
                debug!("Routing {} rows to the results grid", rows.len());
                view.show_results(columns, rows);
            }
            QueryOutcome::Message(message) => view.show_message(&message),
        }
    }

    pub fn close_connection(&mut self) {
        self.data_access.close();
    }
}

impl ColumnSource for SessionController {
    fn columns_for(&mut self, table_name: &str) -> Vec<ColumnInfo> {
        self.list_columns(table_name)
    }
}
