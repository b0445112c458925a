use log::debug;

use crate::controller::{ColumnSource, SessionController};
use crate::models::enums::{DialogKind, NodeType};
use crate::models::structs::{Dialog, TreeNode};
use crate::ui_state::UiState;

pub const TITLE: &str = "Gestor de Base de Datos";
pub const READY_STATUS: &str = "Listo";
pub const EMPTY_QUERY_MESSAGE: &str = "La consulta está vacía";
pub const EXIT_TITLE: &str = "Salir";
pub const EXIT_PROMPT: &str = "¿Está seguro que desea salir?";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MainAction {
    Execute,
    Clear,
    RequestClose,
    ConfirmClose,
    CancelClose,
    DismissDialog,
}

#[derive(Debug)]
pub struct MainState {
    pub tree: Option<TreeNode>,
    pub query_text: String,
    pub result_columns: Vec<String>,
    pub result_rows: Vec<Vec<String>>,
    pub status: String,
    pub dialog: Option<Dialog>,
    pub confirm_exit: bool,
}

impl Default for MainState {
    fn default() -> Self {
        Self {
            tree: None,
            query_text: String::new(),
            result_columns: Vec::new(),
            result_rows: Vec::new(),
            status: READY_STATUS.to_string(),
            dialog: None,
            confirm_exit: false,
        }
    }
}

/// Root is the database, one child per table, one grandchild per column.
pub fn build_schema_tree(
    database: &str,
    tables: &[String],
    columns: &mut dyn ColumnSource,
) -> TreeNode {
    let children = tables
        .iter()
        .map(|table| {
            let column_nodes = columns
                .columns_for(table)
                .into_iter()
                .map(|col| TreeNode::new(col.to_string(), NodeType::Column))
                .collect();
            TreeNode::with_children(table.clone(), NodeType::Table, column_nodes)
        })
        .collect();

    let mut root = TreeNode::with_children(database.to_string(), NodeType::Database, children);
    root.is_expanded = true;
    root
}

impl MainState {
    pub fn load_structure(
        &mut self,
        database: &str,
        tables: &[String],
        columns: &mut dyn ColumnSource,
    ) {
        self.tree = Some(build_schema_tree(database, tables, columns));
    }

    pub fn clear_results(&mut self) {
        self.result_columns.clear();
        self.result_rows.clear();
        self.status = "Resultados limpiados".to_string();
    }

    pub fn show_results(&mut self, columns: Vec<String>, rows: Vec<Vec<String>>) {
        self.status = format!("Resultados: {} filas", rows.len());
        self.result_columns = columns;
        self.result_rows = rows;
    }

    pub fn show_message(&mut self, message: &str) {
        self.status = message.to_string();
        self.dialog = Some(Dialog::new(DialogKind::Info, message));
    }

    pub fn show_error(&mut self, message: &str) {
        self.status = format!("Error: {}", message);
        self.dialog = Some(Dialog::new(DialogKind::Error, message));
    }

    /// A message box or the exit prompt is up; the editor and tree are locked.
    pub fn is_modal_open(&self) -> bool {
        self.dialog.is_some() || self.confirm_exit
    }
}

pub fn dispatch(action: MainAction, ui: &mut UiState, controller: &mut SessionController) {
    debug!("Main action: {:?}", action);
    if matches!(action, MainAction::Execute | MainAction::Clear) && ui.main.is_modal_open() {
        debug!("Ignoring {:?} while a dialog is open", action);
        return;
    }
    match action {
        MainAction::Execute => {
            let query = ui.main.query_text.trim().to_string();
            if query.is_empty() {
                ui.main.dialog = Some(Dialog::new(DialogKind::Warning, EMPTY_QUERY_MESSAGE));
                return;
            }
            controller.execute_query(&query, ui);
        }
        MainAction::Clear => {
            ui.main.query_text.clear();
            ui.main.clear_results();
        }
        MainAction::RequestClose => ui.main.confirm_exit = true,
        MainAction::ConfirmClose => {
            ui.main.confirm_exit = false;
            controller.close_connection();
            ui.exit_requested = true;
        }
        MainAction::CancelClose => ui.main.confirm_exit = false,
        MainAction::DismissDialog => ui.main.dialog = None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structs::ColumnInfo;

    struct FixedColumns;

    impl ColumnSource for FixedColumns {
        fn columns_for(&mut self, table_name: &str) -> Vec<ColumnInfo> {
            match table_name {
                "users" => vec![
                    ColumnInfo::new("id", "int"),
                    ColumnInfo::new("email", "varchar(255)"),
                ],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn tree_labels_columns_with_types() {
        let tables = vec!["users".to_string(), "empty".to_string()];
        let root = build_schema_tree("shop", &tables, &mut FixedColumns);

        assert_eq!(root.name, "shop");
        assert!(root.is_expanded);
        assert_eq!(root.node_type(), NodeType::Database);
        assert_eq!(root.children.len(), 2);

        let users = &root.children[0];
        assert!(!users.is_expanded);
        let labels: Vec<&str> = users.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(labels, ["id (int)", "email (varchar(255))"]);
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn status_line_tracks_results_and_messages() {
        let mut state = MainState::default();
        assert_eq!(state.status, "Listo");

        state.show_results(vec!["id".into()], vec![vec!["1".into()], vec!["2".into()]]);
        assert_eq!(state.status, "Resultados: 2 filas");

        state.show_error("boom");
        assert_eq!(state.status, "Error: boom");
        assert_eq!(state.dialog.as_ref().map(|d| d.kind), Some(DialogKind::Error));

        state.clear_results();
        assert!(state.result_columns.is_empty());
        assert_eq!(state.status, "Resultados limpiados");
    }
}
