use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeType {
    Database,
    Table,
    Column,
}

/// Which top-level surface the window is currently showing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Surface {
    Login,
    Main,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DialogKind {
    Info,
    Warning,
    Error,
}

impl DialogKind {
    pub fn default_title(self) -> &'static str {
        match self {
            DialogKind::Info => "Información",
            DialogKind::Warning => "Advertencia",
            DialogKind::Error => "Error",
        }
    }
}

/// Outcome of running one statement through the data access layer.
///
/// `Rows` comes back for read statements, `Message` for everything else,
/// including failures and the "no connection" case.
#[derive(Clone, PartialEq, Debug)]
pub enum QueryOutcome {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Message(String),
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Rows { rows, .. } => write!(f, "{} filas", rows.len()),
            QueryOutcome::Message(text) => f.write_str(text),
        }
    }
}
