//! Boundary to the relational database.
//!
//! Everything above this module sees plain values: a `bool` for connect,
//! possibly-empty lists for schema lookups and a [`QueryOutcome`] for
//! statements. Client errors are logged here and never travel further.

use async_trait::async_trait;
use log::{debug, error, info, warn};

use crate::models::enums::QueryOutcome;
use crate::models::structs::{ColumnInfo, ConnectTarget, ResultSet};

/// Schemas the server keeps for itself; never offered to the user.
pub const RESERVED_DATABASES: [&str; 4] =
    ["information_schema", "mysql", "performance_schema", "sys"];

pub const NO_CONNECTION_MESSAGE: &str = "No hay conexión a la base de datos";

#[derive(thiserror::Error, Debug)]
pub enum DataAccessError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Query(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("connection already closed")]
    Closed,
}

impl From<std::io::Error> for DataAccessError {
    fn from(e: std::io::Error) -> Self {
        DataAccessError::Runtime(e.to_string())
    }
}

/// Opens sessions against a server.
#[async_trait]
pub trait SqlClient: Send + Sync {
    async fn open(&self, target: &ConnectTarget) -> Result<Box<dyn SqlSession>, DataAccessError>;
}

/// One live server session.
#[async_trait]
pub trait SqlSession: Send {
    /// Runs a row-returning statement and renders every cell to text.
    async fn fetch(&mut self, sql: &str) -> Result<ResultSet, DataAccessError>;
    /// Runs a statement and reports the affected row count.
    async fn execute(&mut self, sql: &str) -> Result<u64, DataAccessError>;
    async fn commit(&mut self) -> Result<(), DataAccessError>;
    async fn is_live(&mut self) -> bool;
    async fn close(&mut self) -> Result<(), DataAccessError>;
}

/// The read/write split is a plain prefix check on the trimmed text.
/// Leading comments or other row-returning keywords (`SHOW`, `WITH`) are
/// treated as writes.
pub fn is_read_statement(sql: &str) -> bool {
    sql.trim().to_lowercase().starts_with("select")
}

pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub fn affected_rows_message(count: u64) -> String {
    format!("Operación completada. Filas afectadas: {}", count)
}

pub fn sql_error_message(err: &DataAccessError) -> String {
    format!("Error SQL: {}", err)
}

pub struct DataAccess {
    client: Box<dyn SqlClient>,
    runtime: tokio::runtime::Runtime,
    port: u16,
    session: Option<Box<dyn SqlSession>>,
    database_name: String,
    last_error: Option<String>,
}

impl DataAccess {
    pub fn new(client: Box<dyn SqlClient>, port: u16) -> Result<Self, DataAccessError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            client,
            runtime,
            port,
            session: None,
            database_name: String::new(),
            last_error: None,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Text of the most recent connection failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn target(
        &self,
        host: &str,
        user: &str,
        password: &str,
        database: Option<&str>,
    ) -> ConnectTarget {
        ConnectTarget {
            host: host.to_string(),
            port: self.port,
            username: user.to_string(),
            password: password.to_string(),
            database: database.map(str::to_string),
        }
    }

    /// Lists user databases through a throwaway database-less session.
    pub fn list_databases(&mut self, host: &str, user: &str, password: &str) -> Vec<String> {
        let target = self.target(host, user, password, None);
        let client = &self.client;

        let result: Result<Vec<String>, DataAccessError> = self.runtime.block_on(async {
            let mut session = client.open(&target).await?;
            let listed = session.fetch("SHOW DATABASES").await;
            if let Err(e) = session.close().await {
                debug!("Closing database listing session failed: {}", e);
            }
            let databases = listed?
                .rows
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .filter(|name| !RESERVED_DATABASES.contains(&name.as_str()))
                .collect::<Vec<String>>();
            Ok::<_, DataAccessError>(databases)
        });

        match result {
            Ok(databases) => {
                debug!("Listed {} databases on {}", databases.len(), host);
                databases
            }
            Err(e) => {
                error!("Error obteniendo bases de datos: {}", e);
                Vec::new()
            }
        }
    }

    /// Opens the persistent session used by every other operation. A failed
    /// attempt leaves any current session in place.
    pub fn connect(&mut self, host: &str, user: &str, password: &str, database: &str) -> bool {
        let target = self.target(host, user, password, Some(database));
        match self.runtime.block_on(self.client.open(&target)) {
            Ok(session) => {
                info!("Connected to {}@{}/{}", user, host, database);
                self.close();
                self.session = Some(session);
                self.database_name = database.to_string();
                self.last_error = None;
                true
            }
            Err(e) => {
                error!("Error de conexión: {}", e);
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    pub fn list_tables(&mut self) -> Vec<String> {
        let sql = format!("SHOW TABLES FROM {}", quote_identifier(&self.database_name));
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        match self.runtime.block_on(session.fetch(&sql)) {
            Ok(set) => set
                .rows
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .collect(),
            Err(e) => {
                error!("Error obteniendo tablas: {}", e);
                Vec::new()
            }
        }
    }

    pub fn list_columns(&mut self, table_name: &str) -> Vec<ColumnInfo> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let sql = format!("DESCRIBE {}", quote_identifier(table_name));
        match self.runtime.block_on(session.fetch(&sql)) {
            Ok(set) => set
                .rows
                .into_iter()
                .filter_map(|row| {
                    let mut cells = row.into_iter();
                    Some(ColumnInfo::new(cells.next()?, cells.next()?))
                })
                .collect(),
            Err(e) => {
                error!("Error obteniendo columnas de {}: {}", table_name, e);
                Vec::new()
            }
        }
    }

    pub fn execute(&mut self, sql: &str) -> QueryOutcome {
        let Some(session) = self.session.as_mut() else {
            return QueryOutcome::Message(NO_CONNECTION_MESSAGE.to_string());
        };

        let is_read = is_read_statement(sql);
        let result = self.runtime.block_on(async {
            if is_read {
                let set = session.fetch(sql).await?;
                Ok::<_, DataAccessError>(QueryOutcome::Rows {
                    columns: set.columns,
                    rows: set.rows,
                })
            } else {
                let affected = session.execute(sql).await?;
                session.commit().await?;
                Ok(QueryOutcome::Message(affected_rows_message(affected)))
            }
        });

        match result {
            Ok(outcome) => {
                debug!("Statement finished: {}", outcome);
                outcome
            }
            Err(e) => {
                warn!("Statement failed: {}", e);
                QueryOutcome::Message(sql_error_message(&e))
            }
        }
    }

    /// Releases the session if there is one; calling it again is a no-op.
    pub fn close(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        self.runtime.block_on(async {
            if session.is_live().await {
                match session.close().await {
                    Ok(()) => info!("Closed connection to {}", self.database_name),
                    Err(e) => warn!("Closing connection failed: {}", e),
                }
            } else {
                debug!("Connection to {} was already gone", self.database_name);
            }
        });
    }
}

impl Drop for DataAccess {
    fn drop(&mut self) {
        self.close();
    }
}
