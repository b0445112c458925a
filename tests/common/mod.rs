#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dbdesk::config::AppConfig;
use dbdesk::controller::{ColumnSource, SessionController, SessionView};
use dbdesk::data_access::{DataAccess, DataAccessError, SqlClient, SqlSession, quote_identifier};
use dbdesk::models::structs::{ColumnInfo, ConnectTarget, ResultSet};

/// In-memory stand-in for a MySQL server.
#[derive(Default)]
pub struct FakeServer {
    pub accounts: Vec<(String, String)>,
    pub allow_anonymous: bool,
    /// Raw `SHOW DATABASES` answer, system schemas included.
    pub databases: Vec<String>,
    pub tables: HashMap<String, Vec<String>>,
    pub columns: HashMap<String, Vec<(String, String)>>,
    pub selects: HashMap<String, ResultSet>,
    pub affected_rows: u64,
    pub fail_writes: Option<String>,
    /// Host of the most recent open attempt.
    pub last_host: Option<String>,
    /// Every statement and lifecycle event, in order.
    pub log: Vec<String>,
}

impl FakeServer {
    pub fn shop() -> Self {
        let mut server = FakeServer {
            accounts: vec![("root".into(), "secret".into())],
            databases: vec![
                "sys".into(),
                "shop".into(),
                "information_schema".into(),
                "blog".into(),
                "mysql".into(),
                "performance_schema".into(),
            ],
            affected_rows: 1,
            ..Default::default()
        };
        server
            .tables
            .insert("shop".into(), vec!["orders".into(), "users".into()]);
        server.columns.insert(
            "orders".into(),
            vec![("id".into(), "int".into()), ("total".into(), "decimal(10,2)".into())],
        );
        server.columns.insert(
            "users".into(),
            vec![("id".into(), "int".into()), ("email".into(), "varchar(255)".into())],
        );
        server.selects.insert(
            "select * from users".into(),
            ResultSet {
                columns: vec!["id".into(), "email".into()],
                rows: vec![
                    vec!["1".into(), "ana@example.com".into()],
                    vec!["2".into(), "NULL".into()],
                ],
            },
        );
        server
    }

    pub fn count(&self, entry: &str) -> usize {
        self.log.iter().filter(|e| e.as_str() == entry).count()
    }
}

pub type Shared = Arc<Mutex<FakeServer>>;

pub struct FakeClient {
    pub server: Shared,
}

#[async_trait]
impl SqlClient for FakeClient {
    async fn open(&self, target: &ConnectTarget) -> Result<Box<dyn SqlSession>, DataAccessError> {
        let mut server = self.server.lock().unwrap();
        server.last_host = Some(target.host.clone());
        let anonymous = target.username.is_empty() && target.password.is_empty();
        let known = server
            .accounts
            .iter()
            .any(|(u, p)| *u == target.username && *p == target.password);
        if !(known || (anonymous && server.allow_anonymous)) {
            server.log.push(format!("DENY {}", target.username));
            return Err(DataAccessError::Connect(format!(
                "Access denied for user '{}'@'{}'",
                target.username, target.host
            )));
        }
        if let Some(db) = &target.database
            && !server.databases.contains(db)
        {
            return Err(DataAccessError::Connect(format!("Unknown database '{}'", db)));
        }
        server.log.push(format!("OPEN {}", target.database.as_deref().unwrap_or("-")));
        Ok(Box::new(FakeSession {
            server: self.server.clone(),
            closed: false,
        }))
    }
}

pub struct FakeSession {
    server: Shared,
    closed: bool,
}

#[async_trait]
impl SqlSession for FakeSession {
    async fn fetch(&mut self, sql: &str) -> Result<ResultSet, DataAccessError> {
        let mut server = self.server.lock().unwrap();
        server.log.push(sql.to_string());

        if sql == "SHOW DATABASES" {
            return Ok(ResultSet {
                columns: vec!["Database".into()],
                rows: server.databases.iter().map(|d| vec![d.clone()]).collect(),
            });
        }
        for (db, tables) in &server.tables {
            if sql == format!("SHOW TABLES FROM {}", quote_identifier(db)) {
                return Ok(ResultSet {
                    columns: vec![format!("Tables_in_{}", db)],
                    rows: tables.iter().map(|t| vec![t.clone()]).collect(),
                });
            }
        }
        for (table, cols) in &server.columns {
            if sql == format!("DESCRIBE {}", quote_identifier(table)) {
                return Ok(ResultSet {
                    columns: vec!["Field".into(), "Type".into(), "Null".into()],
                    rows: cols
                        .iter()
                        .map(|(n, t)| vec![n.clone(), t.clone(), "YES".into()])
                        .collect(),
                });
            }
        }
        server
            .selects
            .get(&sql.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| DataAccessError::Query(format!("Unknown statement: {}", sql.trim())))
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, DataAccessError> {
        let mut server = self.server.lock().unwrap();
        server.log.push(sql.to_string());
        match &server.fail_writes {
            Some(reason) => Err(DataAccessError::Query(reason.clone())),
            None => Ok(server.affected_rows),
        }
    }

    async fn commit(&mut self) -> Result<(), DataAccessError> {
        self.server.lock().unwrap().log.push("COMMIT".into());
        Ok(())
    }

    async fn is_live(&mut self) -> bool {
        !self.closed
    }

    async fn close(&mut self) -> Result<(), DataAccessError> {
        self.closed = true;
        self.server.lock().unwrap().log.push("CLOSE".into());
        Ok(())
    }
}

pub fn shared(server: FakeServer) -> Shared {
    Arc::new(Mutex::new(server))
}

pub fn data_access(server: &Shared) -> DataAccess {
    DataAccess::new(Box::new(FakeClient { server: server.clone() }), 3306).unwrap()
}

pub fn controller(server: &Shared) -> SessionController {
    SessionController::new(data_access(server), &AppConfig::default())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    CloseLogin,
    LoginError(String),
    Structure {
        database: String,
        tables: Vec<String>,
        columns: Vec<Vec<ColumnInfo>>,
    },
    RevealMain,
    Results {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Message(String),
}

#[derive(Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl SessionView for RecordingView {
    fn close_login(&mut self) {
        self.events.push(ViewEvent::CloseLogin);
    }

    fn show_login_error(&mut self, message: &str) {
        self.events.push(ViewEvent::LoginError(message.to_string()));
    }

    fn load_structure(&mut self, database: &str, tables: &[String], columns: &mut dyn ColumnSource) {
        let columns = tables.iter().map(|t| columns.columns_for(t)).collect();
        self.events.push(ViewEvent::Structure {
            database: database.to_string(),
            tables: tables.to_vec(),
            columns,
        });
    }

    fn reveal_main(&mut self) {
        self.events.push(ViewEvent::RevealMain);
    }

    fn show_results(&mut self, columns: Vec<String>, rows: Vec<Vec<String>>) {
        self.events.push(ViewEvent::Results { columns, rows });
    }

    fn show_message(&mut self, message: &str) {
        self.events.push(ViewEvent::Message(message.to_string()));
    }
}
