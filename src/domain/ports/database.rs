//! Database Admin Port
//!
//! The operations database deployment needs from a server, run with the
//! deployment (administrative) credentials.

use std::path::Path;

use crate::error::WadfResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConnection {
    pub host: String,
    pub user: String,
    pub password: Option<String>,
}

/// Application account to grant access to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbAccount {
    pub user: String,
    pub host: String,
    pub password: String,
}

pub trait DatabaseAdmin {
    fn create_database(&self, conn: &DbConnection, name: &str) -> WadfResult<()>;

    fn grant_all(&self, conn: &DbConnection, name: &str, account: &DbAccount) -> WadfResult<()>;

    fn revoke_all(&self, conn: &DbConnection, name: &str, account: &DbAccount) -> WadfResult<()>;

    fn drop_database(&self, conn: &DbConnection, name: &str) -> WadfResult<()>;

    /// Drop every table and view, leaving an empty database
    fn drop_all_tables(&self, conn: &DbConnection, name: &str) -> WadfResult<()>;

    fn load_schema(&self, conn: &DbConnection, name: &str, schema: &Path) -> WadfResult<()>;
}
