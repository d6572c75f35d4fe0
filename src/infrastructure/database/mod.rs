//! Database server adapters

mod mysql;

pub use mysql::MysqlCli;
