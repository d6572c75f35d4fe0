//! MySQL through the `mysql` command-line client
//!
//! Statements are passed with `-e`; the password travels in `MYSQL_PWD`
//! so it never shows up in the process list.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{CommandRunner, CommandSpec, DatabaseAdmin, DbAccount, DbConnection};
use crate::error::{WadfError, WadfResult};

pub struct MysqlCli {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl MysqlCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            program: "mysql".to_string(),
        }
    }

    /// Use another client binary (e.g. `mariadb`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn client(&self, conn: &DbConnection, database: Option<&str>) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program)
            .args(["--batch", "--skip-column-names"])
            .arg("-h")
            .arg(&conn.host)
            .arg("-u")
            .arg(&conn.user);
        if let Some(password) = conn.password.as_deref().filter(|p| !p.is_empty()) {
            spec = spec.env("MYSQL_PWD", password);
        }
        if let Some(db) = database {
            spec = spec.arg(db);
        }
        spec
    }

    fn execute(&self, conn: &DbConnection, database: Option<&str>, sql: &str) -> WadfResult<String> {
        debug!(host = %conn.host, "mysql: {}", sql);
        let out = self
            .runner
            .run(&self.client(conn, database).arg("-e").arg(sql))?;
        if !out.success() {
            return Err(WadfError::tool(
                "mysql",
                out.status,
                format!(
                    "{} (host={}, user={})\n{}",
                    sql,
                    conn.host,
                    conn.user,
                    out.combined()
                ),
            ));
        }
        Ok(out.stdout)
    }
}

/// Backtick-quote an identifier
pub(crate) fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Single-quote a string literal
pub(crate) fn quote_str(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn account(account: &DbAccount) -> String {
    format!("{}@{}", quote_str(&account.user), quote_str(&account.host))
}

impl DatabaseAdmin for MysqlCli {
    fn create_database(&self, conn: &DbConnection, name: &str) -> WadfResult<()> {
        self.execute(
            conn,
            None,
            &format!("CREATE DATABASE IF NOT EXISTS {}", quote_ident(name)),
        )?;
        Ok(())
    }

    fn grant_all(&self, conn: &DbConnection, name: &str, acct: &DbAccount) -> WadfResult<()> {
        let sql = format!(
            "CREATE USER IF NOT EXISTS {who} IDENTIFIED BY {pass}; GRANT ALL ON {db}.* TO {who}",
            who = account(acct),
            pass = quote_str(&acct.password),
            db = quote_ident(name),
        );
        self.execute(conn, None, &sql)?;
        Ok(())
    }

    fn revoke_all(&self, conn: &DbConnection, name: &str, acct: &DbAccount) -> WadfResult<()> {
        let sql = format!(
            "REVOKE ALL ON {}.* FROM {}",
            quote_ident(name),
            account(acct)
        );
        self.execute(conn, None, &sql)?;
        Ok(())
    }

    fn drop_database(&self, conn: &DbConnection, name: &str) -> WadfResult<()> {
        self.execute(conn, None, &format!("DROP DATABASE IF EXISTS {}", quote_ident(name)))?;
        Ok(())
    }

    fn drop_all_tables(&self, conn: &DbConnection, name: &str) -> WadfResult<()> {
        let listing = self.execute(
            conn,
            None,
            &format!(
                "SELECT table_name, table_type FROM information_schema.tables \
                 WHERE table_schema = {} AND table_type IN ('VIEW', 'BASE TABLE') \
                 ORDER BY table_name",
                quote_str(name)
            ),
        )?;

        let mut statements = vec!["SET FOREIGN_KEY_CHECKS=0".to_string()];
        for line in listing.lines() {
            let mut fields = line.split('\t');
            let (Some(table), kind) = (fields.next().filter(|t| !t.is_empty()), fields.next())
            else {
                continue;
            };
            let keyword = if kind == Some("VIEW") { "VIEW" } else { "TABLE" };
            statements.push(format!("DROP {} {}", keyword, quote_ident(table)));
        }
        if statements.len() == 1 {
            debug!("database {} has no tables", name);
            return Ok(());
        }
        self.execute(conn, Some(name), &statements.join("; "))?;
        Ok(())
    }

    fn load_schema(&self, conn: &DbConnection, name: &str, schema: &Path) -> WadfResult<()> {
        let out = self
            .runner
            .run(&self.client(conn, Some(name)).stdin_from(schema))?;
        if !out.success() {
            return Err(WadfError::tool(
                "mysql",
                out.status,
                format!(
                    "Could not load schema {} into {}\n{}",
                    schema.display(),
                    name,
                    out.combined()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::CommandOutput;
    use crate::infrastructure::process::scripted::ScriptedRunner;

    fn conn() -> DbConnection {
        DbConnection {
            host: "db.local".to_string(),
            user: "root".to_string(),
            password: Some("s3cret".to_string()),
        }
    }

    fn mysql(runner: ScriptedRunner) -> (Arc<ScriptedRunner>, MysqlCli) {
        let runner = Arc::new(runner);
        (runner.clone(), MysqlCli::new(runner))
    }

    #[test]
    fn quoting() {
        assert_eq!(quote_ident("shop`dev"), "`shop``dev`");
        assert_eq!(quote_str("it's"), "'it\\'s'");
    }

    #[test]
    fn create_database_passes_password_in_env() {
        let (runner, db) = mysql(ScriptedRunner::new());
        db.create_database(&conn(), "shop_dev").unwrap();

        let spec = &runner.specs()[0];
        assert_eq!(spec.program, "mysql");
        assert!(!spec.args.iter().any(|a| a.contains("s3cret")));
        assert_eq!(spec.env, vec![("MYSQL_PWD".to_string(), "s3cret".to_string())]);
        assert_eq!(
            spec.args.last().map(String::as_str),
            Some("CREATE DATABASE IF NOT EXISTS `shop_dev`")
        );
    }

    #[test]
    fn grant_creates_user_first() {
        let (runner, db) = mysql(ScriptedRunner::new());
        let acct = DbAccount {
            user: "shop".to_string(),
            host: "localhost".to_string(),
            password: "pw".to_string(),
        };
        db.grant_all(&conn(), "shop_dev", &acct).unwrap();
        let sql = runner.specs()[0].args.last().cloned().unwrap();
        assert_eq!(
            sql,
            "CREATE USER IF NOT EXISTS 'shop'@'localhost' IDENTIFIED BY 'pw'; \
             GRANT ALL ON `shop_dev`.* TO 'shop'@'localhost'"
        );
    }

    #[test]
    fn drop_all_tables_drops_views_and_tables() {
        let (runner, db) = mysql(ScriptedRunner::new().on(
            "mysql --batch --skip-column-names -h db.local -u root -e 'SELECT",
            CommandOutput::ok("orders\tBASE TABLE\norder_totals\tVIEW\n"),
        ));
        db.drop_all_tables(&conn(), "shop_dev").unwrap();

        let specs = runner.specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs[1].args.last().map(String::as_str),
            Some("SET FOREIGN_KEY_CHECKS=0; DROP TABLE `orders`; DROP VIEW `order_totals`")
        );
        assert!(specs[1].args.contains(&"shop_dev".to_string()));
    }

    #[test]
    fn drop_all_tables_on_empty_database_is_one_query() {
        let (runner, db) = mysql(ScriptedRunner::new());
        db.drop_all_tables(&conn(), "empty").unwrap();
        assert_eq!(runner.specs().len(), 1);
    }

    #[test]
    fn failure_is_external_tool_error() {
        let (_, db) = mysql(ScriptedRunner::new().on(
            "mysql",
            CommandOutput::failed(1, "ERROR 1045 (28000): Access denied"),
        ));
        let err = db.drop_database(&conn(), "shop_dev").unwrap_err();
        assert!(err.to_string().contains("Access denied"));
    }

    #[test]
    fn load_schema_feeds_file_on_stdin() {
        let (runner, db) = mysql(ScriptedRunner::new());
        db.load_schema(&conn(), "shop_dev", Path::new("/srv/shop/schema.sql"))
            .unwrap();
        let spec = &runner.specs()[0];
        assert_eq!(spec.stdin_file.as_deref(), Some(Path::new("/srv/shop/schema.sql")));
        assert_eq!(spec.args.last().map(String::as_str), Some("shop_dev"));
    }
}
