//! Database deployment
//!
//! Each `dbN` referenced by the templates is set up according to its
//! `dbN_deploy` list (`create`, `grant`, `schema`).

use std::path::Path;

use tracing::{error, info, warn};

use crate::application::deploy::use_case::DeployUseCase;
use crate::domain::ports::{DbAccount, DbConnection};
use crate::domain::services::entity_enumeration::NumberedEntities;
use crate::domain::services::MacroEngine;
use crate::error::{WadfError, WadfResult};

const SUPPORTED_TYPE: &str = "mysql";
const DEFAULT_USER_HOST: &str = "localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DbAction {
    Create,
    Grant,
    Schema,
}

impl DbAction {
    /// Parse `dbN_deploy`; unknown entries are configuration errors
    pub(crate) fn parse_list(num: &str, value: &str) -> WadfResult<Vec<DbAction>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "create" => Ok(DbAction::Create),
                "grant" => Ok(DbAction::Grant),
                "schema" => Ok(DbAction::Schema),
                other => Err(WadfError::config(format!(
                    "Invalid database deployment option in db{}_deploy: {}",
                    num, other
                ))),
            })
            .collect()
    }
}

/// Everything about one numbered database
struct DatabaseTarget {
    name: String,
    schema: Option<String>,
    actions: Vec<DbAction>,
    conn: DbConnection,
    account: DbAccount,
}

impl DatabaseTarget {
    fn load(engine: &mut MacroEngine, num: &str) -> WadfResult<Self> {
        let mut get = |suffix: &str| engine.get_or_empty(&format!("db{}_{}", num, suffix));
        let host = get("host")?;
        let user = get("user")?;
        let pass = get("pass")?;
        let name = get("name")?;
        let db_type = get("type")?;
        let schema = get("schema")?;
        let deploy = get("deploy")?;
        let deploy_user = get("deploy_user")?;
        let deploy_pass = get("deploy_pass")?;
        let user_host = get("user_host")?;

        Ok(Self {
            actions: DbAction::parse_list(num, &deploy)?,
            schema: Some(schema).filter(|s| !s.is_empty()),
            conn: DbConnection {
                host: host.clone(),
                user: deploy_user,
                password: Some(deploy_pass).filter(|p| !p.is_empty()),
            },
            account: DbAccount {
                user: user.clone(),
                host: if user_host.is_empty() {
                    DEFAULT_USER_HOST.to_string()
                } else {
                    user_host
                },
                password: pass,
            },
            name: check_db_fields(num, &host, &user, &name, &db_type)?,
        })
    }

    fn has(&self, action: DbAction) -> bool {
        self.actions.contains(&action)
    }
}

fn check_db_fields(num: &str, host: &str, user: &str, name: &str, db_type: &str) -> WadfResult<String> {
    if db_type != SUPPORTED_TYPE {
        return Err(WadfError::config(format!(
            "Unsupported database type '{}' when deploying database db{}",
            db_type, num
        )));
    }
    for (option, value) in [("host", host), ("user", user), ("name", name), ("type", db_type)] {
        if value.is_empty() {
            return Err(WadfError::config(format!(
                "The database configuration option db{}_{} is empty",
                num, option
            )));
        }
    }
    Ok(name.to_string())
}

impl DeployUseCase {
    pub(crate) fn deploy_database(
        &self,
        engine: &mut MacroEngine,
        dir: &Path,
        entities: &NumberedEntities,
    ) -> WadfResult<()> {
        if entities.databases.is_empty() {
            info!("No database to deploy");
            self.skip("database", "no databases referenced");
            return Ok(());
        }

        for num in &entities.databases {
            let target = DatabaseTarget::load(engine, num)?;
            info!("Setting up database {} on host {}...", target.name, target.conn.host);

            if target.has(DbAction::Create) {
                self.database.create_database(&target.conn, &target.name)?;
            }
            if target.has(DbAction::Grant) {
                self.database
                    .grant_all(&target.conn, &target.name, &target.account)?;
            }
            if target.has(DbAction::Schema) {
                self.database.drop_all_tables(&target.conn, &target.name)?;
                if let Some(schema) = &target.schema {
                    let path = dir.join(schema);
                    if path.is_file() {
                        info!(
                            "Deploying new schema for database {} as user {}...",
                            target.name, target.conn.user
                        );
                        self.database.load_schema(&target.conn, &target.name, &path)?;
                    } else {
                        info!("No schema file found to deploy at {}", path.display());
                    }
                }
            }
        }
        Ok(())
    }

    /// Best effort: failures are logged and the next database is tried
    pub(crate) fn undeploy_database(
        &self,
        engine: &mut MacroEngine,
        entities: &NumberedEntities,
    ) -> WadfResult<()> {
        for num in &entities.databases {
            let target = DatabaseTarget::load(engine, num)?;

            if target.has(DbAction::Grant) {
                if let Err(e) = self
                    .database
                    .revoke_all(&target.conn, &target.name, &target.account)
                {
                    warn!("Could not revoke access to {}: {}", target.name, e);
                }
            }
            if target.has(DbAction::Create) {
                info!("Dropping database {}...", target.name);
                if let Err(e) = self.database.drop_database(&target.conn, &target.name) {
                    error!("Could not drop database {}: {}", target.name, e);
                }
            } else if target.has(DbAction::Schema) {
                if let Err(e) = self.database.drop_all_tables(&target.conn, &target.name) {
                    warn!("Could not remove tables from {}: {}", target.name, e);
                }
            }
        }
        Ok(())
    }
}
