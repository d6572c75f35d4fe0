//! Local name resolution for the deployed virtual hosts

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::application::deploy::use_case::DeployUseCase;
use crate::domain::services::entity_enumeration::NumberedEntities;
use crate::domain::services::hosts_file::{add_hosts, remove_hosts, HostsFormat};
use crate::domain::services::MacroEngine;
use crate::error::{WadfError, WadfResult};

const HOSTS_METHOD: &str = "hosts";
const DEFAULT_HOSTS_FILE: &str = "/etc/hosts";
const DEFAULT_HOSTS_IP: &str = "127.0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DnsMode {
    Deploy,
    Undeploy,
}

impl DeployUseCase {
    /// Add (or remove) every `vhostN_name` according to `deploy_dns`
    pub(crate) fn deploy_dns(
        &self,
        engine: &mut MacroEngine,
        entities: &NumberedEntities,
        mode: DnsMode,
    ) -> WadfResult<()> {
        let Some(method) = engine.get("deploy_dns")? else {
            self.skip("dns", "deploy_dns not set");
            return Ok(());
        };
        if method != HOSTS_METHOD {
            return Err(WadfError::config(format!(
                "Unknown DNS deployment method '{}'",
                method
            )));
        }
        if entities.vhosts.is_empty() {
            self.skip("dns", "no virtual hosts referenced");
            return Ok(());
        }

        let mut hosts = Vec::new();
        for num in &entities.vhosts {
            if let Some(host) = engine.get(&format!("vhost{}_name", num))? {
                hosts.push(host);
            }
        }

        let hosts_file = PathBuf::from(
            engine
                .get("deploy_dns_hosts_file")?
                .unwrap_or_else(|| DEFAULT_HOSTS_FILE.to_string()),
        );
        let contents = match fs::read_to_string(&hosts_file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(WadfError::io_at(&hosts_file, e)),
        };

        let updated = match mode {
            DnsMode::Deploy => {
                let ip = engine
                    .get("deploy_dns_hosts_ip")?
                    .unwrap_or_else(|| DEFAULT_HOSTS_IP.to_string());
                let format =
                    HostsFormat::from_option(engine.get("deploy_dns_hosts_file_format")?.as_deref())?;
                info!("Adding {} to {}", hosts.join(" "), hosts_file.display());
                add_hosts(&contents, &ip, &hosts, format)
            }
            DnsMode::Undeploy => {
                info!("Removing hosts from DNS hosts file");
                remove_hosts(&contents, &hosts)
            }
        };

        if updated != contents {
            if let Err(e) = fs::write(&hosts_file, updated) {
                warn!(
                    "Could not update list of local hostnames in hosts file '{}'. Check permissions. ({})",
                    hosts_file.display(),
                    e
                );
            }
        }
        Ok(())
    }
}
