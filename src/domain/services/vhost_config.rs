//! Virtual host configuration
//!
//! The rendered vhost file carries marker comments naming the working copy
//! and deployed version, which `inspect` reads back when listing what is
//! deployed.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static VHOST_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<VirtualHost[^>]+>").expect("vhost open regex is valid"));

static VHOST_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ims)^\s*<VirtualHost\s+([^>]+)>(.*?)</VirtualHost>")
        .expect("vhost block regex is valid")
});

static SERVER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*ServerName\s+(\S+)").expect("server name regex is valid")
});

static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*#\s*desc:(.+)$").expect("desc regex is valid"));

static WORKING_COPY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*#\s*wadf-working-copy:(.+)$").expect("working copy regex is valid")
});

static DEPLOY_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*#\s*wadf-deploy-version:(.+)$").expect("deploy version regex is valid")
});

/// Turn literal `\n` and `\t` sequences from config values into real ones
pub fn unescape(value: &str) -> String {
    value.replace("\\n", "\n").replace("\\t", "\t")
}

/// Extra text inserted into every virtual host block
#[derive(Debug, Clone, Default)]
pub struct VhostExtras {
    /// Goes right after each `<VirtualHost ...>` line
    pub prepend: Option<String>,
    /// Goes right before each `</VirtualHost>`
    pub append: Option<String>,
}

/// Final vhost file: marker header, then the config with extras inserted
pub fn render(config: &str, working_copy: &Path, deploy_version: &str, extras: &VhostExtras) -> String {
    let mut out = format!(
        "# wadf-working-copy: {}\n# wadf-deploy-version: {}\n{}",
        working_copy.display(),
        deploy_version,
        config
    );

    if let Some(prepend) = extras.prepend.as_deref().filter(|p| !p.is_empty()) {
        let prepend = unescape(prepend);
        out = VHOST_OPEN
            .replace_all(&out, |caps: &Captures| format!("{}\n{}", &caps[0], prepend))
            .into_owned();
    }

    if let Some(append) = extras.append.as_deref().filter(|a| !a.is_empty()) {
        let append = unescape(append);
        out = out.replace("</VirtualHost>", &format!("{}\n</VirtualHost>", append));
    }

    out
}

/// One `<VirtualHost>` block of a deployed config
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeployedVhost {
    pub hostname: String,
    pub interface: String,
    pub description: Option<String>,
}

/// What a deployed vhost file says about its instance
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeployedInstance {
    pub instance: String,
    pub working_dir: String,
    pub deploy_version: String,
    pub vhosts: Vec<DeployedVhost>,
}

/// Read the markers and virtual hosts back out of a deployed config.
///
/// Returns `None` for files without any named virtual host.
pub fn inspect(instance: &str, contents: &str) -> Option<DeployedInstance> {
    let marker = |re: &Regex| {
        re.captures(contents)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    };

    let vhosts: Vec<DeployedVhost> = VHOST_BLOCK
        .captures_iter(contents)
        .filter_map(|block| {
            let body = &block[2];
            let hostname = SERVER_NAME.captures(body)?[1].to_string();
            Some(DeployedVhost {
                hostname,
                interface: block[1].trim().to_string(),
                description: DESCRIPTION.captures(body).map(|d| d[1].trim().to_string()),
            })
        })
        .collect();

    if vhosts.is_empty() {
        return None;
    }

    Some(DeployedInstance {
        instance: instance.to_string(),
        working_dir: marker(&WORKING_COPY),
        deploy_version: marker(&DEPLOY_VERSION),
        vhosts,
    })
}
