//! File format contracts
//!
//! wadf edits files it shares with the system (crontab, hosts file,
//! webserver config) and reads its own markers back later. These formats
//! must not drift.

use std::path::Path;

use wadf::domain::services::crontab;
use wadf::domain::services::hosts_file::{add_hosts, remove_hosts, HostsFormat};
use wadf::domain::services::vhost_config::{inspect, render, VhostExtras};
use wadf::infrastructure::config::InstanceFile;

/// CONTRACT: rendered vhost configs start with the working copy and version
/// markers, and extras go inside every block
#[test]
fn contract_vhost_config_markers() {
    let config = "<VirtualHost *:80>\n\tServerName shop.test\n</VirtualHost>\n\
                  <VirtualHost *:443>\n\tServerName shop.test\n</VirtualHost>\n";
    let extras = VhostExtras {
        prepend: Some("\\tSetEnv APP shop".to_string()),
        append: Some("\\tCustomLog off".to_string()),
    };

    let rendered = render(config, Path::new("/srv/shop"), "1.4.0", &extras);

    insta::assert_snapshot!(rendered, @r"
    # wadf-working-copy: /srv/shop
    # wadf-deploy-version: 1.4.0
    <VirtualHost *:80>
    	SetEnv APP shop
    	ServerName shop.test
    	CustomLog off
    </VirtualHost>
    <VirtualHost *:443>
    	SetEnv APP shop
    	ServerName shop.test
    	CustomLog off
    </VirtualHost>
    ");

    let deployed = inspect("shop", &rendered).unwrap();
    assert_eq!(deployed.working_dir, "/srv/shop");
    assert_eq!(deployed.deploy_version, "1.4.0");
    assert_eq!(deployed.vhosts.len(), 2);
}

/// CONTRACT: an instance's crontab block is replaced in place and other
/// lines are kept
#[test]
fn contract_crontab_block_is_replaced_in_place() {
    let existing = "MAILTO=ops@example.com\n\
                    # wadf-deployment-begin: shop - DO NOT REMOVE THIS\n\
                    0 * * * * php /srv/shop/old.php\n\
                    # wadf-deployment-end: shop - DO NOT REMOVE THIS\n\
                    30 2 * * * /usr/local/bin/backup\n";

    let merged = crontab::merge(Some(existing), "shop", "*/5 * * * * php /srv/shop/cron.php\n");

    insta::assert_snapshot!(merged, @r"
    MAILTO=ops@example.com
    # wadf-deployment-begin: shop - DO NOT REMOVE THIS
    */5 * * * * php /srv/shop/cron.php
    # wadf-deployment-end: shop - DO NOT REMOVE THIS
    30 2 * * * /usr/local/bin/backup
    ");

    let removed = crontab::remove(&merged, "shop").unwrap();
    assert!(!removed.contains("wadf-deployment"));
    assert!(removed.contains("MAILTO=ops@example.com"));
    assert!(removed.contains("/usr/local/bin/backup"));
    assert_eq!(crontab::remove(&removed, "shop"), None);
}

/// CONTRACT: other instances' crontab blocks are left alone
#[test]
fn contract_crontab_blocks_are_per_instance() {
    let shop = crontab::merge(None, "shop", "@hourly shop-job");
    let both = crontab::merge(Some(&shop), "blog", "@daily blog-job");

    assert_eq!(both.matches("wadf-deployment-begin").count(), 2);
    let blog_removed = crontab::remove(&both, "blog").unwrap();
    assert!(blog_removed.contains("@hourly shop-job"));
    assert!(!blog_removed.contains("blog-job"));
}

/// CONTRACT: hosts entries use tabs and sit after the last line for the ip
#[test]
fn contract_hosts_file_entries() {
    let hosts = "127.0.0.1\tlocalhost\n10.0.0.5\tbuild\n";
    let names = vec!["shop.test".to_string(), "admin.shop.test".to_string()];

    let with_base = add_hosts(hosts, "127.0.0.1", &names, HostsFormat::WithBaseHost);
    insta::assert_snapshot!(with_base, @r"
    127.0.0.1	localhost
    127.0.0.1	localhost	shop.test
    127.0.0.1	localhost	admin.shop.test
    10.0.0.5	build
    ");

    let host_only = add_hosts(hosts, "10.0.0.9", &names, HostsFormat::HostOnly);
    insta::assert_snapshot!(host_only, @r"
    127.0.0.1	localhost
    10.0.0.5	build
    10.0.0.9	shop.test
    10.0.0.9	admin.shop.test
    ");

    assert_eq!(remove_hosts(&with_base, &names), hosts);
    // adding again changes nothing
    assert_eq!(
        add_hosts(&with_base, "127.0.0.1", &names, HostsFormat::WithBaseHost),
        with_base
    );
}

/// CONTRACT: the instance file keeps the instance on line one and
/// `name = value` lines below it
#[test]
fn contract_instance_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".wadf-instance");
    let cmdline = vec![
        ("instance".to_string(), "shop-live".to_string()),
        ("db_host".to_string(), "db.live".to_string()),
    ];

    InstanceFile::write(&path, "shop-live", &cmdline).unwrap();
    InstanceFile::append(&path, &[("smtp_password".to_string(), "s3cret".to_string())]).unwrap();
    // a redeploy under the same name keeps the recorded lines once
    InstanceFile::write(&path, "shop-live", &cmdline).unwrap();

    insta::assert_snapshot!(std::fs::read_to_string(&path).unwrap(), @r"
    shop-live
    db_host = db.live
    smtp_password = s3cret
    ");
}
