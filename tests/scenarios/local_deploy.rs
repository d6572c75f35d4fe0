//! Scenario: deploy an application that is already on disk
//!
//! Journey: a developer keeps a working copy under the deployment root and
//! wants its templates rendered with the master config, the application's
//! own `wadf.conf` and a few command-line overrides, then removes it again.

use std::sync::Arc;

use crate::common::*;
use wadf::{DeployOptions, DeployUseCase, UndeployOptions};

fn shop_env() -> TestEnv {
    let env = TestEnv::local("db_host = db.internal\nprofile = dev\n");
    env.write(
        "srv/shop/wadf.conf",
        "[globals]\ngreeting = hello from @appref@\ndebug = off\n\n[dev]\ndebug = on\n",
    );
    env.write(
        "srv/shop/public/config.php.template",
        "<?php\n$greeting = '@greeting@';\n$db = '@db_host@';\n$debug = '@debug@';\n",
    );
    env
}

#[test]
fn scenario_local_working_copy_is_rendered() {
    let env = shop_env();
    let runner = Arc::new(FakeRunner::new());
    let use_case = DeployUseCase::new(env.loader(), runner.clone());

    let report = use_case
        .deploy("shop", &DeployOptions::default())
        .expect("deploy should succeed");

    let dir = env.app_dir("shop");
    assert_eq!(report.instance, "shop");
    assert_eq!(report.deploy_path, dir);
    assert_eq!(report.deploy_version, "unknown");
    assert_eq!(report.rendered, vec![dir.join("public/config.php")]);
    assert!(report.is_complete(), "unexpected gaps: {:?}", report);

    // globals, then the dev profile section of the app config
    assert_eq!(
        env.read("srv/shop/public/config.php"),
        "<?php\n$greeting = 'hello from shop';\n$db = 'db.internal';\n$debug = '1';\n"
    );
    // the instance file names the deployment
    assert_eq!(env.read("srv/shop/.wadf-instance").lines().next(), Some("shop"));
    // nothing is configured that needs an external command
    assert!(runner.calls().is_empty(), "calls: {:?}", runner.calls());
}

#[test]
fn scenario_overrides_win_over_every_config_file() {
    let env = shop_env();
    let use_case = DeployUseCase::new(
        env.loader_with(&[("db_host", "db.override"), ("profile", "live")]),
        Arc::new(FakeRunner::new()),
    );

    use_case
        .deploy("shop", &DeployOptions::default())
        .expect("deploy should succeed");

    let rendered = env.read("srv/shop/public/config.php");
    assert!(rendered.contains("$db = 'db.override';"));
    // there is no live section, so only globals apply
    assert!(rendered.contains("$debug = '';"));
}

#[test]
fn scenario_unknown_macros_are_reported_not_fatal() {
    let env = shop_env();
    env.write("srv/shop/cron.ini.template", "mail=@admin_mail@\n");
    let use_case = DeployUseCase::new(env.loader(), Arc::new(FakeRunner::new()));

    let report = use_case
        .deploy("shop", &DeployOptions::default())
        .expect("deploy should succeed");

    assert_eq!(env.read("srv/shop/cron.ini"), "mail=@admin_mail@\n");
    let names: Vec<&str> = report.unresolved.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["admin_mail"]);
    assert!(!report.is_complete());
}

#[test]
fn scenario_deploy_then_undeploy_removes_everything() {
    let env = shop_env();
    let vhosts = env.path("vhosts");
    let hosts = env.write("hosts", "127.0.0.1\tlocalhost\n");
    env.write(
        "srv/shop/vhost.conf.template",
        "<VirtualHost *:80>\n\tServerName @vhost1_name@\n\tDocumentRoot @deploy_path@/public\n</VirtualHost>\n",
    );
    let vhosts_path = vhosts.to_string_lossy().into_owned();
    let hosts_path = hosts.to_string_lossy().into_owned();
    let runner = Arc::new(FakeRunner::new());
    let use_case = DeployUseCase::new(
        env.loader_with(&[
            ("vhost_name", "shop.test"),
            ("vhost_config_template", "vhost.conf"),
            ("vhost_config_path", vhosts_path.as_str()),
            ("deploy_dns", "hosts"),
            ("deploy_dns_hosts_file", hosts_path.as_str()),
            ("webserver_restart_cmd", "apachectl graceful"),
        ]),
        runner.clone(),
    );

    let report = use_case
        .deploy("shop", &DeployOptions::default())
        .expect("deploy should succeed");
    let conf = vhosts.join("shop.conf");
    assert_eq!(report.vhost_config.as_deref(), Some(conf.as_path()));
    let written = std::fs::read_to_string(&conf).unwrap();
    assert!(written.contains("ServerName shop.test"));
    assert!(written.contains(&format!(
        "DocumentRoot {}/public",
        env.app_dir("shop").display()
    )));
    assert!(env.read("hosts").contains("\tshop.test"));
    assert_eq!(runner.calls(), vec!["sh -c 'apachectl graceful'"]);

    let undeployed = use_case
        .undeploy("shop", &UndeployOptions::new())
        .expect("undeploy should succeed");
    assert_eq!(undeployed.instance, "shop");
    assert!(!conf.exists());
    assert!(!env.app_dir("shop").exists());
    assert_eq!(env.read("hosts"), "127.0.0.1\tlocalhost\n");
}
