//! Tests for the config module

use super::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn options(master: &Path) -> LoaderOptions {
    LoaderOptions::default()
        .with_master_config(master)
        .with_cwd("/work")
}

#[test]
fn test_profile_from_globals_selects_section() {
    let dir = tempdir().unwrap();
    let master = dir.path().join("wadf.conf");
    write(
        &master,
        "profile = dev\nvc_type = SVN\n\n[dev]\ndeploy_path = /srv/@appref@\n\n[live]\ndeploy_path = /var/www/@appref@\n",
    );

    let mut engine = ConfigLoader::new(options(&master)).load("shop/").unwrap();
    assert_eq!(engine.resolve("appref").unwrap(), "shop");
    assert_eq!(engine.resolve("deploy_path").unwrap(), "/srv/shop");
    assert_eq!(engine.resolve("cwd").unwrap(), "/work");
}

#[test]
fn test_profile_override_wins() {
    let dir = tempdir().unwrap();
    let master = dir.path().join("wadf.conf");
    write(
        &master,
        "profile = dev\n[dev]\ndeploy_path = /srv/@appref@\n[live]\ndeploy_path = /var/www/@appref@\n",
    );

    let opts = options(&master).with_override("profile", "live");
    let mut engine = ConfigLoader::new(opts).load("shop").unwrap();
    assert_eq!(engine.resolve("deploy_path").unwrap(), "/var/www/shop");
    assert_eq!(engine.resolve("profile").unwrap(), "live");
}

#[test]
fn test_layers_apply_in_order() {
    let dir = tempdir().unwrap();
    let master = dir.path().join("wadf.conf");
    let user = dir.path().join("home/.wadf/config");
    let deploy = dir.path().join("srv/shop");
    write(
        &master,
        &format!(
            "profile = dev\n[dev]\ndeploy_path = {}/srv/@appref@\nlocal_config = @deploy_path@/wadf.conf\ndb1_host = master\nvhost1_name = master\ndb1_name = master\n",
            dir.path().display()
        ),
    );
    write(&user, "[dev]\ndb1_host = user\nvhost1_name = user\n");
    write(&deploy.join("wadf.conf"), "[dev]\nvhost1_name = app\ndb1_name = app\n");
    write(&deploy.join(".wadf-instance"), "shop\ndb1_name = instance\n");

    let opts = options(&master)
        .with_user_config(Some(user))
        .with_override("db1_name", "cmdline");
    let mut engine = ConfigLoader::new(opts).load("shop").unwrap();

    assert_eq!(engine.resolve("db1_host").unwrap(), "user");
    assert_eq!(engine.resolve("vhost1_name").unwrap(), "app");
    assert_eq!(engine.resolve("db1_name").unwrap(), "cmdline");
}

#[test]
fn test_instance_file_supplies_values() {
    let dir = tempdir().unwrap();
    let master = dir.path().join("wadf.conf");
    let deploy = dir.path().join("deploy");
    write(
        &master,
        &format!("[globals]\ndeploy_path = {}\n", deploy.display()),
    );
    write(&deploy.join(".wadf-instance"), "shop-dev\ndb1_pass = typed-in\n");

    let mut engine = ConfigLoader::new(options(&master)).load("other").unwrap();
    assert_eq!(engine.resolve("db1_pass").unwrap(), "typed-in");
    assert_eq!(engine.resolve("appref").unwrap(), "shop-dev");
}

#[test]
fn test_deploy_path_override_is_used_to_find_local_config() {
    let dir = tempdir().unwrap();
    let master = dir.path().join("wadf.conf");
    let deploy = dir.path().join("elsewhere");
    write(
        &master,
        "deploy_path = /nonexistent\nlocal_config = @deploy_path@/app.conf\n",
    );
    write(&deploy.join("app.conf"), "[globals]\nkickstart_script = @deploy_path@/kick.sh\n");

    let opts = options(&master).with_override("deploy_path", deploy.to_string_lossy());
    let mut engine = ConfigLoader::new(opts).load("shop").unwrap();
    assert_eq!(
        engine.resolve("kickstart_script").unwrap(),
        format!("{}/kick.sh", deploy.display())
    );
}

#[test]
fn test_missing_master_config_is_not_fatal() {
    let dir = tempdir().unwrap();
    let opts = options(&dir.path().join("missing.conf")).with_override("vc_type", "none");
    let mut engine = ConfigLoader::new(opts).load("shop").unwrap();
    assert_eq!(engine.resolve("vc_type").unwrap(), "none");
}

#[test]
fn test_internal_macros() {
    let macros = internal_macros(Some(Path::new("/tmp/x")));
    let names: Vec<_> = macros.iter().map(|(k, _)| k.as_str()).collect();
    assert!(names.contains(&"hostname"));
    assert!(names.contains(&"user"));
    assert!(macros.contains(&("cwd".to_string(), "/tmp/x".to_string())));
}

#[test]
fn test_override_value_is_last_one() {
    let opts = LoaderOptions::default()
        .with_override("profile", "dev")
        .with_override("profile", "live");
    assert_eq!(opts.override_value("profile"), Some("live"));
    assert_eq!(opts.override_value("instance"), None);
}
