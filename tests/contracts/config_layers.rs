//! Configuration layer contracts
//!
//! Later layers win: master config, user config, application config,
//! instance file, then command-line overrides.

use crate::common::*;

fn color(env: &TestEnv, overrides: &[(&str, &str)]) -> Option<String> {
    let mut engine = env.loader_with(overrides).load("shop").unwrap();
    engine.get("color").unwrap()
}

/// CONTRACT: each layer overrides the ones before it
#[test]
fn contract_layers_apply_in_order() {
    let env = TestEnv::local("color = master\n");
    std::fs::create_dir_all(env.app_dir("shop")).unwrap();
    assert_eq!(color(&env, &[]).as_deref(), Some("master"));

    env.write("home/.wadf/config", "[globals]\ncolor = user\n");
    assert_eq!(color(&env, &[]).as_deref(), Some("user"));

    env.write("srv/shop/wadf.conf", "[globals]\ncolor = app\n");
    assert_eq!(color(&env, &[]).as_deref(), Some("app"));

    env.write("srv/shop/.wadf-instance", "shop\ncolor = instance\n");
    assert_eq!(color(&env, &[]).as_deref(), Some("instance"));

    assert_eq!(color(&env, &[("color", "cli")]).as_deref(), Some("cli"));
}

/// CONTRACT: the profile section of a file overrides its globals
#[test]
fn contract_profile_section_overrides_globals() {
    let env = TestEnv::local("profile = live\n");
    env.write(
        "srv/shop/wadf.conf",
        "[globals]\ncolor = grey\n\n[live]\ncolor = green\n\n[dev]\ncolor = red\n",
    );

    assert_eq!(color(&env, &[]).as_deref(), Some("green"));
    assert_eq!(color(&env, &[("profile", "dev")]).as_deref(), Some("red"));
    assert_eq!(color(&env, &[("profile", "missing")]).as_deref(), Some("grey"));
}

/// CONTRACT: boolean words are normalized, so `off` and `none` read as unset
#[test]
fn contract_boolean_words_are_normalized() {
    let env = TestEnv::local("debug = yes\ncache = off\nproxy = none\n");
    let mut engine = env.loader().load("shop").unwrap();

    assert_eq!(engine.get("debug").unwrap().as_deref(), Some("1"));
    assert!(engine.flag("debug").unwrap());
    assert_eq!(engine.get("cache").unwrap(), None);
    assert!(!engine.flag("cache").unwrap());
    assert_eq!(engine.get("proxy").unwrap(), None);
}

/// CONTRACT: the instance file's first line becomes `appref`, the other
/// lines are macros
#[test]
fn contract_instance_file_names_the_application() {
    let env = TestEnv::local("db_name = @appref@\n");
    env.write("srv/shop/.wadf-instance", "shop\ndb_host = db.recorded\n");

    let mut engine = env.loader().load("shop/").unwrap();

    assert_eq!(engine.get("appref").unwrap().as_deref(), Some("shop"));
    assert_eq!(engine.get("db1_name").unwrap().as_deref(), Some("shop"));
    assert_eq!(engine.get("db1_host").unwrap().as_deref(), Some("db.recorded"));
}

/// CONTRACT: a missing master config is not an error
#[test]
fn contract_missing_master_config_is_tolerated() {
    let env = TestEnv::new();
    let mut engine = env
        .loader_with(&[("db_host", "db.cli")])
        .load("shop")
        .unwrap();
    assert_eq!(engine.get("appref").unwrap().as_deref(), Some("shop"));
    assert_eq!(engine.get("db1_host").unwrap().as_deref(), Some("db.cli"));
}
