//! Scenario: deploying the same application again
//!
//! Journey: a developer changes the application config and redeploys, then
//! sets up a second instance of the same application next to the first.

use std::sync::Arc;

use crate::common::*;
use wadf::{DeployOptions, DeployUseCase};

#[test]
fn scenario_redeploy_picks_up_config_changes() {
    let env = TestEnv::local("");
    env.write("srv/blog/wadf.conf", "[globals]\ntitle = First\n");
    env.write("srv/blog/site.ini.template", "title=@title@\n");
    let use_case = DeployUseCase::new(env.loader(), Arc::new(FakeRunner::new()));

    use_case
        .deploy("blog", &DeployOptions::default())
        .expect("first deploy should succeed");
    assert_eq!(env.read("srv/blog/site.ini"), "title=First\n");

    env.write("srv/blog/wadf.conf", "[globals]\ntitle = Second\n");
    let report = use_case
        .deploy("blog", &DeployOptions::default())
        .expect("redeploy should succeed");

    assert_eq!(env.read("srv/blog/site.ini"), "title=Second\n");
    assert_eq!(report.rendered.len(), 1);
    // the instance line is rewritten, not duplicated
    assert_eq!(env.read("srv/blog/.wadf-instance"), "blog\n");
}

#[test]
fn scenario_second_instance_of_the_same_application() {
    let env = TestEnv::local("");
    for instance in ["blog", "blog-staging"] {
        env.write(
            &format!("srv/{instance}/site.ini.template"),
            "instance=@instance@\npath=@deploy_path@\n",
        );
    }

    DeployUseCase::new(env.loader(), Arc::new(FakeRunner::new()))
        .deploy("blog", &DeployOptions::default())
        .expect("deploy of the main instance should succeed");

    let defines = vec![("instance".to_string(), "blog-staging".to_string())];
    let report = DeployUseCase::new(
        env.loader_with(&[("instance", "blog-staging")]),
        Arc::new(FakeRunner::new()),
    )
    .deploy("blog", &DeployOptions::default().with_cmdline_macros(defines))
    .expect("deploy of the staging instance should succeed");

    let staging = env.app_dir("blog-staging");
    assert_eq!(report.instance, "blog-staging");
    assert_eq!(report.deploy_path, staging);
    assert_eq!(
        env.read("srv/blog-staging/site.ini"),
        format!("instance=blog-staging\npath={}\n", staging.display())
    );
    assert_eq!(
        env.read("srv/blog/site.ini"),
        format!("instance=blog\npath={}\n", env.app_dir("blog").display())
    );
    // `instance` is the first line, never a macro line
    assert_eq!(env.read("srv/blog-staging/.wadf-instance"), "blog-staging\n");
}
