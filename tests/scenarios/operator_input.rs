//! Scenario: configuration that needs the operator
//!
//! Journey: the application config marks a licence key as required (`**`)
//! and an SMTP password as asked at deploy time (`%%`). The operator first
//! forgets the key, then passes it on the command line and answers the
//! prompt; later deploys remember both.

use std::sync::Arc;

use crate::common::*;
use wadf::{DeployOptions, DeployUseCase, WadfError};

fn mailer_env() -> TestEnv {
    let env = TestEnv::local("");
    env.write(
        "srv/mailer/wadf.conf",
        "[globals]\nlicense_key = ** from the vendor portal\nsmtp_password = %% ops know it\n",
    );
    env.write(
        "srv/mailer/mail.ini.template",
        "key=@license_key@\npassword=@smtp_password@\n",
    );
    env
}

#[test]
fn scenario_required_option_blocks_the_deploy() {
    let env = mailer_env();
    let prompter = ScriptedPrompter::answering(&["s3cret"]);
    let use_case = DeployUseCase::new(env.loader(), Arc::new(FakeRunner::new()))
        .with_prompter(Box::new(prompter.clone()));

    let err = use_case
        .deploy("mailer", &DeployOptions::default())
        .expect_err("deploy should stop on the required option");

    match &err {
        WadfError::RequiredInput { name, notes } => {
            assert_eq!(name, "license_key");
            assert_eq!(notes, "from the vendor portal");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "the option 'license_key' needs to be configured (notes: from the vendor portal)"
    );
    assert!(!env.path("srv/mailer/mail.ini").exists());
}

#[test]
fn scenario_answers_and_overrides_are_remembered() {
    let env = mailer_env();
    let defines = vec![("license_key".to_string(), "K-123".to_string())];

    // First deploy: the key comes from -D, the password from the prompt
    let prompter = ScriptedPrompter::answering(&["s3cret"]);
    DeployUseCase::new(env.loader_with(&[("license_key", "K-123")]), Arc::new(FakeRunner::new()))
        .with_prompter(Box::new(prompter.clone()))
        .deploy(
            "mailer",
            &DeployOptions::default().with_cmdline_macros(defines),
        )
        .expect("first deploy should succeed");

    let asked = prompter.asked();
    assert_eq!(asked.len(), 1);
    assert_eq!(asked[0].name, "smtp_password");
    assert!(asked[0].secret);
    assert!(asked[0].message.ends_with("\nNotes: ops know it"));
    assert_eq!(env.read("srv/mailer/mail.ini"), "key=K-123\npassword=s3cret\n");

    let instance = env.read("srv/mailer/.wadf-instance");
    assert!(instance.starts_with("mailer\n"));
    assert!(instance.contains("license_key = K-123\n"));
    assert!(instance.contains("smtp_password = s3cret\n"));

    // Second deploy: nothing on the command line, nobody to ask
    let silent = ScriptedPrompter::answering(&[]);
    DeployUseCase::new(env.loader(), Arc::new(FakeRunner::new()))
        .with_prompter(Box::new(silent.clone()))
        .deploy("mailer", &DeployOptions::default())
        .expect("redeploy should reuse the recorded values");

    assert!(silent.asked().is_empty());
    assert_eq!(env.read("srv/mailer/mail.ini"), "key=K-123\npassword=s3cret\n");
}

#[test]
fn scenario_unanswered_prompt_fails_without_rendering() {
    let env = mailer_env();
    let err = DeployUseCase::new(env.loader_with(&[("license_key", "K-1")]), Arc::new(FakeRunner::new()))
        .deploy("mailer", &DeployOptions::default())
        .expect_err("the default prompter never answers");

    assert!(matches!(err, WadfError::RequiredInput { ref name, .. } if name == "smtp_password"));
    assert!(!env.path("srv/mailer/mail.ini").exists());
}
