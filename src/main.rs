//! wadf CLI - web application deployment framework
//!
//! Usage: wadf [OPTIONS] <COMMAND>
//!
//! Commands:
//!   deploy         Check out an application and set up its environment
//!   undeploy       Remove a deployed instance
//!   resolve        Resolve a macro or text in an application's configuration
//!   list-tags      List the tags an application can be deployed from
//!   list-deployed  List deployed instances from their vhost configs
//!   macros         Dump every resolved macro of an application

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wadf::domain::ports::{CommandRunner, DeployEventSink, InputPrompter, TracingEventSink};
use wadf::domain::value_objects::HEAD;
use wadf::{
    ConfigLoader, DeployOptions, DeployUseCase, LoaderOptions, NonInteractivePrompter,
    QueryUseCase, RevisionSpec, SystemCommandRunner, TerminalPrompter, UndeployOptions,
};

mod ui;

/// wadf - web application deployment framework
#[derive(Parser, Debug)]
#[command(name = "wadf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Machine-readable output: JSON logs and NDJSON results
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Override a macro (repeatable)
    #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_define, global = true)]
    define: Vec<(String, String)>,

    /// Master config file (default: $WADF_MASTER_CONFIG or /etc/wadf/wadf.conf)
    #[arg(long, global = true)]
    master_config: Option<PathBuf>,

    /// Never prompt; values marked %% become errors
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check out an application and set up its environment
    Deploy {
        appref: String,

        /// trunk, branch/<name>, tag/<name> or tag/LATEST
        #[arg(default_value = "trunk")]
        revision: String,

        /// Raw revision (changeset) to check out
        #[arg(short, long, default_value = HEAD)]
        raw: String,

        /// Also create, grant and load databases
        #[arg(long)]
        db: bool,
    },

    /// Remove a deployed instance
    Undeploy {
        appref: String,

        /// Also revoke, drop or empty the databases
        #[arg(long)]
        db: bool,
    },

    /// Resolve a macro name or a text containing @macros@
    Resolve { appref: String, text: String },

    /// List the tags an application can be deployed from
    ListTags { appref: String },

    /// List deployed instances from their vhost configs
    ListDeployed,

    /// Dump every resolved macro of an application
    Macros { appref: String },
}

fn parse_define(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wadf={}", level_for(verbose))));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json);

    if let Err(err) = run(cli.json, &cli) {
        ui::error::print_error(&err, cli.json);
        std::process::exit(1);
    }
}

fn loader(cli: &Cli) -> ConfigLoader {
    let mut options = LoaderOptions::from_env().with_overrides(cli.define.iter().cloned());
    if let Some(path) = &cli.master_config {
        options = options.with_master_config(path.clone());
    }
    ConfigLoader::new(options)
}

fn deploy_use_case(cli: &Cli, runner: Arc<dyn CommandRunner>) -> DeployUseCase {
    let prompter: Box<dyn InputPrompter> = if cli.non_interactive {
        Box::new(NonInteractivePrompter)
    } else {
        Box::new(TerminalPrompter::new())
    };
    let events: Arc<dyn DeployEventSink> = Arc::new(TracingEventSink);
    DeployUseCase::new(loader(cli), runner)
        .with_prompter(prompter)
        .with_event_sink(events)
}

fn run(json: bool, cli: &Cli) -> Result<()> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
    let caps = ui::terminal::detect_capabilities();

    match &cli.command {
        Commands::Deploy {
            appref,
            revision,
            raw,
            db,
        } => {
            let options = DeployOptions::new(RevisionSpec::parse(revision, raw)?)
                .with_database(*db)
                .with_verbose_hooks(cli.verbose >= 2)
                .with_cmdline_macros(cli.define.clone());
            let report = deploy_use_case(cli, runner).deploy(appref, &options)?;
            if json {
                ui::json::emit_payload("deploy", &report)?;
            } else {
                print!(
                    "{}",
                    ui::views::deploy::render_deploy_summary(
                        &report,
                        caps.supports_color,
                        caps.supports_unicode
                    )
                );
            }
        }
        Commands::Undeploy { appref, db } => {
            let options = UndeployOptions::new().with_database(*db);
            let report = deploy_use_case(cli, runner).undeploy(appref, &options)?;
            if json {
                ui::json::emit_payload("undeploy", &report)?;
            } else {
                print!(
                    "{}",
                    ui::views::deploy::render_undeploy_summary(
                        &report,
                        caps.supports_color,
                        caps.supports_unicode
                    )
                );
            }
        }
        Commands::Resolve { appref, text } => {
            let resolved = QueryUseCase::new(loader(cli), runner).resolve(appref, text)?;
            if json {
                ui::json::emit_payload("resolve", &resolved)?;
            } else {
                println!("{}", resolved.text);
                eprint!(
                    "{}",
                    ui::views::deploy::render_unresolved(
                        &resolved.unresolved,
                        caps.supports_color,
                        caps.supports_unicode
                    )
                );
            }
        }
        Commands::ListTags { appref } => {
            let tags = QueryUseCase::new(loader(cli), runner).list_tags(appref)?;
            if json {
                ui::json::emit_payload("tags", &tags)?;
            } else {
                for tag in tags {
                    println!("{}", tag);
                }
            }
        }
        Commands::ListDeployed => {
            let deployed = QueryUseCase::new(loader(cli), runner).list_deployed()?;
            if json {
                ui::json::emit_payload("deployed", &deployed)?;
            } else {
                print!(
                    "{}",
                    ui::views::query::render_deployed(&deployed, caps.supports_color)
                );
            }
        }
        Commands::Macros { appref } => {
            let macros = QueryUseCase::new(loader(cli), runner).macros(appref)?;
            if json {
                ui::json::emit_payload("macros", &macros)?;
            } else {
                print!("{}", ui::views::query::render_macros(&macros));
            }
        }
    }
    Ok(())
}
