use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use scrutineer::assess::TargetOutcome;
use scrutineer::audit::{AuditPlan, run_audit};
use scrutineer::core::report::phony_declaration;
use scrutineer::core::template::CommandTemplate;
use scrutineer::io::clock::WallClock;
use scrutineer::io::config::{CONFIG_FILE, Config, load_config};
use scrutineer::io::process::SystemRunner;
use scrutineer::{exit_codes, logging};

/// Empirically check which files a build target really depends on.
///
/// For each target, scrutineer cleans, builds, then touches each candidate
/// file in turn and rebuilds; a candidate is a dependency when touching it
/// makes the build rewrite the target. Results print as Makefile rule
/// lines.
#[derive(Debug, Parser)]
#[command(name = "scrutineer", version)]
struct Cli {
    /// Targets to assess (file paths, or recipe names for phony targets)
    #[arg(value_name = "TARGET", required = true)]
    targets: Vec<String>,

    /// Candidate dependency file; repeat for each candidate
    #[arg(short = 'd', long = "dep", value_name = "PATH", required = true)]
    deps: Vec<String>,

    /// Build command; `{}` is replaced with the target name
    #[arg(short = 'b', long = "build", value_name = "CMD")]
    build: Option<String>,

    /// Clean command
    #[arg(short = 'c', long = "clean", value_name = "CMD")]
    clean: Option<String>,

    /// Also print a `.PHONY:` line for targets that build no artifact
    #[arg(short = 'p', long = "phony")]
    phony: bool,

    /// Change to this directory before doing anything else
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    directory: Option<PathBuf>,
}

fn main() {
    logging::init();
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(exit_codes::FATAL);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.directory {
        env::set_current_dir(dir)
            .with_context(|| format!("change directory to {}", dir.display()))?;
    }

    let config = load_config(Path::new(CONFIG_FILE))?;
    let plan = resolve_plan(&cli, &config)?;

    let outcome = run_audit(&plan, &SystemRunner, &WallClock::default(), |result| {
        if let TargetOutcome::Real(report) = result {
            println!("{report}");
        }
    })?;

    if plan.emit_phony && !outcome.phony.is_empty() {
        println!("{}", phony_declaration(&outcome.phony));
    }

    Ok(())
}

/// Flags override `scrutineer.toml`, which overrides the built-in
/// defaults (`make {}` / `make clean`).
fn resolve_plan(cli: &Cli, config: &Config) -> Result<AuditPlan> {
    let build = cli.build.as_deref().unwrap_or(&config.build);
    let clean = cli.clean.as_deref().unwrap_or(&config.clean);
    Ok(AuditPlan {
        targets: cli.targets.clone(),
        candidates: cli.deps.clone(),
        build: CommandTemplate::parse(build).context("invalid build command")?,
        clean: CommandTemplate::parse(clean).context("invalid clean command")?,
        emit_phony: cli.phony || config.phony,
    })
}
