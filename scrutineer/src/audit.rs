//! Run-level orchestration over all targets.
//!
//! One audit cleans once, verifies every candidate survived the clean, then
//! assesses each target in order. Outcomes stream through a callback as
//! they are produced, so report lines appear while later targets are still
//! being rebuilt.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::assess::{AssessRequest, TargetOutcome, assess_target, run_clean};
use crate::core::report::DependencyReport;
use crate::core::template::CommandTemplate;
use crate::io::clock::StampSource;
use crate::io::fsprobe;
use crate::io::process::ToolRunner;

/// Everything one audit needs, resolved from flags and config.
#[derive(Debug, Clone)]
pub struct AuditPlan {
    /// Targets to assess, in order.
    pub targets: Vec<String>,
    /// Candidate dependencies, in trial order.
    pub candidates: Vec<String>,
    /// Build command; `{}` expands to the current target.
    pub build: CommandTemplate,
    /// Clean command, run verbatim.
    pub clean: CommandTemplate,
    /// Print the aggregate `.PHONY:` declaration at the end.
    pub emit_phony: bool,
}

/// Aggregate results of one audit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditOutcome {
    /// Reports for targets assessed as real, in target order.
    pub reports: Vec<DependencyReport>,
    /// Names classified phony, in target order.
    pub phony: Vec<String>,
    /// Names skipped over recoverable per-target failures.
    pub skipped: Vec<String>,
}

/// Run the audit: clean once, verify candidates, assess each target.
///
/// `on_target` fires after each target with its outcome. `Err` means the
/// run aborted, whether during setup or mid-trial.
pub fn run_audit<R, S, F>(
    plan: &AuditPlan,
    runner: &R,
    stamps: &S,
    mut on_target: F,
) -> Result<AuditOutcome>
where
    R: ToolRunner,
    S: StampSource,
    F: FnMut(&TargetOutcome),
{
    if plan.targets.is_empty() {
        bail!("no targets to assess");
    }
    if plan.candidates.is_empty() {
        bail!("no dependency candidates to test");
    }

    run_clean(runner, &plan.clean).context("initial clean")?;

    // A candidate the clean step removed (a generated file, say) cannot be
    // timestamp-tested; catch that before the first build.
    for candidate in &plan.candidates {
        if !fsprobe::exists(Path::new(candidate.as_str())) {
            bail!("dependency candidate '{candidate}' does not exist after the initial clean");
        }
    }

    let mut outcome = AuditOutcome::default();
    for target in &plan.targets {
        debug!(target = target.as_str(), "assessing");
        let result = assess_target(
            &AssessRequest {
                target,
                candidates: &plan.candidates,
                build: &plan.build,
                clean: &plan.clean,
            },
            runner,
            stamps,
        )?;
        match &result {
            TargetOutcome::Real(report) => outcome.reports.push(report.clone()),
            TargetOutcome::Phony => outcome.phony.push(target.clone()),
            TargetOutcome::Skipped { .. } => outcome.skipped.push(target.clone()),
        }
        on_target(&result);
    }

    Ok(outcome)
}
