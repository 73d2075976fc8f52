//! Per-target assessment: one pass of the touch-and-rebuild protocol.
//!
//! A target moves through an initial build, phony classification, baseline
//! stamping and the per-candidate trial loop. Failures split two ways:
//! conditions confined to this target (a broken recipe, an unstampable
//! artifact) warn and return [`TargetOutcome::Skipped`] so the audit can
//! move on, while anything that poisons the shared state later targets
//! depend on (a mid-trial build failure, a candidate that cannot be
//! stamped, a failing clean) is an error that aborts the whole run.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::report::DependencyReport;
use crate::core::stamp::Stamp;
use crate::core::template::CommandTemplate;
use crate::io::clock::StampSource;
use crate::io::fsprobe;
use crate::io::process::{ToolRunner, render_argv};

/// Inputs for one target's assessment.
#[derive(Debug, Clone)]
pub struct AssessRequest<'a> {
    /// Target path (or phony name) under assessment.
    pub target: &'a str,
    /// Candidate dependencies, in trial order.
    pub candidates: &'a [String],
    /// Build command; `{}` expands to the target.
    pub build: &'a CommandTemplate,
    /// Clean command, run verbatim.
    pub clean: &'a CommandTemplate,
}

/// What assessing one target produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The build produced an artifact; here is what it depends on.
    Real(DependencyReport),
    /// The build succeeded without producing an artifact, so mtime trials
    /// do not apply.
    Phony,
    /// A failure confined to this target; the audit continues without it.
    Skipped { reason: String },
}

/// Assess one target.
///
/// `Err` means the run as a whole can no longer be trusted and must abort.
pub fn assess_target<R: ToolRunner, S: StampSource>(
    request: &AssessRequest<'_>,
    runner: &R,
    stamps: &S,
) -> Result<TargetOutcome> {
    let target_path = Path::new(request.target);
    let build_argv = request.build.expand(request.target);

    // A failing initial build means the recipe cannot build this target at
    // all, which is a finding to report, not a reason to stop auditing the
    // other targets. The same failure inside the trial loop is fatal.
    if let Some(failure) = tool_failure(runner, &build_argv) {
        let reason = format!("broken recipe for '{}': {failure}", request.target);
        eprintln!("warning: {reason} (skipping)");
        return Ok(TargetOutcome::Skipped { reason });
    }

    if !fsprobe::exists(target_path) {
        debug!(target = request.target, "no artifact after build, phony");
        run_clean(runner, request.clean)
            .with_context(|| format!("clean after '{}'", request.target))?;
        return Ok(TargetOutcome::Phony);
    }

    // Force every candidate and the artifact onto one known stamp. A
    // candidate that has gone missing since the run-level existence check
    // is excluded from this target's trials; a candidate that exists but
    // cannot be stamped would corrupt every later comparison.
    let base = stamps.advance_past(Stamp::epoch());
    let mut stamped = Vec::with_capacity(request.candidates.len());
    for candidate in request.candidates {
        if !fsprobe::exists(Path::new(candidate.as_str())) {
            eprintln!(
                "warning: candidate '{candidate}' is missing, excluded from trials for '{}'",
                request.target
            );
            continue;
        }
        fsprobe::set_mtime(Path::new(candidate.as_str()), base)
            .with_context(|| format!("stamp candidate '{candidate}'"))?;
        stamped.push(candidate);
    }
    if let Err(error) = fsprobe::set_mtime(target_path, base) {
        let reason = format!("cannot stamp baseline for '{}': {error:#}", request.target);
        eprintln!("warning: {reason} (skipping)");
        return Ok(TargetOutcome::Skipped { reason });
    }

    let report = run_trials(request, runner, stamps, &build_argv, &stamped, base)?;

    run_clean(runner, request.clean)
        .with_context(|| format!("clean after '{}'", request.target))?;

    Ok(TargetOutcome::Real(report))
}

/// The trial loop: touch one candidate, rebuild, watch the artifact.
fn run_trials<R: ToolRunner, S: StampSource>(
    request: &AssessRequest<'_>,
    runner: &R,
    stamps: &S,
    build_argv: &[String],
    candidates: &[&String],
    base: Stamp,
) -> Result<DependencyReport> {
    let target_path = Path::new(request.target);

    // `prev` is the artifact mtime at the last detected change. A candidate
    // is credited only when the artifact moves relative to that, so a tool
    // that leaves an up-to-date artifact alone does not discredit earlier
    // detections. `floor` additionally covers the last issued stamp, which
    // keeps trial stamps strictly increasing even when a rebuild lands the
    // artifact behind the stamp that provoked it.
    let mut prev = base;
    let mut floor = base;
    let mut deps = Vec::new();

    for &candidate in candidates {
        let trial = stamps.advance_past(floor);
        floor = trial;
        fsprobe::set_mtime(Path::new(candidate.as_str()), trial)
            .with_context(|| format!("stamp candidate '{candidate}' for its trial"))?;

        if let Some(failure) = tool_failure(runner, build_argv) {
            bail!(
                "build of '{}' failed during trials after an initial success: {failure}",
                request.target
            );
        }
        if !fsprobe::exists(target_path) {
            bail!("target '{}' disappeared during trials", request.target);
        }

        let observed = fsprobe::mtime(target_path);
        if observed == prev {
            debug!(
                target = request.target,
                candidate = candidate.as_str(),
                "no rebuild"
            );
            continue;
        }
        debug!(
            target = request.target,
            candidate = candidate.as_str(),
            prev = %prev,
            observed = %observed,
            "rebuild detected"
        );
        deps.push(candidate.clone());
        prev = observed;
        if prev > floor {
            floor = prev;
        }
    }

    Ok(DependencyReport {
        target: request.target.to_string(),
        deps,
    })
}

/// Run a command, collapsing "could not start" and "exited non-zero" into
/// one failure description. `None` means it succeeded.
pub(crate) fn tool_failure<R: ToolRunner>(runner: &R, argv: &[String]) -> Option<String> {
    match runner.run(argv) {
        Ok(status) if status.success() => None,
        Ok(status) => Some(status.to_string()),
        Err(error) => Some(format!("{error:#}")),
    }
}

pub(crate) fn run_clean<R: ToolRunner>(runner: &R, clean: &CommandTemplate) -> Result<()> {
    let argv = clean.argv();
    if let Some(failure) = tool_failure(runner, argv) {
        bail!("command `{}` failed: {failure}", render_argv(argv));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::process::ToolStatus;
    use crate::test_support::{FakeTool, TestProject, TickingSource, touch};
    use std::cell::Cell;
    use std::fs;
    use std::path::PathBuf;

    fn templates() -> (CommandTemplate, CommandTemplate) {
        (
            CommandTemplate::parse("build {}").expect("build template"),
            CommandTemplate::parse("clean").expect("clean template"),
        )
    }

    fn request<'a>(
        target: &'a str,
        candidates: &'a [String],
        build: &'a CommandTemplate,
        clean: &'a CommandTemplate,
    ) -> AssessRequest<'a> {
        AssessRequest {
            target,
            candidates,
            build,
            clean,
        }
    }

    /// A build tool that rewrites `target` only when one of `sources` is
    /// newer than it, the way a correct Makefile rule behaves. Creates the
    /// target on the first build. Clean invocations do nothing.
    fn make_like(
        target: PathBuf,
        sources: Vec<PathBuf>,
    ) -> impl Fn(&[String]) -> Result<ToolStatus> {
        move |argv: &[String]| {
            if argv[0] == "build" {
                let out_of_date = !fsprobe::exists(&target)
                    || sources
                        .iter()
                        .any(|source| fsprobe::mtime(source) > fsprobe::mtime(&target));
                if out_of_date {
                    touch(&target)?;
                }
            }
            Ok(ToolStatus::Success)
        }
    }

    #[test]
    fn credits_only_the_candidate_that_triggers_rebuilds() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "int a;\n").unwrap();
        project.write("b.h", "#define B\n").unwrap();
        let out = project.root().join("out.o");
        let candidates = vec![project.path_str("a.c"), project.path_str("b.h")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let runner = FakeTool::new(make_like(out, vec![project.root().join("a.c")]));
        let outcome = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap();

        let TargetOutcome::Real(report) = outcome else {
            panic!("expected a real target");
        };
        assert_eq!(report.target, target);
        assert_eq!(report.deps, vec![project.path_str("a.c")]);
    }

    #[test]
    fn tool_that_always_rewrites_credits_every_candidate() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        project.write("b.h", "").unwrap();
        let out = project.root().join("out.o");
        let candidates = vec![project.path_str("a.c"), project.path_str("b.h")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let runner = FakeTool::new(move |argv: &[String]| {
            if argv[0] == "build" {
                touch(&out)?;
            }
            Ok(ToolStatus::Success)
        });
        let outcome = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap();

        let TargetOutcome::Real(report) = outcome else {
            panic!("expected a real target");
        };
        assert_eq!(report.deps, candidates);
    }

    /// A tool that skips up-to-date work leaves the artifact untouched for
    /// an irrelevant candidate. The next relevant one must still be
    /// detected against the last rebuild, not against that trial's stamp.
    #[test]
    fn only_detected_changes_advance_the_comparison_point() {
        let project = TestProject::new().unwrap();
        for name in ["x.c", "y.txt", "z.c"] {
            project.write(name, "").unwrap();
        }
        let out = project.root().join("out.o");
        let candidates = vec![
            project.path_str("x.c"),
            project.path_str("y.txt"),
            project.path_str("z.c"),
        ];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let sources = vec![project.root().join("x.c"), project.root().join("z.c")];
        let runner = FakeTool::new(make_like(out, sources));
        let outcome = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap();

        let TargetOutcome::Real(report) = outcome else {
            panic!("expected a real target");
        };
        assert_eq!(
            report.deps,
            vec![project.path_str("x.c"), project.path_str("z.c")]
        );
    }

    #[test]
    fn trial_stamps_strictly_increase_across_candidates() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        project.write("b.h", "").unwrap();
        let out = project.root().join("out.o");
        let candidates = vec![project.path_str("a.c"), project.path_str("b.h")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        // Builds after the first leave the artifact alone, so each
        // candidate keeps the stamp its trial assigned.
        let runner = FakeTool::new(move |argv: &[String]| {
            if argv[0] == "build" && !fsprobe::exists(&out) {
                touch(&out)?;
            }
            Ok(ToolStatus::Success)
        });
        let outcome = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap();

        let TargetOutcome::Real(report) = outcome else {
            panic!("expected a real target");
        };
        assert!(report.deps.is_empty());
        let first = fsprobe::mtime(&project.root().join("a.c"));
        let second = fsprobe::mtime(&project.root().join("b.h"));
        assert!(Stamp::epoch() < first);
        assert!(first < second);
    }

    #[test]
    fn successful_build_without_artifact_is_phony() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        let candidates = vec![project.path_str("a.c")];
        let (build, clean) = templates();
        let target = project.path_str("all");

        let runner = FakeTool::new(|_argv: &[String]| Ok(ToolStatus::Success));
        let outcome = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap();

        assert_eq!(outcome, TargetOutcome::Phony);
        // Phony targets still get the per-target clean, and no trials ran.
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], vec!["clean".to_string()]);
    }

    #[test]
    fn failing_initial_build_skips_without_cleaning() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        let candidates = vec![project.path_str("a.c")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let runner =
            FakeTool::new(|_argv: &[String]| Ok(ToolStatus::Failed { code: Some(2) }));
        let outcome = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap();

        let TargetOutcome::Skipped { reason } = outcome else {
            panic!("expected a skip");
        };
        assert!(reason.contains("broken recipe"));
        assert!(reason.contains("exit status 2"));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn missing_candidate_is_excluded_from_trials() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        let out = project.root().join("out.o");
        let candidates = vec![project.path_str("a.c"), project.path_str("gone.h")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let runner = FakeTool::new(make_like(out, vec![project.root().join("a.c")]));
        let outcome = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap();

        let TargetOutcome::Real(report) = outcome else {
            panic!("expected a real target");
        };
        assert_eq!(report.deps, vec![project.path_str("a.c")]);
        // Initial build, one trial build for a.c, clean. No trial for the
        // missing candidate.
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn build_failure_mid_trial_aborts_the_run() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        let out = project.root().join("out.o");
        let candidates = vec![project.path_str("a.c")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let builds = Cell::new(0u32);
        let runner = FakeTool::new(move |argv: &[String]| {
            if argv[0] != "build" {
                return Ok(ToolStatus::Success);
            }
            builds.set(builds.get() + 1);
            if builds.get() == 1 {
                touch(&out)?;
                Ok(ToolStatus::Success)
            } else {
                Ok(ToolStatus::Failed { code: Some(1) })
            }
        });
        let error = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap_err();
        assert!(error.to_string().contains("failed during trials"));
    }

    /// A build that deletes a candidate makes that candidate's own trial
    /// stamp unwritable, which poisons every later comparison.
    #[test]
    fn vanishing_candidate_mid_trial_aborts_the_run() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        let doomed = project.write("b.h", "").unwrap();
        let out = project.root().join("out.o");
        let candidates = vec![project.path_str("a.c"), project.path_str("b.h")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let builds = Cell::new(0u32);
        let runner = FakeTool::new(move |argv: &[String]| {
            if argv[0] == "build" {
                builds.set(builds.get() + 1);
                touch(&out)?;
                if builds.get() == 2 {
                    fs::remove_file(&doomed)?;
                }
            }
            Ok(ToolStatus::Success)
        });
        let error = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap_err();
        let rendered = format!("{error:#}");
        assert!(rendered.contains("stamp candidate"));
        assert!(rendered.contains("for its trial"));
    }

    #[test]
    fn vanishing_artifact_mid_trial_aborts_the_run() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        let out = project.root().join("out.o");
        let candidates = vec![project.path_str("a.c")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let builds = Cell::new(0u32);
        let runner = FakeTool::new(move |argv: &[String]| {
            if argv[0] == "build" {
                builds.set(builds.get() + 1);
                if builds.get() == 1 {
                    touch(&out)?;
                } else {
                    fs::remove_file(&out)?;
                }
            }
            Ok(ToolStatus::Success)
        });
        let error = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap_err();
        assert!(error.to_string().contains("disappeared during trials"));
    }

    #[test]
    fn failing_per_target_clean_aborts_the_run() {
        let project = TestProject::new().unwrap();
        project.write("a.c", "").unwrap();
        let out = project.root().join("out.o");
        let candidates = vec![project.path_str("a.c")];
        let (build, clean) = templates();
        let target = project.path_str("out.o");

        let runner = FakeTool::new(move |argv: &[String]| {
            if argv[0] == "build" {
                touch(&out)?;
                Ok(ToolStatus::Success)
            } else {
                Ok(ToolStatus::Failed { code: Some(1) })
            }
        });
        let error = assess_target(
            &request(&target, &candidates, &build, &clean),
            &runner,
            &TickingSource,
        )
        .unwrap_err();
        assert!(format!("{error:#}").contains("clean after"));
    }
}
