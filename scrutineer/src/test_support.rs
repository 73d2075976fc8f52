//! Test-only helpers: scripted tool runners, a non-sleeping stamp source
//! and a throwaway project directory.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use crate::audit::AuditPlan;
use crate::core::stamp::Stamp;
use crate::core::template::CommandTemplate;
use crate::io::clock::StampSource;
use crate::io::fsprobe;
use crate::io::process::{ToolRunner, ToolStatus};

/// A [`ToolRunner`] driven by a closure, recording every argv it runs.
///
/// The closure stands in for the build tool's observable behavior: tests
/// have it create, rewrite or delete files before returning a status.
pub struct FakeTool<F>
where
    F: Fn(&[String]) -> Result<ToolStatus>,
{
    behavior: F,
    calls: RefCell<Vec<Vec<String>>>,
}

impl<F> FakeTool<F>
where
    F: Fn(&[String]) -> Result<ToolStatus>,
{
    pub fn new(behavior: F) -> Self {
        Self {
            behavior,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every argv this runner has executed, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }
}

impl<F> ToolRunner for FakeTool<F>
where
    F: Fn(&[String]) -> Result<ToolStatus>,
{
    fn run(&self, argv: &[String]) -> Result<ToolStatus> {
        self.calls.borrow_mut().push(argv.to_vec());
        (self.behavior)(argv)
    }
}

/// A [`StampSource`] that returns the floor's next whole second without
/// sleeping.
pub struct TickingSource;

impl StampSource for TickingSource {
    fn advance_past(&self, floor: Stamp) -> Stamp {
        Stamp::from_unix_secs(floor.unix_seconds() + 1)
    }
}

/// A throwaway directory holding a test project's files.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: tempfile::tempdir()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Create `name` with `contents`, returning its absolute path.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Absolute path of `name` as a string, for plans and argv.
    pub fn path_str(&self, name: &str) -> String {
        self.temp.path().join(name).display().to_string()
    }
}

/// Rewrite `path` (creating it if missing) so its mtime strictly
/// increases, even on filesystems with one-second mtime resolution.
pub fn touch(path: &Path) -> Result<()> {
    let old = fsprobe::mtime(path);
    let contents = fs::read(path).unwrap_or_default();
    fs::write(path, contents)?;
    if fsprobe::mtime(path) <= old {
        fsprobe::set_mtime(path, Stamp::from_unix_secs(old.unix_seconds() + 1))?;
    }
    Ok(())
}

/// An [`AuditPlan`] over the given names with stub `build {}` and `clean`
/// templates; a scripted runner decides what those commands do.
pub fn test_plan(targets: Vec<String>, candidates: Vec<String>) -> AuditPlan {
    AuditPlan {
        targets,
        candidates,
        build: CommandTemplate::parse("build {}").expect("build template"),
        clean: CommandTemplate::parse("clean").expect("clean template"),
        emit_phony: false,
    }
}
