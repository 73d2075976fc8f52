//! Rendering audit results as Makefile rule lines.

use std::fmt;

/// One target's discovered dependencies, in trial order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReport {
    pub target: String,
    pub deps: Vec<String>,
}

impl fmt::Display for DependencyReport {
    /// `target: dep1 dep2`, or a bare `target:` when nothing was detected.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.target)?;
        for dep in &self.deps {
            write!(f, " {dep}")?;
        }
        Ok(())
    }
}

/// Render the aggregate `.PHONY:` declaration for the given names.
pub fn phony_declaration(names: &[String]) -> String {
    let mut line = String::from(".PHONY:");
    for name in names {
        line.push(' ');
        line.push_str(name);
    }
    line
}
