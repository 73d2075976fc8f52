//! Empirical dependency checking for build recipes.
//!
//! scrutineer discovers what a target actually depends on by touching each
//! candidate file in turn and watching whether the build tool rewrites the
//! target, then prints the findings as Makefile rule lines. The crate
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (tokenizing, command
//!   templates, timestamp values, report rendering). No I/O.
//! - **[`io`]**: Side-effecting collaborators (process spawning, mtime
//!   probes, the wall clock, config loading), behind traits where tests
//!   need to script them.
//!
//! The orchestration modules [`assess`] (one target) and [`audit`] (the
//! whole run) combine the two to implement the touch-and-rebuild protocol.

pub mod assess;
pub mod audit;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
