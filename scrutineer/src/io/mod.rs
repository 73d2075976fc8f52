//! Side-effecting collaborators.
//!
//! Process spawning, filesystem probes, the wall clock and config loading
//! live here, behind traits where the audit logic needs to be tested with
//! scripted stand-ins.

pub mod clock;
pub mod config;
pub mod fsprobe;
pub mod process;
