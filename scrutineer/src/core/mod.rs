//! Pure logic with no side effects.
//!
//! Everything here is deterministic and testable without touching the
//! filesystem or spawning processes: command tokenizing and templates,
//! timestamp values, report rendering.

pub mod report;
pub mod stamp;
pub mod template;
pub mod tokenizer;
