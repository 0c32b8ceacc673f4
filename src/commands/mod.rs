//! Command implementations for the mbo-installer CLI
//!
//! Commands print JSON on stdout and log on stderr. Each `run` returns whether the
//! command succeeded from the caller's point of view, which decides the exit code.

pub mod check;
pub mod handle;
pub mod module;
pub mod session;
pub mod status;
