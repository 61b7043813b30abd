//! `docforge-cli`
//!
//! **Responsibility:** the `docforge` command-line front end over
//! `docforge-jobs`.
//!
//! Exit codes: `0` success, `1` fatal error, `2` job still running when we
//! stopped watching (timeout or Ctrl-C).

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::{EXIT_INCOMPLETE, RunStatus, run};
