//! CLI command handlers
//!
//! Each subcommand is implemented in its own module.

pub mod alias;
pub mod discover;
pub mod helpers;
pub mod sync;
pub mod tag;
pub mod watch;
