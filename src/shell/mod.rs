//! Local shell command execution and quoting.

pub mod command;
pub mod quote;

pub use command::{execute, execute_program, CommandOptions, CommandResult};
pub use quote::quote;
