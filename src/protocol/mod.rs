//! Request parsing, command dispatch, and response rendering.

pub mod command;
pub mod wire;

pub use command::{Command, CommandExecutor};
pub use wire::{ErrorKind, Response};
