//! A small interactive shell for the local filesystem.
//!
//! The shell understands a fixed set of built-in commands (navigation, listing,
//! printing files, creating, copying, moving and deleting files and directories)
//! and runs them in-process. It never spawns external programs and has no
//! pipes, redirection or scripting.
//!
//! The main entry point is [`Interpreter`], which splits each input line into a
//! keyword and its argument text, resolves path arguments (double quotes for
//! paths with spaces, a leading `~` for the home directory) and hands them to
//! the [`FsEngine`]. Failures are rendered as `ERROR:` lines and never end the
//! session.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod fs_ops;
pub mod help;
mod interpreter;
mod io_adapters;
pub mod parser;
pub mod path;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

pub use builtin::CONFIRM_TOKEN;
pub use fs_ops::FsEngine;
pub use io_adapters::MemReader;
