use crate::env::Environment;
use crate::error::ShellError;
use crate::fs_ops::FsEngine;
use std::io::{self, Write};

/// Source of interactive input lines.
///
/// The interactive loop reads command lines through it, and commands that need
/// an answer from the user (the `rmdir` confirmation) read from the same source.
pub trait Stdin {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `Ok(None)` once the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl.
pub trait ExecutableCommand {
    /// Executes the command, writing its output to `stdout`.
    fn execute(
        self: Box<Self>,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError>;
}

/// Factory that creates a command from the raw text following its keyword.
pub trait CommandFactory {
    /// Keyword selecting this command.
    fn name(&self) -> &'static str;

    /// Additional keywords selecting the same command.
    fn aliases(&self) -> &'static [&'static str];

    /// Parse the argument text and build a ready-to-run command.
    ///
    /// `raw_args` is `None` when the keyword was given alone.
    fn try_create(
        &self,
        env: &Environment,
        raw_args: Option<&str>,
    ) -> Result<Box<dyn ExecutableCommand>, ShellError>;
}
