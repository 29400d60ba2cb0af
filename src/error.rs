//! Error types shared by the resolver, the filesystem engine and the dispatcher.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures produced while turning a raw token into a [`PathToken`](crate::path::PathToken).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// A required path argument was not given.
    #[error("missing path argument")]
    Missing,
    /// The token holds whitespace but is not wrapped in double quotes.
    #[error("path '{0}' contains whitespace, wrap it in double quotes")]
    UnquotedWhitespace(String),
    /// The token refers to `~` but no home directory is known.
    #[error("cannot expand '~': HOME is not set")]
    NoHome,
}

/// Failures produced while splitting the arguments of a two-path command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    /// Not exactly two tokens, or the quoting is unbalanced.
    #[error("expected exactly two paths, got '{0}'")]
    InvalidArity(String),
}

/// Outcome of a failed filesystem operation.
///
/// Every operation of [`FsEngine`](crate::fs_ops::FsEngine) reports its failure
/// through this type; nothing panics past the engine boundary.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{}: no such file or directory", .0.display())]
    NotFound(PathBuf),
    /// The path exists but a directory was expected.
    #[error("{}: not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("{}: permission denied", .0.display())]
    PermissionDenied(PathBuf),
    #[error("{}: cannot allocate {size} bytes", .path.display())]
    AllocationFailure { path: PathBuf, size: u64 },
    #[error("{}: read failed: {source}", .path.display())]
    ReadFailure { path: PathBuf, source: io::Error },
    #[error("{}: write failed: {source}", .path.display())]
    WriteFailure { path: PathBuf, source: io::Error },
    #[error("{}: cannot open: {source}", .path.display())]
    OpenFailure { path: PathBuf, source: io::Error },
    #[error("'{}' and '{}' are the same file", .source_path.display(), .target.display())]
    SameFile { source_path: PathBuf, target: PathBuf },
    #[error("{}: file does not exist", .0.display())]
    FileFailure(PathBuf),
    #[error("{}: cannot create directory: {source}", .path.display())]
    CreateDirFailure { path: PathBuf, source: io::Error },
    #[error("{}: cannot remove: {source}", .path.display())]
    RemoveFailure { path: PathBuf, source: io::Error },
    #[error("cannot move '{}' to '{}': {source}", .from.display(), .to.display())]
    RenameFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

impl FsError {
    /// Map an `open`/`read_dir` failure to `NotFound`, `NotADirectory` or `PermissionDenied`.
    pub(crate) fn from_open(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path),
            io::ErrorKind::NotADirectory => FsError::NotADirectory(path),
            _ => FsError::NotFound(path),
        }
    }
}

/// Any failure the dispatcher can render to the user.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Args(#[from] ArgError),
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error("{command}: invalid arguments '{args}'")]
    InvalidArguments { command: &'static str, args: String },
    #[error("command not found: {0}")]
    InvalidCommand(String),
    #[error("no help entry for '{0}'")]
    HelpNotFound(String),
    #[error("cd: {}: no such directory", .0.display())]
    DirNotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    pub(crate) fn invalid_args(command: &'static str, args: impl Into<String>) -> Self {
        ShellError::InvalidArguments {
            command,
            args: args.into(),
        }
    }
}
