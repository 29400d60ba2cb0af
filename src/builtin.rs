use crate::command::{CommandFactory, ExecutableCommand, Stdin};
use crate::env::Environment;
use crate::error::ShellError;
use crate::fs_ops::{DirectoryEntry, FsEngine};
use crate::help;
use crate::interpreter::Factory;
use crate::parser::split_two;
use crate::path::{self, PathToken};
use log::debug;
use std::io::Write;
use std::path::Path;

/// Escape sequence that wipes the screen and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

/// The only answer that lets `rmdir` remove a non-empty directory.
pub const CONFIRM_TOKEN: &str = "y";

/// Built-in commands known to the shell at compile time.
///
/// Each builtin parses the raw text after its keyword itself, so that the
/// quoting rules of the path resolver apply, and runs in-process.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Other keywords that select this command.
    fn aliases() -> &'static [&'static str] {
        &[]
    }

    /// Build the command from the text following the keyword.
    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError>;

    /// Executes the command using provided IO streams and environment.
    fn execute(
        self,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        <T as BuiltinCommand>::execute(*self, stdin, stdout, env, fs)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn aliases(&self) -> &'static [&'static str] {
        T::aliases()
    }

    fn try_create(
        &self,
        env: &Environment,
        raw_args: Option<&str>,
    ) -> Result<Box<dyn ExecutableCommand>, ShellError> {
        debug!("parsing {} {:?}", T::name(), raw_args);
        Ok(Box::new(T::parse(raw_args, env)?))
    }
}

fn expect_no_args(command: &'static str, raw_args: Option<&str>) -> Result<(), ShellError> {
    match raw_args {
        None => Ok(()),
        Some(args) => Err(ShellError::invalid_args(command, args)),
    }
}

fn resolve_two(
    raw_args: Option<&str>,
    env: &Environment,
) -> Result<(PathToken, PathToken), ShellError> {
    let raw_args = raw_args.unwrap_or_default();
    let (first, second) = split_two(raw_args)?;
    Ok((path::resolve(first, env)?, path::resolve(second, env)?))
}

/// Leave the shell.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn aliases() -> &'static [&'static str] {
        &["quit"]
    }

    fn parse(raw_args: Option<&str>, _env: &Environment) -> Result<Self, ShellError> {
        expect_no_args(Self::name(), raw_args)?;
        Ok(Exit)
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        _stdout: &mut dyn Write,
        env: &mut Environment,
        _fs: &FsEngine,
    ) -> Result<(), ShellError> {
        env.should_exit = true;
        Ok(())
    }
}

/// Print the command table or the usage of one command.
pub struct Help {
    pub topic: Option<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn parse(raw_args: Option<&str>, _env: &Environment) -> Result<Self, ShellError> {
        match raw_args {
            None => Ok(Help { topic: None }),
            Some(topic) if !topic.contains(char::is_whitespace) => Ok(Help {
                topic: Some(topic.to_string()),
            }),
            Some(args) => Err(ShellError::invalid_args(Self::name(), args)),
        }
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        _fs: &FsEngine,
    ) -> Result<(), ShellError> {
        match self.topic {
            None => writeln!(stdout, "{}", help::render_table())?,
            Some(topic) => {
                let entry = help::find_entry(&topic).ok_or(ShellError::HelpNotFound(topic))?;
                writeln!(stdout, "{}", help::render_entry(entry))?;
            }
        }
        Ok(())
    }
}

/// Print the argument text verbatim.
pub struct Echo {
    pub text: String,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn parse(raw_args: Option<&str>, _env: &Environment) -> Result<Self, ShellError> {
        Ok(Echo {
            text: raw_args.unwrap_or_default().to_string(),
        })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        _fs: &FsEngine,
    ) -> Result<(), ShellError> {
        writeln!(stdout, "{}", self.text)?;
        Ok(())
    }
}

/// Wipe the terminal.
pub struct Clear;

impl BuiltinCommand for Clear {
    fn name() -> &'static str {
        "clear"
    }

    fn parse(raw_args: Option<&str>, _env: &Environment) -> Result<Self, ShellError> {
        expect_no_args(Self::name(), raw_args)?;
        Ok(Clear)
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        _fs: &FsEngine,
    ) -> Result<(), ShellError> {
        write!(stdout, "{CLEAR_SCREEN}")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Change the current working directory.
pub struct Cd {
    pub target: PathToken,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError> {
        Ok(Cd {
            target: path::resolve_arg(raw_args, env)?,
        })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        _stdout: &mut dyn Write,
        env: &mut Environment,
        _fs: &FsEngine,
    ) -> Result<(), ShellError> {
        env.change_dir(self.target.as_path()).map_err(|e| {
            debug!("cd {}: {}", self.target, e);
            ShellError::DirNotFound(self.target.as_path().to_path_buf())
        })
    }
}

/// Print the current working directory to standard output.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn parse(raw_args: Option<&str>, _env: &Environment) -> Result<Self, ShellError> {
        expect_no_args(Self::name(), raw_args)?;
        Ok(Pwd)
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        env: &mut Environment,
        _fs: &FsEngine,
    ) -> Result<(), ShellError> {
        writeln!(stdout, "{}", env.current_dir()?.display())?;
        Ok(())
    }
}

/// List the current directory.
pub struct Ls {
    pub all: bool,
    pub long: bool,
}

impl Ls {
    fn render(&self, entries: &[DirectoryEntry]) -> String {
        if self.long {
            entries
                .iter()
                .map(|e| {
                    let kind = if e.is_dir { 'd' } else { '-' };
                    format!("{kind} {:>10} {}", e.len, e.name)
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            entries
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join("  ")
        }
    }
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn parse(raw_args: Option<&str>, _env: &Environment) -> Result<Self, ShellError> {
        let (all, long) = match raw_args {
            None => (false, false),
            Some("-a") => (true, false),
            Some("-l") => (false, true),
            Some("-la") => (true, true),
            Some(other) => return Err(ShellError::invalid_args(Self::name(), other)),
        };
        Ok(Ls { all, long })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        let entries = fs.list(Path::new("."), self.all)?;
        if !entries.is_empty() {
            writeln!(stdout, "{}", self.render(&entries))?;
        }
        Ok(())
    }
}

/// Print a file.
pub struct Cat {
    pub path: PathToken,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError> {
        Ok(Cat {
            path: path::resolve_arg(raw_args, env)?,
        })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        let content = fs.read_all(self.path.as_path())?;
        stdout.write_all(&content)?;
        writeln!(stdout)?;
        Ok(())
    }
}

/// Create an empty file.
pub struct Touch {
    pub path: PathToken,
}

impl BuiltinCommand for Touch {
    fn name() -> &'static str {
        "touch"
    }

    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError> {
        Ok(Touch {
            path: path::resolve_arg(raw_args, env)?,
        })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        _stdout: &mut dyn Write,
        _env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        Ok(fs.create_empty(self.path.as_path())?)
    }
}

/// Copy a file.
pub struct Cp {
    pub source: PathToken,
    pub target: PathToken,
}

impl BuiltinCommand for Cp {
    fn name() -> &'static str {
        "cp"
    }

    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError> {
        let (source, target) = resolve_two(raw_args, env)?;
        Ok(Cp { source, target })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        _stdout: &mut dyn Write,
        _env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        Ok(fs.copy(self.source.as_path(), self.target.as_path())?)
    }
}

/// Create a directory with all its missing parents.
pub struct Mkdir {
    pub path: PathToken,
}

impl BuiltinCommand for Mkdir {
    fn name() -> &'static str {
        "mkdir"
    }

    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError> {
        Ok(Mkdir {
            path: path::resolve_arg(raw_args, env)?,
        })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        _stdout: &mut dyn Write,
        _env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        Ok(fs.create_dir_tree(self.path.as_path())?)
    }
}

/// Remove a directory, asking first when it is not empty.
pub struct Rmdir {
    pub path: PathToken,
}

impl BuiltinCommand for Rmdir {
    fn name() -> &'static str {
        "rmdir"
    }

    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError> {
        Ok(Rmdir {
            path: path::resolve_arg(raw_args, env)?,
        })
    }

    fn execute(
        self,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        let dir = self.path.as_path();
        if !fs.is_empty_dir(dir)? {
            let question = format!(
                "rmdir: '{}' is not empty, remove it and all of its contents? [y/N] ",
                self.path
            );
            let answer = stdin.read_line(&question)?;
            if answer.as_deref().map(str::trim) != Some(CONFIRM_TOKEN) {
                writeln!(stdout, "rmdir: cancelled, '{}' was not removed", self.path)?;
                return Ok(());
            }
        }
        Ok(fs.remove_dir_recursive(dir)?)
    }
}

/// Remove a file.
pub struct Rmfile {
    pub path: PathToken,
}

impl BuiltinCommand for Rmfile {
    fn name() -> &'static str {
        "rmfile"
    }

    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError> {
        Ok(Rmfile {
            path: path::resolve_arg(raw_args, env)?,
        })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        _stdout: &mut dyn Write,
        _env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        Ok(fs.remove_file(self.path.as_path())?)
    }
}

/// Move or rename a file or directory.
pub struct Mv {
    pub source: PathToken,
    pub target: PathToken,
}

impl BuiltinCommand for Mv {
    fn name() -> &'static str {
        "mv"
    }

    fn parse(raw_args: Option<&str>, env: &Environment) -> Result<Self, ShellError> {
        let (source, target) = resolve_two(raw_args, env)?;
        Ok(Mv { source, target })
    }

    fn execute(
        self,
        _stdin: &mut dyn Stdin,
        _stdout: &mut dyn Write,
        _env: &mut Environment,
        fs: &FsEngine,
    ) -> Result<(), ShellError> {
        Ok(fs.move_path(self.source.as_path(), self.target.as_path())?)
    }
}

/// Factories for every builtin, in registration order.
pub(crate) fn default_factories() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<Echo>::default()),
        Box::new(Factory::<Clear>::default()),
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Pwd>::default()),
        Box::new(Factory::<Ls>::default()),
        Box::new(Factory::<Cat>::default()),
        Box::new(Factory::<Touch>::default()),
        Box::new(Factory::<Cp>::default()),
        Box::new(Factory::<Mkdir>::default()),
        Box::new(Factory::<Rmdir>::default()),
        Box::new(Factory::<Rmfile>::default()),
        Box::new(Factory::<Mv>::default()),
    ]
}
