use crate::command::{CommandFactory, Stdin};
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::error::ShellError;
use crate::fs_ops::FsEngine;
use crate::parser::ParsedCommand;
use anyhow::Context;
use colored::Colorize;
use log::{debug, trace, warn};
use rustyline::DefaultEditor;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Interactive interpreter for the built-in filesystem commands.
///
/// The interpreter owns an [`Environment`], a filesystem engine and a map from
/// keyword to [`CommandFactory`]. See [`Default`] for the commands included
/// out of the box.
///
/// Example
/// ```
/// use fs_shell::{Interpreter, MemReader};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// sh.execute_line("echo  hello world ", &mut MemReader::empty(), &mut out).unwrap();
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    fs: FsEngine,
    config: ShellConfig,
    commands: HashMap<&'static str, Rc<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    ///
    /// Each factory is registered under its name and all of its aliases.
    pub fn new(factories: Vec<Box<dyn CommandFactory>>) -> Self {
        let mut commands = HashMap::new();
        for factory in factories {
            let factory: Rc<dyn CommandFactory> = Rc::from(factory);
            for keyword in std::iter::once(factory.name()).chain(factory.aliases().iter().copied())
            {
                commands.insert(keyword, Rc::clone(&factory));
            }
        }
        Self {
            env: Environment::new(),
            fs: FsEngine::new(),
            config: ShellConfig::default(),
            commands,
        }
    }

    /// Replace the environment, e.g. to pin `HOME` in tests.
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn with_config(mut self, config: ShellConfig) -> Self {
        self.config = config;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// True once `exit` or `quit` has run.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Run a single command by keyword with its raw argument text.
    pub fn run(
        &mut self,
        keyword: &str,
        raw_args: Option<&str>,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let factory = self
            .commands
            .get(keyword)
            .ok_or_else(|| ShellError::InvalidCommand(keyword.to_string()))?;
        let cmd = factory.try_create(&self.env, raw_args)?;
        cmd.execute(stdin, stdout, &mut self.env, &self.fs)
    }

    /// Parse and run one input line. Blank lines do nothing.
    pub fn dispatch(
        &mut self,
        line: &str,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let Some(parsed) = ParsedCommand::parse(line) else {
            return Ok(());
        };
        trace!("dispatch {:?}", parsed);

        if !self.commands.contains_key(parsed.keyword) {
            return Err(ShellError::InvalidCommand(line.trim().to_string()));
        }
        self.run(parsed.keyword, parsed.raw_args, stdin, stdout)
    }

    /// Run one line and render any failure as an `ERROR:` line.
    ///
    /// Only failures to write the output itself are returned.
    pub fn execute_line(
        &mut self,
        line: &str,
        stdin: &mut dyn Stdin,
        stdout: &mut dyn Write,
    ) -> io::Result<()> {
        if let Err(err) = self.dispatch(line, stdin, stdout) {
            debug!("command failed: {}", err);
            writeln!(stdout, "{} {}", "ERROR:".red().bold(), err)?;
        }
        stdout.flush()
    }

    /// Run lines from `stdin` until `exit`/`quit` or end of input.
    pub fn run_session(&mut self, stdin: &mut dyn Stdin, stdout: &mut dyn Write) -> io::Result<()> {
        while !self.should_exit() {
            let prompt = self.prompt();
            let Some(line) = stdin.read_line(&prompt)? else {
                self.env.should_exit = true;
                break;
            };
            self.execute_line(&line, stdin, stdout)?;
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        let cwd = self
            .env
            .current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|_| "?".to_string());
        format!(
            "{} {}  $ ",
            format!("{}@{}", self.env.user_name(), self.env.host_name()).cyan(),
            cwd.green()
        )
    }

    /// Interactive Read-Eval-Print Loop on the terminal.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        colored::control::set_override(self.config.color);
        let mut rl = DefaultEditor::new().context("cannot initialize line editor")?;

        if let Some(path) = &self.config.history_file {
            if let Err(e) = rl.load_history(path) {
                debug!("no history loaded from {}: {}", path.display(), e);
            }
        }

        let mut stdout = io::stdout();
        if self.config.banner {
            writeln!(
                stdout,
                "Welcome to fs_shell!\nType \"help\" for the command list, \"exit\" or \"quit\" to leave."
            )?;
        }

        while !self.should_exit() {
            let prompt = self.prompt();
            let Some(line) = rl.read_line(&prompt)? else {
                break;
            };
            if !line.trim().is_empty() {
                rl.add_history_entry(line.as_str())?;
            }
            self.execute_line(&line, &mut rl, &mut stdout)?;
        }

        if let Some(path) = &self.config.history_file {
            if let Err(e) = rl.save_history(path) {
                warn!("cannot save history to {}: {}", path.display(), e);
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with every built-in command registered.
    fn default() -> Self {
        Self::new(crate::builtin::default_factories())
    }
}
