use std::collections::HashMap;
use std::env as stdenv;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the variable that supplies the home directory for `~` expansion.
pub const HOME_VAR: &str = "HOME";

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: variables captured at startup; only `HOME` and the prompt
///   variables are consulted.
/// - `should_exit`: set by `exit`/`quit`; the interactive loop stops once it is true.
///
/// The working directory is not stored here; it is read from the OS on every use.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., HOME, USER).
    pub vars: HashMap<String, String>,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process variables into a new `Environment` instance.
    ///
    /// Variables that are not valid UTF-8 are skipped.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
            should_exit: false,
        }
    }

    /// An environment with no variables at all.
    pub fn empty() -> Self {
        Self {
            vars: HashMap::new(),
            should_exit: false,
        }
    }

    /// Get the value of a captured environment variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Home directory used for `~` expansion, if any.
    pub fn home_dir(&self) -> Option<String> {
        self.get_var(HOME_VAR).filter(|home| !home.is_empty())
    }

    /// The process working directory, read fresh on every call.
    pub fn current_dir(&self) -> io::Result<PathBuf> {
        stdenv::current_dir()
    }

    /// Change the process working directory.
    pub fn change_dir(&mut self, path: &Path) -> io::Result<()> {
        stdenv::set_current_dir(path)
    }

    /// Login name shown in the prompt.
    pub fn user_name(&self) -> String {
        self.get_var("USER")
            .or_else(|| self.get_var("USERNAME"))
            .unwrap_or_else(|| "user".to_string())
    }

    /// Host name shown in the prompt.
    pub fn host_name(&self) -> String {
        self.get_var("HOSTNAME")
            .or_else(|| {
                std::fs::read_to_string("/etc/hostname")
                    .ok()
                    .map(|s| s.trim().to_string())
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "localhost".to_string())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
