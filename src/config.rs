//! Startup configuration, taken from the command line once and read-only afterwards.

use argh::FromArgs;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(FromArgs, Debug, Default)]
/// An interactive shell for navigating and editing the local filesystem.
pub struct ShellArgs {
    #[argh(switch)]
    /// do not color the prompt and error markers.
    pub no_color: bool,

    #[argh(switch, short = 'q')]
    /// skip the welcome banner.
    pub quiet: bool,

    #[argh(option)]
    /// file to load command history from and save it to on exit.
    pub history: Option<PathBuf>,

    #[argh(switch, short = 'v')]
    /// log every filesystem operation to stderr.
    pub verbose: bool,
}

/// Settings consumed by the [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub color: bool,
    pub banner: bool,
    pub history_file: Option<PathBuf>,
    /// Used when `RUST_LOG` is not set.
    pub log_level: LevelFilter,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            color: true,
            banner: true,
            history_file: None,
            log_level: LevelFilter::Warn,
        }
    }
}

impl From<ShellArgs> for ShellConfig {
    fn from(args: ShellArgs) -> Self {
        Self {
            color: !args.no_color,
            banner: !args.quiet,
            history_file: args.history,
            log_level: if args.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Warn
            },
        }
    }
}
