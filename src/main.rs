use fs_shell::Interpreter;
use fs_shell::config::{ShellArgs, ShellConfig};

fn main() -> anyhow::Result<()> {
    let config = ShellConfig::from(argh::from_env::<ShellArgs>());

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    Interpreter::default().with_config(config).repl()
}
