//! Static help text for every built-in command.

/// Help text for a single command.
#[derive(Debug)]
pub struct HelpEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub summary: &'static str,
    pub usage: &'static str,
}

/// Help entries in the order `help` prints them.
pub static HELP_TABLE: &[HelpEntry] = &[
    HelpEntry {
        name: "exit",
        aliases: &["quit"],
        summary: "Leave the shell",
        usage: "Usage: exit\n\nTerminates the shell. `quit` does the same.",
    },
    HelpEntry {
        name: "help",
        aliases: &[],
        summary: "Show available commands or help for one command",
        usage: "Usage: help [command]\n\n\
                Without arguments: lists all available commands.\n\
                With a command name: shows detailed help for that command.",
    },
    HelpEntry {
        name: "echo",
        aliases: &[],
        summary: "Print text",
        usage: "Usage: echo [text]\n\n\
                Prints the text as typed. Spacing between words is kept,\n\
                surrounding whitespace is dropped.",
    },
    HelpEntry {
        name: "clear",
        aliases: &[],
        summary: "Clear the terminal",
        usage: "Usage: clear",
    },
    HelpEntry {
        name: "cd",
        aliases: &[],
        summary: "Change the working directory",
        usage: "Usage: cd <path>\n\n\
                Paths with spaces must be wrapped in double quotes.\n\
                A leading ~ stands for the home directory.",
    },
    HelpEntry {
        name: "pwd",
        aliases: &[],
        summary: "Print the working directory",
        usage: "Usage: pwd",
    },
    HelpEntry {
        name: "ls",
        aliases: &[],
        summary: "List the working directory",
        usage: "Usage: ls [-a | -l | -la]\n\n\
                -a   include entries whose name starts with '.'\n\
                -l   one entry per line with type and size\n\
                -la  both of the above",
    },
    HelpEntry {
        name: "cat",
        aliases: &[],
        summary: "Print the content of a file",
        usage: "Usage: cat <file>",
    },
    HelpEntry {
        name: "touch",
        aliases: &[],
        summary: "Create an empty file",
        usage: "Usage: touch <file>\n\nAn existing file is left as it is.",
    },
    HelpEntry {
        name: "cp",
        aliases: &[],
        summary: "Copy a file",
        usage: "Usage: cp <source> <target>\n\n\
                The target is created or overwritten.",
    },
    HelpEntry {
        name: "mkdir",
        aliases: &[],
        summary: "Create a directory and any missing parents",
        usage: "Usage: mkdir <path>\n\nExample: mkdir a/b/c",
    },
    HelpEntry {
        name: "rmdir",
        aliases: &[],
        summary: "Remove a directory and its contents",
        usage: "Usage: rmdir <directory>\n\n\
                Asks for confirmation before removing a non-empty directory.\n\
                Answer 'y' to proceed.",
    },
    HelpEntry {
        name: "rmfile",
        aliases: &[],
        summary: "Remove a file",
        usage: "Usage: rmfile <file>",
    },
    HelpEntry {
        name: "mv",
        aliases: &[],
        summary: "Move or rename a file or directory",
        usage: "Usage: mv <source> <target>\n\n\
                When the target is an existing directory the source is moved\n\
                into it. An existing target file is overwritten.",
    },
];

/// Find a help entry by name or alias.
pub fn find_entry(name: &str) -> Option<&'static HelpEntry> {
    HELP_TABLE
        .iter()
        .find(|entry| entry.name == name || entry.aliases.contains(&name))
}

/// Summary table of all commands.
pub fn render_table() -> String {
    let width = HELP_TABLE
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Available commands:\n");
    for entry in HELP_TABLE {
        out.push_str(&format!("  {:<width$}  {}\n", entry.name, entry.summary));
    }
    out.push_str("\nType 'help <command>' for details.");
    out
}

/// Detailed help for one entry.
pub fn render_entry(entry: &HelpEntry) -> String {
    let mut out = format!("Command: {}", entry.name);
    if !entry.aliases.is_empty() {
        out.push_str(&format!(" (aliases: {})", entry.aliases.join(", ")));
    }
    out.push_str(&format!("\n{}\n\n{}", entry.summary, entry.usage));
    out
}
