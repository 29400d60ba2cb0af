use crate::command::Stdin;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;
use std::io::{self, BufRead, Cursor};

/// Memory-backed line source for scripted sessions and tests.
///
/// Prompts passed to [`Stdin::read_line`] are recorded instead of printed.
pub struct MemReader {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl MemReader {
    /// A reader that is already at end of input.
    pub fn empty() -> Self {
        Self {
            lines: VecDeque::new(),
            prompts: Vec::new(),
        }
    }

    /// Create a MemReader that will hand out the provided lines in order.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Create a MemReader that splits the provided buffer into lines.
    pub fn new(buf: Vec<u8>) -> Self {
        let lines = Cursor::new(buf)
            .lines()
            .map_while(Result::ok)
            .collect::<Vec<_>>();
        Self::from_lines(lines)
    }

    /// Prompts shown so far, oldest first.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Stdin for MemReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

/// Terminal input through rustyline.
///
/// Ctrl-D ends the input. Ctrl-C yields an empty line so the caller simply
/// prompts again.
impl Stdin for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e.to_string())),
        }
    }
}
