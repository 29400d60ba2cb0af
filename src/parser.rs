//! Splitting of a command line into its keyword and argument text.

use crate::error::ArgError;
use regex::Regex;
use std::sync::LazyLock;

/// Two tokens separated by whitespace; each is either a quoted segment
/// without inner quotes or a bare run of non-whitespace, non-quote characters.
static TWO_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^("[^"]*"|[^\s"]+)\s+("[^"]*"|[^\s"]+)$"#).expect("valid two-token pattern")
});

/// A command line split into keyword and the remaining raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// First whitespace-delimited word of the trimmed line.
    pub keyword: &'a str,
    /// Everything after the keyword, trimmed. `None` when the keyword stands alone.
    pub raw_args: Option<&'a str>,
}

impl<'a> ParsedCommand<'a> {
    /// Split a line into keyword and arguments. Returns `None` for a blank line.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match line.find(char::is_whitespace) {
            Some(idx) => {
                let rest = line[idx..].trim();
                Some(Self {
                    keyword: &line[..idx],
                    raw_args: Some(rest).filter(|r| !r.is_empty()),
                })
            }
            None => Some(Self {
                keyword: line,
                raw_args: None,
            }),
        }
    }
}

/// Split the arguments of a two-path command into exactly two raw tokens.
///
/// Quoted tokens keep their quotes; the path resolver strips them.
pub fn split_two(raw_args: &str) -> Result<(&str, &str), ArgError> {
    let raw_args = raw_args.trim();
    let caps = TWO_TOKENS
        .captures(raw_args)
        .ok_or_else(|| ArgError::InvalidArity(raw_args.to_string()))?;

    match (caps.get(1), caps.get(2)) {
        (Some(first), Some(second)) => Ok((first.as_str(), second.as_str())),
        _ => Err(ArgError::InvalidArity(raw_args.to_string())),
    }
}
