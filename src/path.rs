//! Normalization of raw argument tokens into filesystem paths.

use crate::env::Environment;
use crate::error::PathError;
use std::fmt;
use std::path::Path;

/// Marker left behind by relative-prefixing a leading `~`.
const HOME_MARKER: &str = "./~";

/// A resolved filesystem path.
///
/// Quotes are stripped, the path is absolute or starts with `./`, and the
/// home marker has been expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathToken(String);

impl PathToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<Path> for PathToken {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip a matching pair of surrounding double quotes, if present.
fn unquote(token: &str) -> Option<&str> {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

/// Resolve a single raw token into a [`PathToken`].
///
/// No existence check is done here; the filesystem engine reports on the
/// target later.
pub fn resolve(token: &str, env: &Environment) -> Result<PathToken, PathError> {
    if token.is_empty() {
        return Err(PathError::Missing);
    }

    let raw = match unquote(token) {
        Some("") => return Err(PathError::Missing),
        Some(inner) => inner,
        None if token.chars().any(char::is_whitespace) => {
            return Err(PathError::UnquotedWhitespace(token.to_string()));
        }
        None => token,
    };

    let mut path = if raw.starts_with('/') || raw.starts_with("./") {
        raw.to_string()
    } else {
        format!("./{raw}")
    };

    if path.contains(HOME_MARKER) {
        let home = env.home_dir().ok_or(PathError::NoHome)?;
        path = path.replace(HOME_MARKER, &home);
    }

    Ok(PathToken(path))
}

/// Resolve an optional single-path argument, treating absence as [`PathError::Missing`].
pub fn resolve_arg(raw_args: Option<&str>, env: &Environment) -> Result<PathToken, PathError> {
    resolve(raw_args.unwrap_or_default(), env)
}
