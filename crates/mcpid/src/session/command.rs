//! Decoding of `name(arg,arg,...)` request lines.

use std::str::FromStr;

use thiserror::Error;

/// A request line split into its command name and argument tokens.
///
/// Arguments are the literal comma-separated tokens between the first `(`
/// and the closing `)`. There is no quoting or escaping. Empty tokens at the
/// end of the list are dropped, except that an empty argument list yields
/// one empty token: `f()` gives `[""]`, `f(a,)` gives `["a"]` and `f(,)`
/// gives no tokens at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    name: String,
    args: Vec<String>,
}

/// Errors raised for request lines that do not follow `name(args)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    /// No `(` separates the name from the arguments.
    #[error("request line has no '(': {line:?}")]
    MissingOpenParen {
        /// Offending line, trailing whitespace removed.
        line: String,
    },
    /// The line does not end with `)`.
    #[error("request line does not end with ')': {line:?}")]
    MissingCloseParen {
        /// Offending line, trailing whitespace removed.
        line: String,
    },
}

impl CommandLine {
    /// Parses one request line. Trailing whitespace is ignored.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let trimmed = line.trim_end();
        let Some((name, rest)) = trimmed.split_once('(') else {
            return Err(CommandParseError::MissingOpenParen {
                line: trimmed.to_owned(),
            });
        };
        let Some(body) = rest.strip_suffix(')') else {
            return Err(CommandParseError::MissingCloseParen {
                line: trimmed.to_owned(),
            });
        };
        Ok(Self {
            name: name.to_owned(),
            args: split_arguments(body),
        })
    }

    /// Command name, everything before the first `(`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument tokens in the order they appeared.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl FromStr for CommandLine {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Self::parse(line)
    }
}

fn split_arguments(body: &str) -> Vec<String> {
    let mut args: Vec<String> = body.split(',').map(str::to_owned).collect();
    // A body without any comma is a single token, even when empty.
    if body.contains(',') {
        while args.last().is_some_and(String::is_empty) {
            args.pop();
        }
    }
    args
}
