//! Tokenized shell commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CodexError;

/// A shell command split into tokens. Never empty; the first token is the
/// executable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Command {
    tokens: Vec<String>,
}

impl Command {
    /// Build a command from pre-split tokens.
    pub fn new<I, S>(tokens: I) -> Result<Self, CodexError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(CodexError::InvalidArgument(
                "command must have at least one token".into(),
            ));
        }
        Ok(Self { tokens })
    }

    /// Split a command line on whitespace. Returns `None` for a blank line.
    ///
    /// No quoting rules apply: `echo "a b"` yields three tokens.
    pub fn from_whitespace(line: &str) -> Option<Self> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// The executable name.
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Token at `index`, counting the program as 0.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

impl TryFrom<Vec<String>> for Command {
    type Error = CodexError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(tokens)
    }
}

impl From<Command> for Vec<String> {
    fn from(command: Command) -> Self {
        command.tokens
    }
}
