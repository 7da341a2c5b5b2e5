//! ExecResult: the structured result of every command execution.
//!
//! The interpreter never fails across its boundary: unknown commands, bad
//! arguments and filesystem errors all come back as an `ExecResult` whose
//! `status` is [`Status::Error`].

use serde::{Deserialize, Serialize};

/// Outcome flag of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// The result of executing a command or pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    /// Whether the command succeeded.
    pub status: Status,
    /// Output lines, in display order.
    pub lines: Vec<String>,
    /// Set by `clear`; the front end wipes its scrollback.
    #[serde(default)]
    pub clear: bool,
}

impl ExecResult {
    /// Create a successful result with several lines.
    pub fn success<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: Status::Ok,
            lines: lines.into_iter().map(Into::into).collect(),
            clear: false,
        }
    }

    /// Create a successful result with one line.
    pub fn line(line: impl Into<String>) -> Self {
        Self::success([line.into()])
    }

    /// Create a failed result with an explanatory line.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            lines: vec![message.into()],
            clear: false,
        }
    }

    /// A successful result with no output (blank input).
    pub fn empty() -> Self {
        Self::success(Vec::<String>::new())
    }

    /// The result of `clear`.
    pub fn cleared() -> Self {
        Self {
            clear: true,
            ..Self::empty()
        }
    }

    /// True if the command succeeded.
    pub fn ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// All lines joined with newlines, as stored in the command log.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl Default for ExecResult {
    fn default() -> Self {
        Self::empty()
    }
}
