// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ast::Span;

/// First fatal problem found while compiling continuity text.
///
/// Compilation stops at the first error; callers are expected to let the
/// author fix the text and compile again.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} at line {line}, column {column} ('{offending_text}')")]
pub struct CompileError {
    /// Human readable description.
    pub message: String,
    /// The verb being compiled when the error was found, or the offending
    /// token when no verb was in progress.
    pub offending_text: String,
    /// 1-based line of the offending token.
    pub line: u32,
    /// 1-based column of the offending token.
    pub column: u32,
}

impl CompileError {
    pub(crate) fn new(message: impl Into<String>, offending_text: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            offending_text: offending_text.into(),
            line: span.line,
            column: span.column,
        }
    }

    /// Position of the error as a [`Span`].
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }
}
