// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error reporting (spec §7). All errors are terminal: there is no
//! script-level exception handler, so every parse/evaluate entry point in
//! this crate returns `Result<_, ScriptError>` and propagates with `?`
//! rather than unwinding, mirroring the design note in `spec.md` §9 that a
//! safe reimplementation should thread a result type through every entry
//! point instead of the original's `longjmp`-style unwind.

use std::fmt;
use std::panic::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Type,
    Reference,
    Range,
    Structural,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Type => "type",
            ErrorKind::Reference => "reference",
            ErrorKind::Range => "range",
            ErrorKind::Structural => "structural",
        };
        write!(f, "{s}")
    }
}

/// The single diagnostic datum the core ever produces (spec §6): which kind
/// of failure, the script file being interpreted, where in *that* script the
/// failing token sits, where in the interpreter's own source the error was
/// raised from (captured automatically via `#[track_caller]` rather than
/// threaded by hand through every call site), and a message.
#[derive(Debug, Clone)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub script_file: String,
    pub raised_from_file: &'static str,
    pub raised_from_line: u32,
    pub current_token_line: u32,
    pub current_token_kind: String,
    pub message: String,
}

impl ScriptError {
    #[track_caller]
    pub fn new(
        kind: ErrorKind,
        script_file: impl Into<String>,
        current_token_line: u32,
        current_token_kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let caller = Location::caller();
        Self {
            kind,
            script_file: script_file.into(),
            raised_from_file: caller.file(),
            raised_from_line: caller.line(),
            current_token_line,
            current_token_kind: current_token_kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error: {} ({}:{}, found {}) [{}:{}]",
            self.kind,
            self.message,
            self.script_file,
            self.current_token_line,
            self.current_token_kind,
            self.raised_from_file,
            self.raised_from_line,
        )
    }
}

impl std::error::Error for ScriptError {}

pub type EvalResult<T> = Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_a_single_line() {
        let err = ScriptError::new(
            ErrorKind::Reference,
            "main.lum",
            3,
            "Ident",
            "undefined variable 'x'",
        );
        let rendered = err.to_string();
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.contains("reference"));
        assert!(rendered.contains("undefined variable 'x'"));
        assert!(rendered.contains("main.lum"));
    }
}
