// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The interpreter state and the shared recursion it drives (spec §3, §4.4,
//! §4.5): a unified parse-or-skim state machine where the same recursive
//! descent both executes and structurally walks the grammar, gated by
//! [`Mode`] instead of the original's mutable `exec` flag — the safe-Rust
//! shape the design notes in `spec.md` §9 recommend.

mod call;
mod expr;
mod stmt;

use std::rc::Rc;

use lumen_lexer::{Kind, Token};

use crate::accessor::Accessor;
use crate::cursor::Cursor;
use crate::error::{ErrorKind, EvalResult, ScriptError};
use crate::heap::Heap;
use crate::scope::{ScopeStack, SourceRange};
use crate::value::Value;

/// Whether the current recursive descent is producing real values and
/// effects, or merely skimming the grammar to keep the cursor aligned
/// (spec §4.5: "A skim mode shadows every statement and expression form").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Exec,
    Skim,
}

/// The three control-flow flags (spec §3): at most one is meaningful at a
/// time, and each is cleared by the enclosing construct that honors it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Flags {
    pub brk: bool,
    pub cont: bool,
    pub ret: bool,
}

impl Flags {
    pub fn any(&self) -> bool {
        self.brk || self.cont || self.ret
    }
}

pub struct Interpreter<'a> {
    pub file_name: String,
    source: &'a str,
    cursor: Cursor<'a>,
    pub scopes: ScopeStack,
    pub heap: Heap,
    pub params: Vec<Value>,
    pub result: Value,
    pub mode: Mode,
    pub flags: Flags,
}

impl<'a> Interpreter<'a> {
    pub fn new(file_name: impl Into<String>, source: &'a str, tokens: &'a [Token]) -> Self {
        let mut scopes = ScopeStack::new();
        scopes.frame_push(SourceRange {
            start: 0,
            end: tokens.len(),
        });
        Self {
            file_name: file_name.into(),
            source,
            cursor: Cursor::new(tokens),
            scopes,
            heap: Heap::new(),
            params: Vec::new(),
            result: Value::Undefined,
            mode: Mode::Exec,
            flags: Flags::default(),
        }
    }

    pub fn is_executing(&self) -> bool {
        self.mode == Mode::Exec && !self.flags.any()
    }

    pub fn current_line(&self) -> u32 {
        self.cursor.peek().line
    }

    pub fn token_text(&self, tok: Token) -> &'a str {
        lumen_lexer::text(self.source, &tok)
    }

    fn peek_kind(&self) -> Kind {
        self.cursor.peek_kind()
    }

    fn check(&self, kind: Kind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        self.cursor.advance()
    }

    fn accept(&mut self, kind: Kind) -> bool {
        self.cursor.accept(kind)
    }

    #[track_caller]
    fn expect(&mut self, kind: Kind, msg: &str) -> EvalResult<Token> {
        self.cursor.expect(kind, &self.file_name, msg)
    }

    #[track_caller]
    fn error(&self, kind: ErrorKind, token_kind: impl Into<String>, message: impl Into<String>) -> ScriptError {
        let err = ScriptError::new(kind, self.file_name.clone(), self.current_line(), token_kind, message);
        log::debug!("raising {err}");
        err
    }

    fn ident_name(&mut self) -> EvalResult<Rc<str>> {
        let tok = self.expect(Kind::Ident, "expected an identifier")?;
        Ok(Rc::from(self.token_text(tok)))
    }

    /// Runs `f` with `self.mode` temporarily set to `mode`, restoring the
    /// previous mode afterward regardless of how `f` returns. This is the
    /// mechanism behind every "skim the branch not taken" rule in spec §4.5.
    fn with_mode<T>(&mut self, mode: Mode, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        let saved = self.mode;
        self.mode = if saved == Mode::Skim { Mode::Skim } else { mode };
        if saved != self.mode {
            log::trace!("mode {saved:?} -> {:?} at token {}", self.mode, self.cursor.save());
        }
        let out = f(self);
        self.mode = saved;
        out
    }

    /// Top-level entry point: interpret the whole token array as a program.
    /// Afterward the invariants of spec §8 hold: only the global frame
    /// remains, all flags are clear, the parameter buffer is empty, and the
    /// result slot holds `undefined`.
    pub fn run(&mut self) -> EvalResult<()> {
        while !self.check(Kind::Eof) {
            self.statement()?;
        }
        self.flags = Flags::default();
        self.params.clear();
        self.result = Value::Undefined;
        Ok(())
    }

    fn accessor_to_value(&mut self, acc: Accessor) -> EvalResult<Value> {
        acc.get(self)
    }
}
