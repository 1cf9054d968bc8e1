// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The token cursor (spec §4.1): positional read/advance over the
//! pre-scanned token array. `save`/`restore` give the statement executor
//! (spec §4.5) the cursor rewinding it uses to implement loops and
//! skipped branches without a separate AST to walk back over.

use lumen_lexer::{Kind, Token};

use crate::error::{ErrorKind, EvalResult, ScriptError};

pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let eof_line = tokens.last().map(|t| t.line).unwrap_or(1);
        Self {
            tokens,
            pos: 0,
            eof: Token {
                kind: Kind::Eof,
                start: 0,
                end: 0,
                line: eof_line,
                number: None,
            },
        }
    }

    pub fn peek(&self) -> Token {
        self.tokens.get(self.pos).copied().unwrap_or(self.eof)
    }

    pub fn peek_kind(&self) -> Kind {
        self.peek().kind
    }

    pub fn advance(&mut self) -> Token {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub fn accept(&mut self, kind: Kind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    #[track_caller]
    pub fn expect(&mut self, kind: Kind, script_file: &str, msg: &str) -> EvalResult<Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(ScriptError::new(
                ErrorKind::Syntax,
                script_file,
                tok.line,
                format!("{:?}", tok.kind),
                format!("expected {:?}: {msg}", kind),
            ))
        }
    }

    pub fn save(&self) -> usize {
        self.pos
    }

    pub fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn past_end_yields_synthetic_eof() {
        let tokens = lumen_lexer::scan("1");
        let mut c = Cursor::new(&tokens);
        c.advance(); // Number
        assert_eq!(c.peek_kind(), Kind::Eof);
        c.advance();
        c.advance();
        assert_eq!(c.peek_kind(), Kind::Eof);
    }

    #[test]
    fn save_restore_rewinds() {
        let tokens = lumen_lexer::scan("1 2 3");
        let mut c = Cursor::new(&tokens);
        let mark = c.save();
        c.advance();
        c.advance();
        c.restore(mark);
        assert_eq!(c.peek().number, Some(1.0));
    }
}
