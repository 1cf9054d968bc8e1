// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The statement executor (spec §4.5): control flow implemented by cursor
//! save/restore rather than continuation passing. Every statement form has
//! a skimmed shadow reached automatically once `is_executing()` goes false,
//! so `statement()` itself carries the only mode-switch the dispatch needs.

use std::rc::Rc;

use lumen_lexer::Kind;

use crate::accessor::Accessor;
use crate::error::{ErrorKind, EvalResult};
use crate::interpreter::{Interpreter, Mode};
use crate::scope::SourceRange;
use crate::value::Value;

impl<'a> Interpreter<'a> {
    /// Dispatches one statement, forcing a skim if this context is not
    /// currently executing (spec §4.5: "a skim mode shadows every statement
    /// and expression form").
    pub(crate) fn statement(&mut self) -> EvalResult<()> {
        if self.is_executing() {
            self.statement_inner()
        } else {
            self.with_mode(Mode::Skim, |s| s.statement_inner())
        }
    }

    fn statement_inner(&mut self) -> EvalResult<()> {
        match self.peek_kind() {
            Kind::Semi => {
                self.advance();
                Ok(())
            }
            Kind::LBrace => self.block(),
            Kind::If => self.if_stmt(),
            Kind::While => self.while_stmt(),
            Kind::Do => self.do_while_stmt(),
            Kind::For => self.for_stmt(),
            Kind::Break => {
                self.advance();
                self.expect(Kind::Semi, "expected ';' after 'break'")?;
                self.flags.brk = true;
                Ok(())
            }
            Kind::Continue => {
                self.advance();
                self.expect(Kind::Semi, "expected ';' after 'continue'")?;
                self.flags.cont = true;
                Ok(())
            }
            Kind::Function => self.function_decl(),
            Kind::Return => self.return_stmt(),
            Kind::Delete => self.delete_stmt(),
            Kind::Let => self.let_decl(),
            _ => self.expr_stmt(),
        }
    }

    fn block(&mut self) -> EvalResult<()> {
        self.expect(Kind::LBrace, "expected '{'")?;
        let start = self.cursor.save();
        self.scopes.frame_push(SourceRange { start, end: start });
        let outcome = self.body_until_rbrace();
        self.scopes.frame_pop();
        outcome?;
        self.expect(Kind::RBrace, "expected '}'")?;
        Ok(())
    }

    fn if_stmt(&mut self) -> EvalResult<()> {
        self.expect(Kind::If, "expected 'if'")?;
        self.expect(Kind::LParen, "expected '('")?;
        let cond = self.expr()?;
        self.expect(Kind::RParen, "expected ')'")?;

        if !self.is_executing() {
            self.with_mode(Mode::Skim, |s| s.statement())?;
            if self.accept(Kind::Else) {
                self.with_mode(Mode::Skim, |s| s.statement())?;
            }
            return Ok(());
        }

        let line = self.current_line();
        let truth = cond.require_boolean(&self.file_name, line, "if condition")?;
        let then_mode = if truth { Mode::Exec } else { Mode::Skim };
        self.with_mode(then_mode, |s| s.statement())?;
        if self.accept(Kind::Else) {
            let else_mode = if truth { Mode::Skim } else { Mode::Exec };
            self.with_mode(else_mode, |s| s.statement())?;
        }
        Ok(())
    }

    fn while_stmt(&mut self) -> EvalResult<()> {
        self.expect(Kind::While, "expected 'while'")?;
        self.expect(Kind::LParen, "expected '('")?;
        let active = self.is_executing();
        let cond_pos = self.cursor.save();
        loop {
            self.cursor.restore(cond_pos);
            let cond_val = self.expr()?;
            self.expect(Kind::RParen, "expected ')'")?;

            if !active {
                self.with_mode(Mode::Skim, |s| s.statement())?;
                break;
            }
            let line = self.current_line();
            let truth = cond_val.require_boolean(&self.file_name, line, "while condition")?;
            if !truth {
                self.with_mode(Mode::Skim, |s| s.statement())?;
                break;
            }
            self.statement()?;
            self.flags.cont = false;
            if self.flags.brk || self.flags.ret {
                break;
            }
        }
        self.flags.brk = false;
        self.flags.cont = false;
        Ok(())
    }

    fn do_while_stmt(&mut self) -> EvalResult<()> {
        self.expect(Kind::Do, "expected 'do'")?;
        let active = self.is_executing();
        let body_pos = self.cursor.save();
        loop {
            self.cursor.restore(body_pos);
            if active {
                self.statement()?;
            } else {
                self.with_mode(Mode::Skim, |s| s.statement())?;
            }
            self.flags.cont = false;

            self.expect(Kind::While, "expected 'while'")?;
            self.expect(Kind::LParen, "expected '('")?;
            let cond_val = self.expr()?;
            self.expect(Kind::RParen, "expected ')'")?;
            self.expect(Kind::Semi, "expected ';' after do/while")?;

            if !active || self.flags.brk || self.flags.ret {
                break;
            }
            let line = self.current_line();
            let truth = cond_val.require_boolean(&self.file_name, line, "do/while condition")?;
            if !truth {
                break;
            }
        }
        self.flags.brk = false;
        self.flags.cont = false;
        Ok(())
    }

    fn for_stmt(&mut self) -> EvalResult<()> {
        self.expect(Kind::For, "expected 'for'")?;
        self.expect(Kind::LParen, "expected '('")?;
        let after_paren = self.cursor.save();
        self.accept(Kind::Let);
        if self.check(Kind::Ident) {
            let ident_pos = self.cursor.save();
            self.advance();
            let is_inof = matches!(self.peek_kind(), Kind::In | Kind::Of);
            self.cursor.restore(ident_pos);
            if is_inof {
                return self.for_in_of();
            }
        }
        self.cursor.restore(after_paren);
        self.for_classic()
    }

    fn for_classic(&mut self) -> EvalResult<()> {
        let active = self.is_executing();
        self.scopes.frame_push(SourceRange {
            start: self.cursor.save(),
            end: 0,
        });
        self.for_init()?;
        let cond_pos = self.cursor.save();
        loop {
            self.cursor.restore(cond_pos);
            let cond_val = if self.check(Kind::Semi) {
                Value::Boolean(true)
            } else {
                self.expr()?
            };
            self.expect(Kind::Semi, "expected ';' after for-condition")?;

            if !active {
                self.skim_for_step_and_body()?;
                break;
            }
            let line = self.current_line();
            let truth = cond_val.require_boolean(&self.file_name, line, "for condition")?;
            if !truth {
                self.skim_for_step_and_body()?;
                break;
            }

            let step_pos = self.cursor.save();
            self.with_mode(Mode::Skim, |s| s.for_step())?;
            self.expect(Kind::RParen, "expected ')'")?;
            self.statement()?;
            self.flags.cont = false;
            if self.flags.brk || self.flags.ret {
                break;
            }
            self.cursor.restore(step_pos);
            self.for_step()?;
        }
        self.flags.brk = false;
        self.flags.cont = false;
        self.scopes.frame_pop();
        Ok(())
    }

    fn for_init(&mut self) -> EvalResult<()> {
        if self.accept(Kind::Semi) {
            return Ok(());
        }
        if self.check(Kind::Let) {
            return self.let_decl();
        }
        let acc = self.postfix()?;
        self.assignment_or_update(acc)?;
        self.expect(Kind::Semi, "expected ';' after for-init")?;
        Ok(())
    }

    fn for_step(&mut self) -> EvalResult<()> {
        if self.check(Kind::RParen) {
            return Ok(());
        }
        let acc = self.postfix()?;
        self.assignment_or_update(acc)
    }

    fn skim_for_step_and_body(&mut self) -> EvalResult<()> {
        self.with_mode(Mode::Skim, |s| s.for_step())?;
        self.expect(Kind::RParen, "expected ')'")?;
        self.with_mode(Mode::Skim, |s| s.statement())?;
        Ok(())
    }

    fn for_in_of(&mut self) -> EvalResult<()> {
        let name = self.ident_name()?;
        let is_of = match self.peek_kind() {
            Kind::In => {
                self.advance();
                false
            }
            Kind::Of => {
                self.advance();
                true
            }
            other => {
                return Err(self.error(ErrorKind::Syntax, format!("{other:?}"), "expected 'in' or 'of'"));
            }
        };
        let iterable = self.expr()?;
        self.expect(Kind::RParen, "expected ')'")?;
        let active = self.is_executing();
        self.scopes.frame_push(SourceRange {
            start: self.cursor.save(),
            end: 0,
        });
        let body_pos = self.cursor.save();

        let loop_values = if active {
            self.for_in_of_values(&iterable, is_of)?
        } else {
            Vec::new()
        };

        if loop_values.is_empty() {
            self.cursor.restore(body_pos);
            self.with_mode(Mode::Skim, |s| s.statement())?;
        } else {
            for value in loop_values {
                self.cursor.restore(body_pos);
                self.scopes.declare(name.clone(), value);
                self.statement()?;
                self.flags.cont = false;
                if self.flags.brk || self.flags.ret {
                    break;
                }
            }
        }
        self.flags.brk = false;
        self.flags.cont = false;
        self.scopes.frame_pop();
        Ok(())
    }

    fn for_in_of_values(&mut self, iterable: &Value, is_of: bool) -> EvalResult<Vec<Value>> {
        match iterable {
            Value::Array(arr) => {
                let items = arr.borrow().clone();
                Ok(items
                    .into_iter()
                    .enumerate()
                    .filter(|(_, v)| !matches!(v, Value::Null))
                    .map(|(i, v)| if is_of { v } else { Value::Number(i as f64) })
                    .collect())
            }
            Value::Object(obj) => {
                let entries: Vec<(Rc<str>, Value)> =
                    obj.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                let heap = &self.heap;
                Ok(entries
                    .into_iter()
                    .filter(|(_, v)| !matches!(v, Value::Null))
                    .map(|(k, v)| if is_of { v } else { Value::String(heap.new_string(&k)) })
                    .collect())
            }
            other => Err(self.error(
                ErrorKind::Structural,
                if is_of { "ForOf" } else { "ForIn" },
                format!(
                    "for-{} requires an array or object, found {}",
                    if is_of { "of" } else { "in" },
                    other.type_name()
                ),
            )),
        }
    }

    fn function_decl(&mut self) -> EvalResult<()> {
        self.expect(Kind::Function, "expected 'function'")?;
        let name = self.ident_name()?;
        let entry = self.cursor.save();
        if self.is_executing() {
            let func = self.heap.new_function(entry);
            self.scopes.declare(name, Value::Function(func));
        }
        self.expect(Kind::LParen, "expected '('")?;
        self.with_mode(Mode::Skim, |s| s.bind_parameters())?;
        self.expect(Kind::LBrace, "expected '{'")?;
        self.with_mode(Mode::Skim, |s| s.body_until_rbrace())?;
        self.expect(Kind::RBrace, "expected '}'")?;
        Ok(())
    }

    fn return_stmt(&mut self) -> EvalResult<()> {
        self.expect(Kind::Return, "expected 'return'")?;
        let value = if self.check(Kind::Semi) {
            Value::Undefined
        } else {
            self.expr()?
        };
        self.expect(Kind::Semi, "expected ';' after 'return'")?;
        if self.is_executing() {
            self.result = value;
            self.flags.ret = true;
        }
        Ok(())
    }

    fn delete_stmt(&mut self) -> EvalResult<()> {
        self.expect(Kind::Delete, "expected 'delete'")?;
        let name = self.ident_name()?;
        self.expect(Kind::Semi, "expected ';' after 'delete'")?;
        if self.is_executing() {
            let line = self.current_line();
            self.scopes.erase(&name, &self.file_name, line)?;
        }
        Ok(())
    }

    fn let_decl(&mut self) -> EvalResult<()> {
        self.expect(Kind::Let, "expected 'let'")?;
        loop {
            let name = self.ident_name()?;
            let value = if self.accept(Kind::Assign) {
                self.expr()?
            } else {
                Value::Null
            };
            if self.is_executing() {
                self.scopes.declare(name, value);
            }
            if !self.accept(Kind::Comma) {
                break;
            }
        }
        self.expect(Kind::Semi, "expected ';' after 'let'")?;
        Ok(())
    }

    fn expr_stmt(&mut self) -> EvalResult<()> {
        let acc = self.postfix()?;
        self.assignment_or_update(acc)?;
        self.expect(Kind::Semi, "expected ';'")?;
        Ok(())
    }

    /// The tail shared by an expression statement and a classic `for`'s
    /// init/step clauses: plain assignment, a compound-assignment
    /// read-modify-write, `++`/`--`, or nothing (a bare call/expression
    /// whose value is discarded).
    fn assignment_or_update(&mut self, acc: Accessor) -> EvalResult<()> {
        match self.peek_kind() {
            Kind::Assign => {
                self.advance();
                let v = self.expr()?;
                acc.put(self, v)?;
            }
            Kind::PlusAssign | Kind::MinusAssign | Kind::StarAssign | Kind::SlashAssign | Kind::PercentAssign => {
                let op = self.advance().kind;
                let rhs = self.expr()?;
                if self.is_executing() {
                    let current = acc.get(self)?;
                    let line = self.current_line();
                    let updated = self.apply_compound(op, &current, &rhs, line)?;
                    acc.put(self, updated)?;
                }
            }
            Kind::Inc | Kind::Dec => {
                let op = self.advance().kind;
                if self.is_executing() {
                    let current = acc.get(self)?;
                    let line = self.current_line();
                    let n = current.require_number(&self.file_name, line, "'++'/'--'")?;
                    let updated = Value::Number(if op == Kind::Inc { n + 1.0 } else { n - 1.0 });
                    acc.put(self, updated)?;
                }
            }
            _ => {
                acc.get(self)?;
            }
        }
        Ok(())
    }

    fn apply_compound(&mut self, op: Kind, current: &Value, rhs: &Value, line: u32) -> EvalResult<Value> {
        match op {
            Kind::PlusAssign => match (current, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => {
                    let mut joined = String::with_capacity(a.len() + b.len());
                    joined.push_str(a);
                    joined.push_str(b);
                    Ok(Value::String(self.heap.new_string(&joined)))
                }
                _ => Err(self.error(
                    ErrorKind::Type,
                    "PlusAssign",
                    format!(
                        "'+=' requires two numbers or two strings, found {} and {}",
                        current.type_name(),
                        rhs.type_name()
                    ),
                )),
            },
            Kind::MinusAssign | Kind::StarAssign | Kind::SlashAssign | Kind::PercentAssign => {
                let a = current.require_number(&self.file_name, line, "compound assignment")?;
                let b = rhs.require_number(&self.file_name, line, "compound assignment")?;
                Ok(Value::Number(match op {
                    Kind::MinusAssign => a - b,
                    Kind::StarAssign => a * b,
                    Kind::SlashAssign => a / b,
                    Kind::PercentAssign => a % b,
                    _ => unreachable!(),
                }))
            }
            _ => unreachable!(),
        }
    }
}
