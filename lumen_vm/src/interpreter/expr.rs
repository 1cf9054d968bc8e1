// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The expression evaluator (spec §4.4): a precedence-climbing recursive
//! descent, lowest binding first — ternary, logical, relational, additive,
//! multiplicative, prefix, postfix access/call chain, primaries. Each level
//! is a plain method that calls the next-tighter level for its operands,
//! the standard shape used by `nova_parser::parser`'s expression methods.

use std::rc::Rc;

use lumen_lexer::Kind;

use crate::accessor::Accessor;
use crate::error::{ErrorKind, EvalResult};
use crate::interpreter::{Interpreter, Mode};
use crate::value::Value;

impl<'a> Interpreter<'a> {
    pub(crate) fn expr(&mut self) -> EvalResult<Value> {
        self.ternary()
    }

    fn ternary(&mut self) -> EvalResult<Value> {
        let cond = self.logical()?;
        if !self.accept(Kind::Question) {
            return Ok(cond);
        }
        if !self.is_executing() {
            self.with_mode(Mode::Skim, |s| s.expr())?;
            self.expect(Kind::Colon, "expected ':' in ternary")?;
            self.with_mode(Mode::Skim, |s| s.expr())?;
            return Ok(Value::Undefined);
        }
        let line = self.current_line();
        let truth = cond.require_boolean(&self.file_name, line, "ternary condition")?;
        let then_mode = if truth { Mode::Exec } else { Mode::Skim };
        let then_val = self.with_mode(then_mode, |s| s.expr())?;
        self.expect(Kind::Colon, "expected ':' in ternary")?;
        let else_mode = if truth { Mode::Skim } else { Mode::Exec };
        let else_val = self.with_mode(else_mode, |s| s.expr())?;
        Ok(if truth { then_val } else { else_val })
    }

    fn logical(&mut self) -> EvalResult<Value> {
        let mut left = self.relational()?;
        loop {
            let (op, line) = match self.peek_kind() {
                k @ (Kind::AndAnd | Kind::OrOr) => (k, self.current_line()),
                _ => break,
            };
            self.advance();
            let right = self.relational()?;
            if !self.is_executing() {
                left = Value::Undefined;
                continue;
            }
            let a = left.require_boolean(&self.file_name, line, "'&&'/'||'")?;
            let b = right.require_boolean(&self.file_name, line, "'&&'/'||'")?;
            left = Value::Boolean(match op {
                Kind::AndAnd => a && b,
                Kind::OrOr => a || b,
                _ => unreachable!(),
            });
        }
        Ok(left)
    }

    fn relational(&mut self) -> EvalResult<Value> {
        let mut left = self.additive()?;
        loop {
            let (op, line) = match self.peek_kind() {
                k @ (Kind::Eq | Kind::Ne | Kind::Lt | Kind::Le | Kind::Gt | Kind::Ge) => {
                    (k, self.current_line())
                }
                _ => break,
            };
            // Ordering operators check the left operand's type before the
            // right is even parsed, so a bad left type never evaluates the
            // right-hand expression. `==`/`!=` compare across any types and
            // never throw here.
            if self.is_executing()
                && matches!(op, Kind::Lt | Kind::Le | Kind::Gt | Kind::Ge)
                && !matches!(left, Value::Number(_) | Value::String(_))
            {
                return Err(self.error(
                    ErrorKind::Type,
                    format!("{op:?}"),
                    format!(
                        "ordering requires two numbers or two strings, found {} on the left",
                        left.type_name()
                    ),
                ));
            }
            self.advance();
            let right = self.additive()?;
            if !self.is_executing() {
                left = Value::Undefined;
                continue;
            }
            left = match op {
                Kind::Eq => Value::Boolean(left.loose_eq(&right)),
                Kind::Ne => Value::Boolean(!left.loose_eq(&right)),
                _ => {
                    let result = match (&left, &right) {
                        (Value::Number(a), Value::Number(b)) => match op {
                            Kind::Lt => a < b,
                            Kind::Le => a <= b,
                            Kind::Gt => a > b,
                            Kind::Ge => a >= b,
                            _ => unreachable!(),
                        },
                        (Value::String(a), Value::String(b)) => {
                            use std::cmp::Ordering;
                            let ord = a.as_bytes().cmp(b.as_bytes());
                            match op {
                                Kind::Lt => ord == Ordering::Less,
                                Kind::Le => ord != Ordering::Greater,
                                Kind::Gt => ord == Ordering::Greater,
                                Kind::Ge => ord != Ordering::Less,
                                _ => unreachable!(),
                            }
                        }
                        _ => {
                            return Err(self.error(
                                ErrorKind::Type,
                                format!("{op:?}"),
                                format!(
                                    "ordering requires two operands of the same type, found {} and {}",
                                    left.type_name(),
                                    right.type_name()
                                ),
                            ));
                        }
                    };
                    Value::Boolean(result)
                }
            };
        }
        Ok(left)
    }

    fn additive(&mut self) -> EvalResult<Value> {
        let mut left = self.multiplicative()?;
        loop {
            let (op, line) = match self.peek_kind() {
                k @ (Kind::Plus | Kind::Minus) => (k, self.current_line()),
                _ => break,
            };
            // Left operand's type is checked before the operator is even
            // consumed, so the right-hand expression is never evaluated when
            // the left type is wrong.
            if self.is_executing() {
                match op {
                    Kind::Plus => {
                        if !matches!(left, Value::Number(_) | Value::String(_)) {
                            return Err(self.error(
                                ErrorKind::Type,
                                "Plus",
                                format!("'+' requires two numbers or two strings, found {} on the left", left.type_name()),
                            ));
                        }
                    }
                    Kind::Minus => {
                        left.require_number(&self.file_name, line, "'-'")?;
                    }
                    _ => unreachable!(),
                }
            }
            self.advance();
            let right = self.multiplicative()?;
            if !self.is_executing() {
                left = Value::Undefined;
                continue;
            }
            left = match op {
                Kind::Plus => match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
                    (Value::String(a), Value::String(b)) => {
                        let mut joined = String::with_capacity(a.len() + b.len());
                        joined.push_str(a);
                        joined.push_str(b);
                        Value::String(self.heap.new_string(&joined))
                    }
                    _ => {
                        return Err(self.error(
                            ErrorKind::Type,
                            "Plus",
                            format!(
                                "'+' requires both operands be the same type, found {} and {}",
                                left.type_name(),
                                right.type_name()
                            ),
                        ));
                    }
                },
                Kind::Minus => {
                    let a = left.require_number(&self.file_name, line, "'-'")?;
                    let b = right.require_number(&self.file_name, line, "'-'")?;
                    Value::Number(a - b)
                }
                _ => unreachable!(),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> EvalResult<Value> {
        let mut left = self.unary()?;
        loop {
            let (op, line) = match self.peek_kind() {
                k @ (Kind::Star | Kind::Slash | Kind::Percent) => (k, self.current_line()),
                _ => break,
            };
            if self.is_executing() {
                left.require_number(&self.file_name, line, "arithmetic")?;
            }
            self.advance();
            let right = self.unary()?;
            if !self.is_executing() {
                left = Value::Undefined;
                continue;
            }
            let a = left.require_number(&self.file_name, line, "arithmetic")?;
            let b = right.require_number(&self.file_name, line, "arithmetic")?;
            left = Value::Number(match op {
                Kind::Star => a * b,
                Kind::Slash => a / b,
                Kind::Percent => a % b,
                _ => unreachable!(),
            });
        }
        Ok(left)
    }

    fn unary(&mut self) -> EvalResult<Value> {
        match self.peek_kind() {
            Kind::TypeOf => {
                self.advance();
                // Applied after the operand's access/call chain resolves, so
                // `typeof undefined_var` still fails the identifier lookup.
                let v = self.unary()?;
                if !self.is_executing() {
                    return Ok(Value::Undefined);
                }
                Ok(Value::String(self.heap.new_string(v.type_name())))
            }
            Kind::Not => {
                self.advance();
                let v = self.unary()?;
                if !self.is_executing() {
                    return Ok(Value::Undefined);
                }
                let line = self.current_line();
                let b = v.require_boolean(&self.file_name, line, "'!'")?;
                Ok(Value::Boolean(!b))
            }
            Kind::Plus => {
                self.advance();
                let v = self.unary()?;
                if !self.is_executing() {
                    return Ok(Value::Undefined);
                }
                let line = self.current_line();
                Ok(Value::Number(v.require_number(&self.file_name, line, "unary '+'")?))
            }
            Kind::Minus => {
                self.advance();
                let v = self.unary()?;
                if !self.is_executing() {
                    return Ok(Value::Undefined);
                }
                let line = self.current_line();
                Ok(Value::Number(-v.require_number(&self.file_name, line, "unary '-'")?))
            }
            _ => {
                let acc = self.postfix()?;
                acc.get(self)
            }
        }
    }

    /// Parses a primary expression followed by any chain of `[expr]`,
    /// `.ident`, `?.ident`, and `(args)` (spec §4.3). Each step reifies the
    /// accessor built so far via `get`, then reshapes it into the next.
    pub(crate) fn postfix(&mut self) -> EvalResult<Accessor> {
        let mut acc = self.primary()?;
        loop {
            match self.peek_kind() {
                Kind::LBracket => {
                    self.advance();
                    let key = self.expr()?;
                    self.expect(Kind::RBracket, "expected ']'")?;
                    acc = self.index_into(acc, key)?;
                }
                Kind::Dot => {
                    self.advance();
                    let name = self.ident_name()?;
                    acc = self.key_into(acc, name)?;
                }
                Kind::QuestionDot => {
                    self.advance();
                    let name = self.ident_name()?;
                    acc = self.optional_key_into(acc, name)?;
                }
                Kind::LParen => {
                    acc = Accessor::Value(self.call(acc)?);
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn index_into(&mut self, acc: Accessor, key: Value) -> EvalResult<Accessor> {
        let base = acc.get(self)?;
        if !self.is_executing() {
            return Ok(Accessor::Value(Value::Undefined));
        }
        match (&base, &key) {
            (Value::Array(arr), Value::Number(n)) => {
                if *n < 0.0 || n.fract() != 0.0 {
                    return Err(self.error(
                        ErrorKind::Range,
                        "Index",
                        format!("array index must be a non-negative integer, found {n}"),
                    ));
                }
                Ok(Accessor::Index(arr.clone(), *n as usize))
            }
            (Value::Object(obj), Value::String(s)) => Ok(Accessor::Key(obj.clone(), Rc::clone(s))),
            _ => {
                Err(self.error(
                    ErrorKind::Structural,
                    "Index",
                    format!(
                        "cannot index a {} with a {}",
                        base.type_name(),
                        key.type_name()
                    ),
                ))
            }
        }
    }

    fn key_into(&mut self, acc: Accessor, name: Rc<str>) -> EvalResult<Accessor> {
        let base = acc.get(self)?;
        if !self.is_executing() {
            return Ok(Accessor::Value(Value::Undefined));
        }
        match &base {
            Value::Object(obj) => Ok(Accessor::Key(obj.clone(), name)),
            _ => Err(self.error(
                ErrorKind::Structural,
                "Dot",
                format!("cannot access member '{name}' of a {}", base.type_name()),
            )),
        }
    }

    fn optional_key_into(&mut self, acc: Accessor, name: Rc<str>) -> EvalResult<Accessor> {
        let base = acc.get(self)?;
        if !self.is_executing() {
            return Ok(Accessor::Value(Value::Undefined));
        }
        match &base {
            Value::Object(obj) => Ok(Accessor::OptionalKey(Some(obj.clone()), name)),
            _ => Ok(Accessor::OptionalKey(None, name)),
        }
    }

    fn primary(&mut self) -> EvalResult<Accessor> {
        match self.peek_kind() {
            Kind::Null => {
                self.advance();
                Ok(Accessor::Value(Value::Null))
            }
            Kind::True => {
                self.advance();
                Ok(Accessor::Value(Value::Boolean(true)))
            }
            Kind::False => {
                self.advance();
                Ok(Accessor::Value(Value::Boolean(false)))
            }
            Kind::Number => {
                let tok = self.advance();
                Ok(Accessor::Value(Value::Number(tok.number.unwrap_or(0.0))))
            }
            Kind::Str => {
                let tok = self.advance();
                let text = self.token_text(tok);
                Ok(Accessor::Value(Value::String(self.heap.new_string(text))))
            }
            Kind::Ident => {
                let name = self.ident_name()?;
                Ok(Accessor::Name(name))
            }
            Kind::LParen => {
                self.advance();
                let v = self.expr()?;
                self.expect(Kind::RParen, "expected ')'")?;
                Ok(Accessor::Value(v))
            }
            Kind::LBracket => self.array_literal(),
            Kind::LBrace => self.object_literal(),
            Kind::Function => self.function_literal(),
            other => Err(self.error(
                ErrorKind::Syntax,
                format!("{other:?}"),
                "expected an expression",
            )),
        }
    }

    fn array_literal(&mut self) -> EvalResult<Accessor> {
        self.expect(Kind::LBracket, "expected '['")?;
        let mut elements = Vec::new();
        while !self.check(Kind::RBracket) {
            if self.accept(Kind::Spread) {
                let spread = self.expr()?;
                if self.is_executing() {
                    let arr = spread.as_array().ok_or_else(|| {
                        self.error(
                            ErrorKind::Range,
                            "Spread",
                            format!("'...' in an array literal requires an array, found {}", spread.type_name()),
                        )
                    })?;
                    elements.extend(arr.borrow().iter().cloned());
                }
            } else {
                let v = self.expr()?;
                if self.is_executing() {
                    elements.push(v);
                }
            }
            if !self.accept(Kind::Comma) {
                break;
            }
            if self.check(Kind::RBracket) {
                return Err(self.error(ErrorKind::Syntax, "Comma", "trailing comma is not permitted in an array literal"));
            }
        }
        self.expect(Kind::RBracket, "expected ']'")?;
        Ok(Accessor::Value(Value::Array(self.heap.new_array(elements))))
    }

    fn object_literal(&mut self) -> EvalResult<Accessor> {
        self.expect(Kind::LBrace, "expected '{'")?;
        let obj = self.heap.new_object();
        while !self.check(Kind::RBrace) {
            let key: Rc<str> = match self.peek_kind() {
                Kind::Str => {
                    let tok = self.advance();
                    Rc::from(self.token_text(tok))
                }
                Kind::Ident => self.ident_name()?,
                other => {
                    return Err(self.error(
                        ErrorKind::Syntax,
                        format!("{other:?}"),
                        "expected an object key",
                    ));
                }
            };
            self.expect(Kind::Colon, "expected ':' after object key")?;
            let v = self.expr()?;
            if self.is_executing() {
                obj.borrow_mut().insert(key, v);
            }
            if !self.accept(Kind::Comma) {
                break;
            }
            if self.check(Kind::RBrace) {
                return Err(self.error(ErrorKind::Syntax, "Comma", "trailing comma is not permitted in an object literal"));
            }
        }
        self.expect(Kind::RBrace, "expected '}'")?;
        Ok(Accessor::Value(Value::Object(obj)))
    }

    /// `function(params){body}` as an expression. The entry token index is
    /// the `(` that opens the parameter list, matching the function
    /// declaration statement's convention (spec §4.5) so both paths hand the
    /// call mechanism the same kind of handle.
    pub(crate) fn function_literal(&mut self) -> EvalResult<Accessor> {
        self.expect(Kind::Function, "expected 'function'")?;
        let entry = self.cursor.save();
        self.expect(Kind::LParen, "expected '('")?;
        self.with_mode(Mode::Skim, |s| s.bind_parameters())?;
        self.expect(Kind::LBrace, "expected '{'")?;
        self.with_mode(Mode::Skim, |s| s.body_until_rbrace())?;
        self.expect(Kind::RBrace, "expected '}'")?;
        Ok(Accessor::Value(Value::Function(self.heap.new_function(entry))))
    }
}
