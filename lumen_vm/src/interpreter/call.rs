// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The call mechanism (spec §4.6): parameter buffer, positional binding
//! with defaults and a trailing `...rest`, cursor jump to the callee's
//! entry token, and closure capture performed post-hoc on return. Modeled
//! on the "record a marker, push a frame, bind, jump, restore" shape of a
//! tree-walking call in `nova_vm::ecmascript::execution`, adapted here to
//! jump by token index rather than by AST node.

use std::mem;

use lumen_lexer::Kind;

use crate::accessor::Accessor;
use crate::error::{ErrorKind, EvalResult};
use crate::interpreter::{Interpreter, Mode};
use crate::scope::SourceRange;
use crate::value::{FunctionHandle, Value};

impl<'a> Interpreter<'a> {
    /// `callee_acc(args)`, with the cursor sitting on the `(`. Evaluates
    /// `callee_acc` and every argument (honoring `...spread`) before
    /// dispatching to a host or script callable.
    pub(crate) fn call(&mut self, callee_acc: Accessor) -> EvalResult<Value> {
        let callee = callee_acc.get(self)?;
        let paren = self.cursor.save();
        self.expect(Kind::LParen, "expected '('")?;
        let mut args = Vec::new();
        while !self.check(Kind::RParen) {
            if self.accept(Kind::Spread) {
                let spread = self.expr()?;
                if self.is_executing() {
                    let arr = spread.as_array().ok_or_else(|| {
                        self.error(
                            ErrorKind::Range,
                            "Spread",
                            format!(
                                "'...' in a call requires an array, found {}",
                                spread.type_name()
                            ),
                        )
                    })?;
                    args.extend(arr.borrow().iter().cloned());
                }
            } else {
                let v = self.expr()?;
                if self.is_executing() {
                    args.push(v);
                }
            }
            if !self.accept(Kind::Comma) {
                break;
            }
            if self.check(Kind::RParen) {
                return Err(self.error(ErrorKind::Syntax, "Comma", "trailing comma is not permitted in a call's argument list"));
            }
        }
        self.expect(Kind::RParen, "expected ')'")?;

        if !self.is_executing() {
            return Ok(Value::Undefined);
        }

        match callee {
            Value::Host(host) => {
                let saved_params = mem::replace(&mut self.params, args);
                self.result = Value::Undefined;
                self.scopes.frame_push(SourceRange {
                    start: paren,
                    end: paren,
                });
                let outcome = (host.0)(self);
                self.scopes.frame_pop();
                let result = mem::replace(&mut self.result, Value::Undefined);
                self.params = saved_params;
                outcome?;
                Ok(result)
            }
            Value::Function(func) => self.invoke_script_function(&func, args),
            other => Err(self.error(
                ErrorKind::Structural,
                "Call",
                format!("cannot call a {}", other.type_name()),
            )),
        }
    }

    fn invoke_script_function(&mut self, func: &FunctionHandle, args: Vec<Value>) -> EvalResult<Value> {
        let (entry, closure) = {
            let data = func.borrow();
            (data.entry, data.closure.clone())
        };
        log::trace!("call entry at token {entry} with {} argument(s)", args.len());
        let saved_cursor = self.cursor.save();
        let saved_params = mem::replace(&mut self.params, args);

        self.scopes.frame_push(SourceRange {
            start: entry,
            end: entry,
        });
        for (name, value) in closure {
            self.scopes.declare(name, value);
        }

        self.cursor.restore(entry);
        let outcome = self.run_call_body();

        let result = mem::replace(&mut self.result, Value::Undefined);
        self.flags.ret = false;
        let result = match result {
            Value::Undefined => Value::Null,
            other => other,
        };

        // Closure capture (spec §4.6 step 7): done post-hoc, so a returned
        // function sees only the bindings of the call that produced it, not
        // any frame further out.
        if let Value::Function(inner) = &result {
            let bindings = self.scopes.top_bindings();
            inner.borrow_mut().closure = bindings;
        }

        self.scopes.frame_pop();
        self.params = saved_params;
        self.cursor.restore(saved_cursor);
        outcome?;
        log::trace!("call return from token {entry}: {}", result.type_name());
        Ok(result)
    }

    fn run_call_body(&mut self) -> EvalResult<()> {
        self.expect(Kind::LParen, "expected '('")?;
        self.bind_parameters()?;
        self.expect(Kind::LBrace, "expected '{'")?;
        self.body_until_rbrace()?;
        self.expect(Kind::RBrace, "expected '}'")?;
        Ok(())
    }

    /// Parses `(name [= expr], ..., ...rest)` and binds each formal in the
    /// current (innermost) frame. Shared verbatim between a real call, where
    /// `self.params` holds the actuals, and a function literal/declaration's
    /// definition-time skim, where the caller has already forced `Mode::Skim`
    /// so every `declare` below is a no-op — the same grammar, either way.
    pub(crate) fn bind_parameters(&mut self) -> EvalResult<()> {
        let mut index = 0usize;
        loop {
            if self.check(Kind::RParen) {
                break;
            }
            if self.accept(Kind::Spread) {
                let name = self.ident_name()?;
                if self.is_executing() {
                    let rest = if index < self.params.len() {
                        self.params[index..].to_vec()
                    } else {
                        Vec::new()
                    };
                    let arr = self.heap.new_array(rest);
                    self.scopes.declare(name, Value::Array(arr));
                }
                break;
            }
            let name = self.ident_name()?;
            let actual = self.params.get(index).cloned();
            let has_default = self.accept(Kind::Assign);
            match actual {
                Some(value) => {
                    if has_default {
                        // An actual was supplied: skim the default so the
                        // cursor still advances past it (spec §4.6 step 5).
                        self.with_mode(Mode::Skim, |s| s.expr())?;
                    }
                    if self.is_executing() {
                        self.scopes.declare(name, value);
                    }
                }
                None => {
                    let value = if has_default { self.expr()? } else { Value::Null };
                    if self.is_executing() {
                        self.scopes.declare(name, value);
                    }
                }
            }
            index += 1;
            if !self.accept(Kind::Comma) {
                break;
            }
        }
        Ok(())
    }

    pub(crate) fn body_until_rbrace(&mut self) -> EvalResult<()> {
        while !self.check(Kind::RBrace) {
            self.statement()?;
        }
        Ok(())
    }
}
