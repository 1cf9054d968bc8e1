// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The accessor (spec §4.3): an L-value descriptor that mediates `get`/`put`
//! across variables and container members. Parsing a primary expression
//! followed by any chain of `[expr]`, `.ident`, `?.ident`, and `(args)`
//! produces one of these; each postfix step reifies the current accessor
//! via `get` and reshapes it into the next. Modeled on the teacher's
//! design-notes-recommended tagged-variant approach (`spec.md` §9) rather
//! than first-class references, since the value model has none.

use std::rc::Rc;

use crate::error::{ErrorKind, EvalResult, ScriptError};
use crate::interpreter::Interpreter;
use crate::value::{ArrayHandle, ObjectHandle, Value};

#[derive(Debug, Clone)]
pub enum Accessor {
    Value(Value),
    Name(Rc<str>),
    Index(ArrayHandle, usize),
    Key(ObjectHandle, Rc<str>),
    OptionalKey(Option<ObjectHandle>, Rc<str>),
}

impl Accessor {
    pub fn get(&self, interp: &mut Interpreter) -> EvalResult<Value> {
        if !interp.is_executing() {
            return Ok(Value::Undefined);
        }
        match self {
            Accessor::Value(v) => Ok(v.clone()),
            Accessor::Name(name) => {
                let line = interp.current_line();
                interp.scopes.fetch(name, &interp.file_name, line)
            }
            Accessor::Index(arr, idx) => Ok(arr.borrow().get(*idx).cloned().unwrap_or(Value::Null)),
            Accessor::Key(obj, key) => Ok(obj.borrow().get(key.as_ref()).cloned().unwrap_or(Value::Null)),
            Accessor::OptionalKey(holder, key) => match holder {
                Some(obj) => Ok(obj.borrow().get(key.as_ref()).cloned().unwrap_or(Value::Null)),
                None => Ok(Value::Null),
            },
        }
    }

    pub fn put(&self, interp: &mut Interpreter, value: Value) -> EvalResult<()> {
        if !interp.is_executing() {
            return Ok(());
        }
        match self {
            Accessor::Value(_) => {
                let line = interp.current_line();
                Err(ScriptError::new(
                    ErrorKind::Structural,
                    &interp.file_name,
                    line,
                    "Assign",
                    "cannot assign to a value that is not a variable or member",
                ))
            }
            Accessor::Name(name) => {
                let line = interp.current_line();
                interp.scopes.assign(name, value, &interp.file_name, line)
            }
            Accessor::Index(arr, idx) => {
                let mut arr = arr.borrow_mut();
                if *idx >= arr.len() {
                    arr.resize(*idx + 1, Value::Null);
                }
                arr[*idx] = value;
                Ok(())
            }
            Accessor::Key(obj, key) => {
                obj.borrow_mut().insert(key.clone(), value);
                Ok(())
            }
            Accessor::OptionalKey(holder, _) => {
                if holder.is_none() {
                    let line = interp.current_line();
                    return Err(ScriptError::new(
                        ErrorKind::Structural,
                        &interp.file_name,
                        line,
                        "OptionalChain",
                        "cannot assign through an optional chain on a non-object",
                    ));
                }
                let key = match self {
                    Accessor::OptionalKey(_, key) => key.clone(),
                    _ => unreachable!(),
                };
                holder.as_ref().unwrap().borrow_mut().insert(key, value);
                Ok(())
            }
        }
    }
}
