// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tagged value union (spec §3) and the heap handles it carries.
//!
//! `undefined` and `null` are distinct, as the spec requires: `undefined`
//! marks "no value yielded" internally (a function that fell off the end of
//! its body without a `return`, or the interpreter-wide result slot between
//! calls) and is never produced by script-level literals.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{ErrorKind, EvalResult, ScriptError};
use crate::interpreter::Interpreter;

pub type StrHandle = Rc<str>;
pub type ArrayHandle = Rc<RefCell<Vec<Value>>>;
pub type ObjectHandle = Rc<RefCell<indexmap::IndexMap<Rc<str>, Value>>>;
pub type FunctionHandle = Rc<RefCell<FunctionData>>;

/// A host-defined callable (spec §6 "host function contract"): it reads
/// its arguments from `Interpreter::params` and writes its return value
/// to `Interpreter::result`, the same buffer/slot pair a script-defined
/// call uses, so the call mechanism never needs to know which kind of
/// callable it is invoking.
pub type HostFn = dyn Fn(&mut Interpreter) -> EvalResult<()>;

#[derive(Clone)]
pub struct HostHandle(pub Rc<HostFn>);

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<host function>")
    }
}

/// A script function value: where its body starts in the token array, and
/// the bindings it has captured from its defining call frame (spec §4.6
/// step 7). The closure map is populated lazily, once, the moment the
/// function value escapes its defining call.
#[derive(Debug, Clone, Default)]
pub struct FunctionData {
    pub entry: usize,
    pub closure: ahash::AHashMap<Rc<str>, Value>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(StrHandle),
    Array(ArrayHandle),
    Object(ObjectHandle),
    Function(FunctionHandle),
    Host(HostHandle),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) | Value::Host(_) => "function",
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayHandle> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Value equality for `==`/`!=` (spec §4.4): different kinds are always
    /// unequal; numbers compare numerically (so `-0.0 == 0.0`); strings
    /// compare by content; every other kind compares by heap-handle
    /// identity.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Host(a), Value::Host(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }

    /// Required a `Value::Boolean`, producing a type error otherwise
    /// (conditions and logical operators never coerce, spec §4.4).
    pub fn require_boolean(&self, script_file: &str, line: u32, what: &str) -> EvalResult<bool> {
        self.as_boolean().ok_or_else(|| {
            ScriptError::new(
                ErrorKind::Type,
                script_file,
                line,
                "Boolean",
                format!("{what} requires a boolean operand, found {}", self.type_name()),
            )
        })
    }

    pub fn require_number(&self, script_file: &str, line: u32, what: &str) -> EvalResult<f64> {
        self.as_number().ok_or_else(|| {
            ScriptError::new(
                ErrorKind::Type,
                script_file,
                line,
                "Number",
                format!("{what} requires a number operand, found {}", self.type_name()),
            )
        })
    }

    /// Renders a value the way the standard library's `print` does:
    /// integral numbers without a trailing `.0`, arrays/objects with no
    /// interior spacing (spec §8 scenario 6 expects `[0,1,2,3,4]`).
    pub fn display(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => display_number(*n),
            Value::String(s) => s.to_string(),
            Value::Array(arr) => {
                let items: Vec<String> = arr.borrow().iter().map(Value::display).collect();
                format!("[{}]", items.join(","))
            }
            Value::Object(obj) => {
                let items: Vec<String> = obj
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{k}:{}", v.display()))
                    .collect();
                format!("{{{}}}", items.join(","))
            }
            Value::Function(_) | Value::Host(_) => "function".to_string(),
        }
    }
}

fn display_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_equals_zero() {
        assert!(Value::Number(-0.0).loose_eq(&Value::Number(0.0)));
    }

    #[test]
    fn different_kinds_are_never_equal() {
        assert!(!Value::Number(0.0).loose_eq(&Value::Null));
        assert!(!Value::Undefined.loose_eq(&Value::Null));
    }

    #[test]
    fn type_names_match_typeof_table() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Number(0.0).type_name(), "number");
        assert_eq!(Value::String("".into()).type_name(), "string");
    }
}
