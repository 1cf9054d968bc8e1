// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lumen's standard library: the host-defined-realm collaborator spec §6
//! calls out as external to the core. Each built-in is an ordinary host
//! function registered as a global binding before the program runs, exactly
//! the shape `nova_vm`'s realm setup uses to wire intrinsics into a fresh
//! global environment before evaluation starts.

use std::rc::Rc;

use lumen_vm::value::HostHandle;
use lumen_vm::{ErrorKind, EvalResult, Interpreter, ScriptError, Value};

/// Declares every built-in as a global binding. Call this once on a freshly
/// constructed [`Interpreter`], before [`Interpreter::run`].
pub fn register(interp: &mut Interpreter) {
    declare_host(interp, "print", print);
    declare_host(interp, "len", len);
    declare_host(interp, "push", push);
    declare_host(interp, "keys", keys);
}

fn declare_host(
    interp: &mut Interpreter,
    name: &str,
    f: impl Fn(&mut Interpreter) -> EvalResult<()> + 'static,
) {
    interp.scopes.declare(Rc::from(name), Value::Host(HostHandle(Rc::new(f))));
}

fn print(interp: &mut Interpreter) -> EvalResult<()> {
    let line = interp.params.first().map(Value::display).unwrap_or_default();
    log::trace!("print: {line}");
    println!("{line}");
    Ok(())
}

fn len(interp: &mut Interpreter) -> EvalResult<()> {
    let arg = interp.params.first().cloned().unwrap_or(Value::Undefined);
    let n = match &arg {
        Value::Array(a) => a.borrow().len(),
        Value::Object(o) => o.borrow().len(),
        Value::String(s) => s.len(),
        other => {
            return Err(host_error(
                interp,
                ErrorKind::Type,
                "len",
                format!("'len' requires an array, object, or string, found {}", other.type_name()),
            ));
        }
    };
    interp.result = Value::Number(n as f64);
    Ok(())
}

fn push(interp: &mut Interpreter) -> EvalResult<()> {
    let arr = match interp.params.first() {
        Some(Value::Array(a)) => a.clone(),
        Some(other) => {
            return Err(host_error(
                interp,
                ErrorKind::Type,
                "push",
                format!("'push' requires an array as its first argument, found {}", other.type_name()),
            ));
        }
        None => {
            return Err(host_error(interp, ErrorKind::Type, "push", "'push' requires an array argument"));
        }
    };
    for value in interp.params.iter().skip(1).cloned().collect::<Vec<_>>() {
        arr.borrow_mut().push(value);
    }
    let new_len = arr.borrow().len();
    interp.result = Value::Number(new_len as f64);
    Ok(())
}

fn keys(interp: &mut Interpreter) -> EvalResult<()> {
    let obj = match interp.params.first() {
        Some(Value::Object(o)) => o.clone(),
        Some(other) => {
            return Err(host_error(
                interp,
                ErrorKind::Type,
                "keys",
                format!("'keys' requires an object, found {}", other.type_name()),
            ));
        }
        None => {
            return Err(host_error(interp, ErrorKind::Type, "keys", "'keys' requires an object argument"));
        }
    };
    let names: Vec<Value> = obj
        .borrow()
        .keys()
        .map(|k| Value::String(interp.heap.new_string(k)))
        .collect();
    interp.result = Value::Array(interp.heap.new_array(names));
    Ok(())
}

fn host_error(interp: &Interpreter, kind: ErrorKind, what: &str, message: impl Into<String>) -> ScriptError {
    ScriptError::new(kind, interp.file_name.clone(), interp.current_line(), what, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn program_using_every_builtin() {
        lumen_vm::run(
            "test.lum",
            "let xs = [1,2,3]; push(xs, 4); let o = {a:1,b:2}; print(len(xs)); print(keys(o));",
            register,
        )
        .unwrap();
    }

    #[test]
    fn push_appends_and_returns_new_length() {
        let tokens = lumen_lexer::scan(";");
        let mut interp = Interpreter::new("t.lum", ";", &tokens);
        register(&mut interp);
        let arr = Value::Array(Rc::new(RefCell::new(vec![Value::Number(1.0)])));
        interp.params = vec![arr, Value::Number(2.0)];
        push(&mut interp).unwrap();
        assert_eq!(interp.result.as_number(), Some(2.0));
    }

    #[test]
    fn len_rejects_non_container() {
        let tokens = lumen_lexer::scan(";");
        let mut interp = Interpreter::new("t.lum", ";", &tokens);
        register(&mut interp);
        interp.params = vec![Value::Number(1.0)];
        let err = len(&mut interp).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }
}
