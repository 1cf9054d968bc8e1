// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lumen's virtual machine: the fused parse-and-evaluate tree-walking core
//! described across the component design. The scanner, the standard
//! library, and the host shell are external collaborators this crate never
//! reaches into directly — it only consumes the [`lumen_lexer::Token`]
//! stream and exposes [`Interpreter`] for a host to register callables on
//! and drive.

pub mod accessor;
pub mod cursor;
pub mod error;
pub mod heap;
pub mod interpreter;
pub mod scope;
pub mod value;

pub use error::{ErrorKind, EvalResult, ScriptError};
pub use interpreter::Interpreter;
pub use value::{HostFn, HostHandle, Value};

use lumen_lexer::Token;

/// Scans and runs `source` in one call, the shape a minimal host embedder
/// reaches for first. `register` is given the fresh interpreter before any
/// statement runs, the hook the standard library and CLI both use to install
/// host callables as global bindings.
pub fn run(
    file_name: impl Into<String>,
    source: &str,
    register: impl FnOnce(&mut Interpreter),
) -> EvalResult<()> {
    let tokens: Vec<Token> = lumen_lexer::scan(source);
    let mut interp = Interpreter::new(file_name, source, &tokens);
    register(&mut interp);
    interp.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{HostHandle, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn run_and_capture(source: &str) -> Vec<String> {
        let output = Rc::new(RefCell::new(Vec::new()));
        let sink = output.clone();
        run("test.lum", source, |interp| {
            let heap_dummy = sink.clone();
            interp.scopes.declare(
                Rc::from("print"),
                Value::Host(HostHandle(Rc::new(move |i: &mut Interpreter| {
                    if let Some(v) = i.params.first() {
                        heap_dummy.borrow_mut().push(v.display());
                    }
                    Ok(())
                }))),
            );
        })
        .unwrap();
        Rc::try_unwrap(output).unwrap().into_inner()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run_and_capture("let a = 2 + 3 * 4; print(a);"), vec!["14"]);
    }

    #[test]
    fn string_concat_loop() {
        assert_eq!(
            run_and_capture("let s = \"\"; for (let i = 0; i < 3; i += 1) { s += \"x\"; } print(s);"),
            vec!["xxx"]
        );
    }

    #[test]
    fn recursive_factorial() {
        assert_eq!(
            run_and_capture(
                "function fact(n) { if (n <= 1) { return 1; } return n * fact(n - 1); } print(fact(5));"
            ),
            vec!["120"]
        );
    }

    #[test]
    fn for_of_over_object_values() {
        assert_eq!(
            run_and_capture("let o = {a:1, b:2}; let sum = 0; for (let v of o) { sum += v; } print(sum);"),
            vec!["3"]
        );
    }

    #[test]
    fn closures_are_independent_per_call() {
        assert_eq!(
            run_and_capture("let mk = function(n){ return function(){ return n; }; }; let f = mk(7); let g = mk(9); print(f() + g());"),
            vec!["16"]
        );
    }

    #[test]
    fn closure_capture_persists_across_calls() {
        assert_eq!(
            run_and_capture(
                "let f = (function(){ let x = 0; return function(){ x += 1; return x; }; })(); f(); f(); print(f());"
            ),
            vec!["3"]
        );
    }

    #[test]
    fn array_spread_literal() {
        assert_eq!(
            run_and_capture("let xs = [1,2,3]; let ys = [0, ...xs, 4]; print(ys);"),
            vec!["[0,1,2,3,4]"]
        );
    }

    #[test]
    fn typeof_table() {
        assert_eq!(
            run_and_capture(
                "print(typeof null); print(typeof 0); print(typeof \"\"); print(typeof []); print(typeof {}); print(typeof function(){});"
            ),
            vec!["null", "number", "string", "array", "object", "function"]
        );
    }

    #[test]
    fn break_only_exits_innermost_loop() {
        assert_eq!(
            run_and_capture(
                "let hits = 0; for (let i = 0; i < 3; i += 1) { for (let j = 0; j < 3; j += 1) { if (j == 1) { break; } hits += 1; } } print(hits);"
            ),
            vec!["3"]
        );
    }

    #[test]
    fn post_run_invariants_hold() {
        let tokens = lumen_lexer::scan("let a = 1;");
        let mut interp = Interpreter::new("t.lum", "let a = 1;", &tokens);
        interp.run().unwrap();
        assert_eq!(interp.scopes.depth(), 1);
        assert!(!interp.flags.any());
        assert!(interp.params.is_empty());
        assert!(matches!(interp.result, Value::Undefined));
    }

    #[test]
    fn undefined_variable_is_a_reference_error() {
        let err = run("t.lum", "print(missing);", |_| {}).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Reference);
    }
}
