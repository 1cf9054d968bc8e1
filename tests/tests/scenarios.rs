// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-crate scenario tests: scanner, interpreter core, and standard
//! library wired together the way a host embedder actually assembles them,
//! as opposed to the unit-level coverage each crate keeps of its own
//! internals.

use std::cell::RefCell;
use std::rc::Rc;

use lumen_vm::value::HostHandle;
use lumen_vm::{ErrorKind, Interpreter, Value};

fn run_and_capture(source: &str) -> Vec<String> {
    let output = Rc::new(RefCell::new(Vec::new()));
    let sink = output.clone();
    lumen_vm::run("scenario.lum", source, |interp| {
        lumen_stdlib::register(interp);
        let sink = sink.clone();
        interp.scopes.declare(
            Rc::from("record"),
            Value::Host(HostHandle(Rc::new(move |i: &mut Interpreter| {
                if let Some(v) = i.params.first() {
                    sink.borrow_mut().push(v.display());
                }
                Ok(())
            }))),
        );
    })
    .unwrap();
    Rc::try_unwrap(output).unwrap().into_inner()
}

#[test]
fn object_and_array_literals_mix_with_builtins() {
    let out = run_and_capture(
        "let o = {name: \"lumen\", tags: [\"vm\", \"scripting\"]};
         record(len(o.tags));
         record(keys(o));",
    );
    assert_eq!(out, vec!["2", "[name,tags]"]);
}

#[test]
fn push_mutates_array_in_place_across_calls() {
    let out = run_and_capture(
        "function grow(xs) { push(xs, len(xs)); }
         let xs = [];
         grow(xs); grow(xs); grow(xs);
         record(xs);",
    );
    assert_eq!(out, vec!["[0,1,2]"]);
}

#[test]
fn nested_function_declarations_and_recursion() {
    let out = run_and_capture(
        "function fib(n) {
             if (n < 2) { return n; }
             return fib(n - 1) + fib(n - 2);
         }
         record(fib(10));",
    );
    assert_eq!(out, vec!["55"]);
}

#[test]
fn ternary_and_relational_chain() {
    let out = run_and_capture(
        "let classify = function(n) { return n < 0 ? \"neg\" : n == 0 ? \"zero\" : \"pos\"; };
         record(classify(-3));
         record(classify(0));
         record(classify(3));",
    );
    assert_eq!(out, vec!["neg", "zero", "pos"]);
}

#[test]
fn scanning_and_interpreting_without_the_run_helper() {
    let source = "let total = 0; for (let i = 0; i < 5; i += 1) { total += i; } total;";
    let tokens = lumen_lexer::scan(source);
    let mut interp = Interpreter::new("direct.lum", source, &tokens);
    lumen_stdlib::register(&mut interp);
    interp.run().unwrap();
    assert_eq!(interp.scopes.depth(), 1);
}

#[test]
fn host_function_type_errors_propagate_through_run() {
    let err = lumen_vm::run("scenario.lum", "len(42);", |interp| {
        lumen_stdlib::register(interp);
    })
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn delete_unmasks_an_outer_binding_of_the_same_name() {
    let out = run_and_capture(
        "let shadow = 1;
         { let shadow = 2; delete shadow; record(shadow); }",
    );
    assert_eq!(out, vec!["1"]);
}

#[test]
fn delete_unbinds_a_variable_for_the_rest_of_its_scope() {
    let err = lumen_vm::run("scenario.lum", "let x = 1; delete x; record(x);", |interp| {
        lumen_stdlib::register(interp)
    })
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Reference);
}
