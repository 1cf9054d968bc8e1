// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scope stack (spec §4.2): frame-structured variable lookup with
//! lexical shadowing. Frames form a stack; `declare` always binds in the
//! top frame, `fetch`/`assign`/`erase` walk top-down searching for the
//! innermost binding. Grounded on the outer-pointer-less, stack-of-maps
//! shape used throughout `nova_vm::ecmascript::execution::environments`
//! (an `EnvironmentIndex` stack walked top-down via `OuterEnv`), simplified
//! here to a plain `Vec<Frame>` since Lumen has no separate global/module/
//! function environment *kinds* to distinguish.

use std::rc::Rc;

use ahash::AHashMap;

use crate::error::{ErrorKind, EvalResult, ScriptError};
use crate::value::Value;

/// A syntactic source span, kept on each frame purely for diagnostics (spec
/// §3: "a source-range covering the syntactic block that produced it").
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Default)]
pub struct Frame {
    vars: AHashMap<Rc<str>, Value>,
    pub range: SourceRange,
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_push(&mut self, range: SourceRange) {
        log::trace!("frame push at depth {} ({:?})", self.frames.len(), range);
        self.frames.push(Frame {
            vars: AHashMap::new(),
            range,
        });
    }

    pub fn frame_pop(&mut self) {
        self.frames.pop();
        log::trace!("frame pop, depth now {}", self.frames.len());
    }

    pub fn declare(&mut self, name: Rc<str>, value: Value) {
        let top = self
            .frames
            .last_mut()
            .expect("declare called with no active frame");
        top.vars.insert(name, value);
    }

    pub fn fetch(&self, name: &str, script_file: &str, line: u32) -> EvalResult<Value> {
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.vars.get(name) {
                return Ok(v.clone());
            }
        }
        Err(ScriptError::new(
            ErrorKind::Reference,
            script_file,
            line,
            "Ident",
            format!("undefined variable '{name}'"),
        ))
    }

    pub fn assign(&mut self, name: &str, value: Value, script_file: &str, line: u32) -> EvalResult<()> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.vars.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        Err(ScriptError::new(
            ErrorKind::Reference,
            script_file,
            line,
            "Ident",
            format!("assignment to undefined variable '{name}'"),
        ))
    }

    pub fn erase(&mut self, name: &str, script_file: &str, line: u32) -> EvalResult<()> {
        for frame in self.frames.iter_mut().rev() {
            if frame.vars.remove(name).is_some() {
                return Ok(());
            }
        }
        Err(ScriptError::new(
            ErrorKind::Reference,
            script_file,
            line,
            "Ident",
            format!("deletion of undefined variable '{name}'"),
        ))
    }

    /// Snapshot of the innermost frame's bindings, used by the call
    /// mechanism's closure-capture step (spec §4.6 step 7).
    pub fn top_bindings(&self) -> AHashMap<Rc<str>, Value> {
        self.frames
            .last()
            .map(|f| f.vars.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_frame_shadows_outer() {
        let mut s = ScopeStack::new();
        s.frame_push(SourceRange::default());
        s.declare("x".into(), Value::Number(1.0));
        s.frame_push(SourceRange::default());
        s.declare("x".into(), Value::Number(2.0));
        assert_eq!(s.fetch("x", "t", 0).unwrap().as_number(), Some(2.0));
        s.frame_pop();
        assert_eq!(s.fetch("x", "t", 0).unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn assign_writes_innermost_existing_binding() {
        let mut s = ScopeStack::new();
        s.frame_push(SourceRange::default());
        s.declare("x".into(), Value::Number(1.0));
        s.frame_push(SourceRange::default());
        s.assign("x", Value::Number(9.0), "t", 0).unwrap();
        s.frame_pop();
        assert_eq!(s.fetch("x", "t", 0).unwrap().as_number(), Some(9.0));
    }

    #[test]
    fn fetch_missing_is_reference_error() {
        let s = ScopeStack::new();
        let err = s.fetch("missing", "t", 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Reference);
    }
}
