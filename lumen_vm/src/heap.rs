// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The value allocator (spec §5/§6 "value allocator contract"), named
//! `Heap` after the teacher's `nova_vm::Heap`. Unlike the teacher's
//! arena-indexed, mark-and-sweep heap, this allocator has no separate
//! collection pass: every handle it hands out is an `Rc`, so a value is
//! freed the moment its last root (a scope frame, the parameter buffer, the
//! result slot, or a function closure — the same roots spec §5 names for a
//! tracing collector) drops it. This is the safe-Rust substitute the design
//! notes in `spec.md` §9 call out explicitly; it is observably equivalent
//! because the core never exposes raw handle aliasing.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::{ArrayHandle, FunctionData, FunctionHandle, ObjectHandle, StrHandle, Value};

#[derive(Debug, Default)]
pub struct Heap;

impl Heap {
    pub fn new() -> Self {
        Self
    }

    pub fn new_string(&self, bytes: &str) -> StrHandle {
        Rc::from(bytes)
    }

    pub fn new_array(&self, elements: Vec<Value>) -> ArrayHandle {
        Rc::new(RefCell::new(elements))
    }

    pub fn new_object(&self) -> ObjectHandle {
        Rc::new(RefCell::new(IndexMap::new()))
    }

    pub fn new_function(&self, entry: usize) -> FunctionHandle {
        Rc::new(RefCell::new(FunctionData {
            entry,
            closure: ahash::AHashMap::new(),
        }))
    }
}
