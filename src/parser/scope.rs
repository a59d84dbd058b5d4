//! # Scope Stacks
//!
//! Two parallel lexical stacks: ordinary identifiers (variables and typedef
//! names share one namespace) and struct tags live in a separate namespace,
//! per C's rules. A block-entering construct snapshots both stacks' lengths
//! on entry and truncates back to them on exit, so declarations inside a
//! block vanish once it closes.

use std::rc::Rc;

use crate::ast::Variable;
use crate::types::Type;

/// What an ordinary identifier can be bound to.
pub enum Binding {
    Var(Rc<Variable>),
    Typedef(Rc<Type>),
}

struct Entry<T> {
    name: String,
    value: T,
}

#[derive(Default)]
pub struct Scopes {
    vars: Vec<Entry<Binding>>,
    tags: Vec<Entry<Rc<Type>>>,
}

/// Snapshot of both stacks' lengths, taken on block entry and restored on exit.
pub struct Mark {
    vars: usize,
    tags: usize,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) -> Mark {
        Mark { vars: self.vars.len(), tags: self.tags.len() }
    }

    pub fn restore(&mut self, mark: Mark) {
        self.vars.truncate(mark.vars);
        self.tags.truncate(mark.tags);
    }

    pub fn push_var(&mut self, name: impl Into<String>, var: Rc<Variable>) {
        self.vars.push(Entry { name: name.into(), value: Binding::Var(var) });
    }

    pub fn push_typedef(&mut self, name: impl Into<String>, ty: Rc<Type>) {
        self.vars.push(Entry { name: name.into(), value: Binding::Typedef(ty) });
    }

    pub fn push_tag(&mut self, name: impl Into<String>, ty: Rc<Type>) {
        self.tags.push(Entry { name: name.into(), value: ty });
    }

    /// Most-recently-pushed binding wins, matching lexical shadowing.
    pub fn find_var(&self, name: &str) -> Option<&Binding> {
        self.vars.iter().rev().find(|e| e.name == name).map(|e| &e.value)
    }

    pub fn find_tag(&self, name: &str) -> Option<&Rc<Type>> {
        self.tags.iter().rev().find(|e| e.name == name).map(|e| &e.value)
    }
}
