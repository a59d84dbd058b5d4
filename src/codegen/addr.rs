//! # Address Generation
//!
//! Pushes the runtime address of an lvalue onto the stack. `Var` resolves
//! to either a frame-relative offset or a global symbol; `Deref` is the
//! identity (its subexpression already computes the address it dereferences);
//! `Member` adds a compile-time-known offset to its base's address. Anything
//! else isn't an lvalue.

use crate::ast::{Node, NodeKind};
use crate::error::{Diagnostic, ErrorKind};

use super::Codegen;

impl Codegen {
    pub(super) fn gen_addr(&mut self, node: &Node) -> Result<(), Diagnostic> {
        match &node.kind {
            NodeKind::Var { var } => {
                if var.is_local {
                    self.emit(format_args!("  lea rax, [rbp-{}]", var.offset.get()));
                } else {
                    self.emit(format_args!("  push offset {}", var.name));
                    return Ok(());
                }
                self.emit_line("  push rax");
                Ok(())
            }
            NodeKind::Deref { lhs } => self.gen_expr(lhs),
            NodeKind::Member { lhs, offset, .. } => {
                self.gen_addr(lhs)?;
                self.emit_line("  pop rax");
                self.emit(format_args!("  add rax, {offset}"));
                self.emit_line("  push rax");
                Ok(())
            }
            _ => Err(Diagnostic::new(ErrorKind::NotAnLvalue, "not an lvalue", node.token.span)),
        }
    }
}
