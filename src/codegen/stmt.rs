//! # Statement Generation
//!
//! Structured control flow against a fresh label sequence number per
//! construct; every arm here leaves the stack exactly as it found it.

use crate::ast::{Node, NodeKind};
use crate::error::Diagnostic;

use super::Codegen;

impl Codegen {
    pub(super) fn gen_stmt(&mut self, node: &Node) -> Result<(), Diagnostic> {
        match &node.kind {
            NodeKind::Return { lhs } => {
                self.gen_expr(lhs)?;
                self.emit_line("  pop rax");
                let ret_label = self.ret_label.clone();
                self.emit(format_args!("  jmp {ret_label}"));
                Ok(())
            }
            NodeKind::If { cond, cons, alt } => {
                let label = self.next_label();
                self.gen_expr(cond)?;
                self.emit_line("  pop rax");
                self.emit_line("  cmp rax, 0");
                match alt {
                    Some(alt) => {
                        self.emit(format_args!("  je .L.else.{label}"));
                        self.gen_stmt(cons)?;
                        self.emit(format_args!("  jmp .L.end.{label}"));
                        self.emit(format_args!(".L.else.{label}:"));
                        self.gen_stmt(alt)?;
                    }
                    None => {
                        self.emit(format_args!("  je .L.end.{label}"));
                        self.gen_stmt(cons)?;
                    }
                }
                self.emit(format_args!(".L.end.{label}:"));
                Ok(())
            }
            NodeKind::While { cond, cons } => {
                let label = self.next_label();
                self.emit(format_args!(".L.begin.{label}:"));
                self.gen_expr(cond)?;
                self.emit_line("  pop rax");
                self.emit_line("  cmp rax, 0");
                self.emit(format_args!("  je .L.end.{label}"));
                self.gen_stmt(cons)?;
                self.emit(format_args!("  jmp .L.begin.{label}"));
                self.emit(format_args!(".L.end.{label}:"));
                Ok(())
            }
            NodeKind::For { init, cond, updt, cons } => {
                let label = self.next_label();
                if let Some(init) = init {
                    self.gen_stmt(init)?;
                }
                self.emit(format_args!(".L.begin.{label}:"));
                if let Some(cond) = cond {
                    self.gen_expr(cond)?;
                    self.emit_line("  pop rax");
                    self.emit_line("  cmp rax, 0");
                    self.emit(format_args!("  je .L.end.{label}"));
                }
                self.gen_stmt(cons)?;
                if let Some(updt) = updt {
                    self.gen_stmt(updt)?;
                }
                self.emit(format_args!("  jmp .L.begin.{label}"));
                self.emit(format_args!(".L.end.{label}:"));
                Ok(())
            }
            NodeKind::Block { body } => {
                for stmt in body {
                    self.gen_stmt(stmt)?;
                }
                Ok(())
            }
            NodeKind::ExprStmt { lhs } => {
                self.gen_expr(lhs)?;
                self.emit_line("  add rsp, 8");
                Ok(())
            }
            NodeKind::Null => Ok(()),
            other => unreachable!("{other:?} is not a statement node"),
        }
    }
}
