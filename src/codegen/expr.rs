//! # Expression Generation
//!
//! Generates the runtime value of an expression node, leaving exactly one
//! 8-byte slot on the machine stack. Lvalue loads and stores go through
//! [`super::addr::Codegen::gen_addr`]; binary operators share a common tail
//! once both operands are on the stack.

use crate::ast::{Node, NodeKind};
use crate::error::{Diagnostic, ErrorKind};
use crate::types::Type;

use super::Codegen;

impl Codegen {
    pub(super) fn gen_expr(&mut self, node: &Node) -> Result<(), Diagnostic> {
        match &node.kind {
            NodeKind::Num { val } => {
                self.emit(format_args!("  push {val}"));
                Ok(())
            }
            NodeKind::Var { .. } | NodeKind::Member { .. } => {
                self.gen_addr(node)?;
                if !node.is_array() {
                    self.load(node.ty.as_ref().expect("typed by add_type"));
                }
                Ok(())
            }
            NodeKind::Addr { lhs } => self.gen_addr(lhs),
            NodeKind::Deref { lhs } => {
                self.gen_expr(lhs)?;
                if !node.is_array() {
                    self.load(node.ty.as_ref().expect("typed by add_type"));
                }
                Ok(())
            }
            NodeKind::Assign { lhs, rhs } => {
                if lhs.is_array() {
                    return Err(Diagnostic::new(ErrorKind::NotAnLvalue, "cannot assign to an array", node.token.span));
                }
                self.gen_addr(lhs)?;
                self.gen_expr(rhs)?;
                self.store(node.ty.as_ref().expect("typed by add_type"));
                Ok(())
            }
            NodeKind::Add { lhs, rhs } => self.gen_binary("add rax, rdi", lhs, rhs),
            NodeKind::Sub { lhs, rhs } => self.gen_binary("sub rax, rdi", lhs, rhs),
            NodeKind::Mul { lhs, rhs } => self.gen_binary("imul rax, rdi", lhs, rhs),
            NodeKind::Div { lhs, rhs } => {
                self.gen_expr(lhs)?;
                self.gen_expr(rhs)?;
                self.emit_line("  pop rdi");
                self.emit_line("  pop rax");
                self.emit_line("  cqo");
                self.emit_line("  idiv rdi");
                self.emit_line("  push rax");
                Ok(())
            }
            NodeKind::PtrAdd { lhs, rhs } => {
                self.gen_expr(lhs)?;
                self.gen_expr(rhs)?;
                let elem_size = lhs.ty.as_ref().and_then(|t| t.base()).expect("PtrAdd lhs is pointer-like").size();
                self.emit_line("  pop rdi");
                self.emit_line("  pop rax");
                self.emit(format_args!("  imul rdi, {elem_size}"));
                self.emit_line("  add rax, rdi");
                self.emit_line("  push rax");
                Ok(())
            }
            NodeKind::PtrSub { lhs, rhs } => {
                self.gen_expr(lhs)?;
                self.gen_expr(rhs)?;
                let elem_size = lhs.ty.as_ref().and_then(|t| t.base()).expect("PtrSub lhs is pointer-like").size();
                self.emit_line("  pop rdi");
                self.emit_line("  pop rax");
                self.emit(format_args!("  imul rdi, {elem_size}"));
                self.emit_line("  sub rax, rdi");
                self.emit_line("  push rax");
                Ok(())
            }
            NodeKind::PtrDiff { lhs, rhs } => {
                self.gen_expr(lhs)?;
                self.gen_expr(rhs)?;
                let elem_size = lhs.ty.as_ref().expect("typed").size();
                self.emit_line("  pop rdi");
                self.emit_line("  pop rax");
                self.emit_line("  sub rax, rdi");
                self.emit_line("  cqo");
                self.emit(format_args!("  mov rdi, {elem_size}"));
                self.emit_line("  idiv rdi");
                self.emit_line("  push rax");
                Ok(())
            }
            NodeKind::Eq { lhs, rhs } => self.gen_compare("sete", lhs, rhs),
            NodeKind::Ne { lhs, rhs } => self.gen_compare("setne", lhs, rhs),
            NodeKind::Lt { lhs, rhs } => self.gen_compare("setl", lhs, rhs),
            NodeKind::Le { lhs, rhs } => self.gen_compare("setle", lhs, rhs),
            NodeKind::Call { func_name, args } => self.gen_call(func_name, args),
            NodeKind::StmtExpr { body } => {
                for stmt in body.iter().take(body.len().saturating_sub(1)) {
                    self.gen_stmt(stmt)?;
                }
                if let Some(last) = body.last() {
                    self.gen_expr(last)?;
                }
                Ok(())
            }
            other => unreachable!("{other:?} is not an expression node"),
        }
    }

    fn gen_binary(&mut self, op: &str, lhs: &Node, rhs: &Node) -> Result<(), Diagnostic> {
        self.gen_expr(lhs)?;
        self.gen_expr(rhs)?;
        self.emit_line("  pop rdi");
        self.emit_line("  pop rax");
        self.emit(format_args!("  {op}"));
        self.emit_line("  push rax");
        Ok(())
    }

    fn gen_compare(&mut self, set_ins: &str, lhs: &Node, rhs: &Node) -> Result<(), Diagnostic> {
        self.gen_expr(lhs)?;
        self.gen_expr(rhs)?;
        self.emit_line("  pop rdi");
        self.emit_line("  pop rax");
        self.emit_line("  cmp rax, rdi");
        self.emit(format_args!("  {set_ins} al"));
        self.emit_line("  movzx rax, al");
        self.emit_line("  push rax");
        Ok(())
    }

    /// Evaluate arguments left-to-right, pop into argument registers in
    /// reverse (so the first argument lands in `rdi`), then call with the
    /// runtime 16-byte stack alignment check the variadic-call ABI needs.
    fn gen_call(&mut self, func_name: &str, args: &[Node]) -> Result<(), Diagnostic> {
        for arg in args {
            self.gen_expr(arg)?;
        }
        for reg in super::ARG_REGS_64.iter().take(args.len()).rev() {
            self.emit(format_args!("  pop {reg}"));
        }

        let label = self.next_label();
        self.emit_line("  mov rax, rsp");
        self.emit_line("  and rax, 15");
        self.emit(format_args!("  jnz .L.call.{label}"));
        self.emit_line("  mov rax, 0");
        self.emit(format_args!("  call {func_name}"));
        self.emit(format_args!("  jmp .L.end.{label}"));
        self.emit(format_args!(".L.call.{label}:"));
        self.emit_line("  sub rsp, 8");
        self.emit_line("  mov rax, 0");
        self.emit(format_args!("  call {func_name}"));
        self.emit_line("  add rsp, 8");
        self.emit(format_args!(".L.end.{label}:"));
        self.emit_line("  push rax");
        Ok(())
    }

    fn load(&mut self, ty: &Type) {
        self.emit_line("  pop rax");
        if matches!(ty, Type::Char) {
            self.emit_line("  movsx rax, byte ptr [rax]");
        } else {
            self.emit_line("  mov rax, [rax]");
        }
        self.emit_line("  push rax");
    }

    fn store(&mut self, ty: &Type) {
        self.emit_line("  pop rdi");
        self.emit_line("  pop rax");
        if matches!(ty, Type::Char) {
            self.emit_line("  mov [rax], dil");
        } else {
            self.emit_line("  mov [rax], rdi");
        }
        self.emit_line("  push rdi");
    }
}
