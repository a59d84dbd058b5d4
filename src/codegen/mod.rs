//! # Code Generator
//!
//! Emits x86-64 assembly in Intel syntax under a strict stack discipline:
//! every expression node, once generated, leaves exactly one 8-byte value on
//! top of the machine stack; every statement node leaves the stack exactly
//! as it found it. [`addr`] generates lvalue addresses, [`expr`] generates
//! expression values, [`stmt`] generates control flow and drives a
//! function's statement list.

pub mod addr;
pub mod expr;
pub mod stmt;


use std::fmt::Write as _;

use crate::ast::{Function, Program};
use crate::error::Diagnostic;
use crate::types::Type;

const ARG_REGS_64: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];
const ARG_REGS_8: [&str; 6] = ["dil", "sil", "dl", "cl", "r8b", "r9b"];

pub struct Codegen {
    out: String,
    label_seq: usize,
    /// `.L.return.<name>` of the function currently being generated.
    ret_label: String,
}

/// Generate the whole assembly text for `program`.
pub fn generate(program: &Program) -> Result<String, Diagnostic> {
    let mut cg = Codegen::new();
    cg.emit_line(".intel_syntax noprefix");
    cg.emit_data(program);
    cg.emit_line(".text");
    for function in &program.functions {
        cg.emit_function(function)?;
    }
    Ok(cg.out)
}

impl Codegen {
    fn new() -> Self {
        Self { out: String::new(), label_seq: 0, ret_label: String::new() }
    }

    fn emit_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn emit(&mut self, args: std::fmt::Arguments) {
        writeln!(self.out, "{args}").expect("writing to a String never fails");
    }

    fn next_label(&mut self) -> usize {
        self.label_seq += 1;
        self.label_seq
    }

    fn emit_data(&mut self, program: &Program) {
        self.emit_line(".data");
        for var in &program.globals {
            self.emit(format_args!("{}:", var.name));
            match &var.contents {
                Some(bytes) => {
                    for b in bytes {
                        self.emit(format_args!("  .byte {b}"));
                    }
                }
                None => self.emit(format_args!("  .zero {}", var.ty.size())),
            }
        }
    }

    fn emit_function(&mut self, function: &Function) -> Result<(), Diagnostic> {
        self.ret_label = format!(".L.return.{}", function.name);

        self.emit(format_args!(".global {}", function.name));
        self.emit(format_args!("{}:", function.name));
        self.emit_line("  push rbp");
        self.emit_line("  mov rbp, rsp");
        self.emit(format_args!("  sub rsp, {}", function.stack_size.get()));

        for (i, param) in function.params.iter().enumerate() {
            let offset = param.offset.get();
            if matches!(*param.ty, Type::Char) {
                self.emit(format_args!("  mov [rbp-{offset}], {}", ARG_REGS_8[i]));
            } else {
                self.emit(format_args!("  mov [rbp-{offset}], {}", ARG_REGS_64[i]));
            }
        }

        for stmt in &function.body {
            self.gen_stmt(stmt)?;
        }

        let ret_label = self.ret_label.clone();
        self.emit(format_args!("{ret_label}:"));
        self.emit_line("  mov rsp, rbp");
        self.emit_line("  pop rbp");
        self.emit_line("  ret");
        Ok(())
    }
}
