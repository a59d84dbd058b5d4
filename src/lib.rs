//! # minicc
//!
//! An ahead-of-time compiler for a strict subset of C, translating a single
//! source file into x86-64 assembly text in Intel syntax.
//!
//! ## Pipeline
//!
//! The compiler processes a source buffer through five stages, each
//! consuming its predecessor's output in full before producing its own:
//!
//! 1. **Lexer** — tokenizes the source into a token stream.
//! 2. **Parser** — recursive-descent parsing into a typed AST, resolving
//!    identifiers against lexically nested scopes as it goes.
//! 3. **Types** — canonical type constructors and the `add_type` walk
//!    (invoked by the parser as each node is built, not a separate pass).
//! 4. **Offsets** — assigns stack offsets to every function's locals.
//! 5. **Codegen** — emits x86-64 assembly under a stack discipline.
//!
//! ## Example
//!
//! ```rust,no_run
//! use minicc::{codegen, lexer, offsets, parser};
//!
//! let source = std::fs::read_to_string("program.c").unwrap();
//! let tokens = lexer::tokenize(&source).unwrap_or_else(|d| d.fatal("program.c", &source));
//! let program = parser::parse(tokens).unwrap_or_else(|d| d.fatal("program.c", &source));
//! offsets::assign(&program);
//! let asm = codegen::generate(&program).unwrap_or_else(|d| d.fatal("program.c", &source));
//! print!("{asm}");
//! ```

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod offsets;
pub mod parser;
pub mod types;
