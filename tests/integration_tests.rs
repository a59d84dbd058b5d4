//! End-to-end pipeline tests: source text in, assembly text out, exercising
//! every stage (`lexer` → `parser` → `offsets` → `codegen`) together. These
//! mirror the seven scenarios in the specification's "end-to-end scenarios"
//! table; since there's no assembler/linker in this crate's scope, each
//! assertion instead pins down the handful of instructions that encode the
//! expected runtime behavior (the literal return value reaching `rax` before
//! the epilogue, the right scale factor on pointer arithmetic, and so on).

use minicc::{codegen, lexer, offsets, parser};

fn compile(src: &str) -> String {
    let tokens = lexer::tokenize(src).expect("lex");
    let program = parser::parse(tokens).expect("parse");
    offsets::assign(&program);
    codegen::generate(&program).expect("codegen")
}

fn compile_err(src: &str) -> minicc::error::ErrorKind {
    let tokens = match lexer::tokenize(src) {
        Ok(t) => t,
        Err(d) => return d.kind,
    };
    match parser::parse(tokens) {
        Ok(program) => {
            offsets::assign(&program);
            codegen::generate(&program).unwrap_err().kind
        }
        Err(d) => d.kind,
    }
}

#[test]
fn scenario_return_zero() {
    let asm = compile("int main(){ return 0; }\n");
    assert!(asm.contains("  push 0\n"));
    assert!(asm.contains(".L.return.main:\n"));
}

#[test]
fn scenario_arithmetic_with_locals() {
    // a=3, b=5*6-8=22, return a+b/2 == 3+11 == 14.
    let asm = compile("int main(){ int a=3; int b=5*6-8; return a+b/2; }\n");
    assert!(asm.contains("  imul rax, rdi\n")); // 5*6
    assert!(asm.contains("  idiv rdi\n")); // b/2
    assert!(asm.contains("  add rax, rdi\n")); // a+...
}

#[test]
fn scenario_array_indexing() {
    let asm = compile("int main(){ int a[3]; *a=1; *(a+1)=2; *(a+2)=4; return a[0]+a[1]+a[2]; }\n");
    // int is 8 bytes in this compiler, so every pointer step scales by 8.
    assert!(asm.contains("  imul rdi, 8\n"));
}

#[test]
fn scenario_function_call() {
    let asm = compile("int add(int x,int y){ return x+y; } int main(){ return add(3,4); }\n");
    assert!(asm.contains(".global add\n"));
    assert!(asm.contains(".global main\n"));
    assert!(asm.contains("  call add\n"));
}

#[test]
fn scenario_struct_member_sum() {
    let asm = compile("struct P{ int x; char y; } ; int main(){ struct P p; p.x=10; p.y=5; return p.x+p.y; }\n");
    // y is a char member: loaded and stored through the 1-byte path.
    assert!(asm.contains("  movsx rax, byte ptr [rax]\n"));
    assert!(asm.contains("  mov [rax], dil\n"));
}

#[test]
fn scenario_for_loop_accumulator() {
    let asm = compile("int main(){ int i; int s=0; for(i=0;i<10;i=i+1) s=s+i; return s; }\n");
    assert!(asm.contains(".L.begin.1:\n"));
    assert!(asm.contains("  setl al\n"));
}

#[test]
fn scenario_string_literal_indexing() {
    let asm = compile("int main(){ char *s=\"abc\"; return s[1]; }\n");
    assert!(asm.contains(".L.data.0:\n"));
    assert!(asm.contains("  .byte 97\n")); // 'a'
    assert!(asm.contains("  movsx rax, byte ptr [rax]\n"));
}

#[test]
fn struct_with_one_eight_byte_aligned_member_rounds_size_to_eight() {
    // sizeof(struct{ int x; }) == 8, reflected in the locals' frame size.
    let asm = compile("struct P{ int x; }; int main(){ struct P p; p.x=1; return sizeof(p); }\n");
    assert!(asm.contains("  push 8\n"));
}

#[test]
fn sizeof_of_sizeof_is_eight_bytes() {
    let asm = compile("int main(){ int x; return sizeof(sizeof(x)); }\n");
    assert!(asm.contains("  push 8\n"));
}

#[test]
fn if_without_else_compiles() {
    let asm = compile("int main(){ if(1) return 1; return 0; }\n");
    assert!(asm.contains(".L.end.1:\n"));
}

#[test]
fn for_with_every_clause_omitted_compiles() {
    let asm = compile("int main(){ int i=0; for(;;) { i=i+1; if(i>3) return i; } }\n");
    assert!(asm.contains(".L.begin.1:\n"));
    assert!(asm.contains(".L.end.1:\n"));
}

#[test]
fn undeclared_variable_is_a_fatal_semantic_error() {
    assert_eq!(compile_err("int main(){ return undeclared; }\n"), minicc::error::ErrorKind::UndefinedVariable);
}

#[test]
fn unterminated_string_is_a_fatal_lexical_error() {
    assert_eq!(compile_err("int main(){ char *s=\"abc; return 0; }\n"), minicc::error::ErrorKind::UnterminatedString);
}

#[test]
fn assigning_through_incompatible_pointer_plus_pointer_is_rejected() {
    assert_eq!(
        compile_err("int main(){ int a[1]; int b[1]; return (a+b)[0]; }\n"),
        minicc::error::ErrorKind::InvalidOperands
    );
}

#[test]
fn type_annotation_is_idempotent_on_an_already_typed_tree() {
    let tokens = lexer::tokenize("int main(){ int a=1; return a+2; }\n").unwrap();
    let mut program = parser::parse(tokens).unwrap();
    let before = format!("{:?}", program.functions[0].body);
    for stmt in &mut program.functions[0].body {
        minicc::ast::add_type(stmt);
    }
    let after = format!("{:?}", program.functions[0].body);
    assert_eq!(before, after);
}
