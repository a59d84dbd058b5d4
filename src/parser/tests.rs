use crate::ast::NodeKind;
use crate::error::ErrorKind;
use crate::lexer::tokenize;
use crate::parser::parse;

fn parse_ok(src: &str) -> crate::ast::Program {
    let tokens = tokenize(src).expect("lex");
    parse(tokens).expect("parse")
}

fn parse_err(src: &str) -> ErrorKind {
    let tokens = tokenize(src).expect("lex");
    parse(tokens).unwrap_err().kind
}

#[test]
fn parses_a_trivial_main() {
    let prog = parse_ok("int main(){ return 0; }\n");
    assert_eq!(prog.functions.len(), 1);
    assert_eq!(prog.functions[0].name, "main");
}

#[test]
fn local_declarations_assign_values_and_register_locals() {
    let prog = parse_ok("int main(){ int a=3; int b=5*6-8; return a+b/2; }\n");
    let f = &prog.functions[0];
    assert_eq!(f.locals.len(), 2);
    assert_eq!(f.locals[0].name, "a");
    assert_eq!(f.locals[1].name, "b");
}

#[test]
fn array_subscript_desugars_to_deref_of_pointer_add() {
    let prog = parse_ok("int main(){ int a[3]; *a=1; return a[0]; }\n");
    let f = &prog.functions[0];
    let last = f.body.last().unwrap();
    match &last.kind {
        NodeKind::Return { lhs } => match &lhs.kind {
            NodeKind::Deref { lhs } => assert!(matches!(lhs.kind, NodeKind::PtrAdd { .. })),
            other => panic!("expected Deref, got {other:?}"),
        },
        other => panic!("expected Return, got {other:?}"),
    }
}

#[test]
fn function_call_arguments_parse_in_order() {
    let prog = parse_ok("int add(int x,int y){ return x+y; } int main(){ return add(3,4); }\n");
    assert_eq!(prog.functions.len(), 2);
    let main = prog.functions.iter().find(|f| f.name == "main").unwrap();
    match &main.body[0].kind {
        NodeKind::Return { lhs } => match &lhs.kind {
            NodeKind::Call { func_name, args } => {
                assert_eq!(func_name, "add");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected Call, got {other:?}"),
        },
        other => panic!("expected Return, got {other:?}"),
    }
}

#[test]
fn struct_member_access_resolves_offsets() {
    let prog = parse_ok("struct P{ int x; char y; }; int main(){ struct P p; p.x=10; return p.x; }\n");
    let f = &prog.functions[0];
    // p.x=10 is the second local statement; find the Assign's lhs Member offset.
    let assign_stmt = &f.body[1];
    match &assign_stmt.kind {
        NodeKind::ExprStmt { lhs } => match &lhs.kind {
            NodeKind::Assign { lhs, .. } => match &lhs.kind {
                NodeKind::Member { offset, name, .. } => {
                    assert_eq!(name, "x");
                    assert_eq!(*offset, 0);
                }
                other => panic!("expected Member, got {other:?}"),
            },
            other => panic!("expected Assign, got {other:?}"),
        },
        other => panic!("expected ExprStmt, got {other:?}"),
    }
}

#[test]
fn arrow_desugars_to_deref_then_member() {
    let prog = parse_ok(
        "struct P{ int x; }; int main(){ struct P p; struct P *q; q=&p; q->x=5; return q->x; }\n",
    );
    let f = &prog.functions[0];
    let last = f.body.last().unwrap();
    match &last.kind {
        NodeKind::Return { lhs } => assert!(matches!(lhs.kind, NodeKind::Member { .. })),
        other => panic!("expected Return, got {other:?}"),
    }
}

#[test]
fn sizeof_of_sizeof_is_eight() {
    let prog = parse_ok("int main(){ int x; return sizeof(sizeof(x)); }\n");
    let f = &prog.functions[0];
    match &f.body[0].kind {
        NodeKind::Return { lhs } => match &lhs.kind {
            NodeKind::Num { val } => assert_eq!(*val, 8),
            other => panic!("expected Num, got {other:?}"),
        },
        other => panic!("expected Return, got {other:?}"),
    }
}

#[test]
fn string_literal_is_lifted_to_an_anonymous_global() {
    let prog = parse_ok("int main(){ char *s=\"abc\"; return s[1]; }\n");
    assert_eq!(prog.globals.len(), 1);
    assert_eq!(prog.globals[0].name, ".L.data.0");
    assert_eq!(prog.globals[0].contents.as_deref(), Some(&[b'a', b'b', b'c', 0][..]));
}

#[test]
fn if_without_else_has_no_alt_branch() {
    let prog = parse_ok("int main(){ if(1) return 1; return 0; }\n");
    match &prog.functions[0].body[0].kind {
        NodeKind::If { alt, .. } => assert!(alt.is_none()),
        other => panic!("expected If, got {other:?}"),
    }
}

#[test]
fn for_loop_permits_omitted_clauses() {
    let prog = parse_ok("int main(){ int i=0; for(;;) { i=i+1; if(i>3) return i; } }\n");
    match &prog.functions[0].body[1].kind {
        NodeKind::For { init, cond, updt, .. } => {
            assert!(init.is_none());
            assert!(cond.is_none());
            assert!(updt.is_none());
        }
        other => panic!("expected For, got {other:?}"),
    }
}

#[test]
fn struct_equal_to_unknown_tag_is_fatal() {
    assert_eq!(parse_err("int main(){ struct Unknown s; return 0; }\n"), ErrorKind::UnknownTag);
}

#[test]
fn reference_to_undeclared_identifier_is_fatal() {
    assert_eq!(parse_err("int main(){ return undeclared; }\n"), ErrorKind::UndefinedVariable);
}

#[test]
fn missing_semicolon_is_fatal() {
    assert_eq!(parse_err("int main(){ return 0 }\n"), ErrorKind::ExpectedToken);
}

#[test]
fn typedef_introduces_a_usable_type_name() {
    let prog = parse_ok("typedef int myint; int f(){ myint x; x=1; return x; } int main(){ return f(); }\n");
    assert_eq!(prog.functions[0].locals.len(), 1);
}

#[test]
fn statement_expression_yields_its_last_expr_stmt_value() {
    let prog = parse_ok("int main(){ return ({ int x=3; x+1; }); }\n");
    match &prog.functions[0].body[0].kind {
        NodeKind::Return { lhs } => assert!(matches!(lhs.kind, NodeKind::StmtExpr { .. })),
        other => panic!("expected Return, got {other:?}"),
    }
}

#[test]
fn nested_block_scope_does_not_leak_sideways() {
    // `y` declared inside the if-block must not be visible afterward.
    assert_eq!(
        parse_err("int main(){ if(1){ int y=1; } return y; }\n"),
        ErrorKind::UndefinedVariable
    );
}
