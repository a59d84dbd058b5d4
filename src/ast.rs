//! # Abstract Syntax Tree
//!
//! Defines the data structures produced by the parser: a tagged-variant
//! `Node` for both statements and expressions, `Variable`/`Function`/
//! `Program` for the surrounding declarations, and [`add_type`], the single
//! recursive walk that fills in every expression node's [`Type`].
//!
//! `Var` nodes and `Member` accesses point into longer-lived collections
//! (`Function::locals`, `Program::globals`, a struct `Type`'s member list)
//! rather than owning what they reference — there are no true cycles here,
//! so a `Rc` handle is enough; no arena is needed.

use std::cell::Cell;
use std::rc::Rc;

use crate::lexer::token::Token;
use crate::types::Type;

/// A declared variable: a local (stack-resident, `offset` assigned post
/// parse by [`crate::offsets`]) or a global (string literals included, with
/// an optional byte-for-byte `contents` initializer).
#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub ty: Rc<Type>,
    pub is_local: bool,
    /// Stack offset in bytes, `0` until [`crate::offsets::assign`] runs.
    pub offset: Cell<usize>,
    /// Initializer bytes for globals (string literal contents); `None` for
    /// locals and zero-initialized globals.
    pub contents: Option<Vec<u8>>,
}

impl Variable {
    pub fn new_local(name: String, ty: Rc<Type>) -> Rc<Variable> {
        Rc::new(Variable { name, ty, is_local: true, offset: Cell::new(0), contents: None })
    }

    pub fn new_global(name: String, ty: Rc<Type>, contents: Option<Vec<u8>>) -> Rc<Variable> {
        Rc::new(Variable { name, ty, is_local: false, offset: Cell::new(0), contents })
    }
}

/// A function definition: ordered parameters and locals, and its body as an
/// ordered list of statement nodes.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<Rc<Variable>>,
    pub body: Vec<Node>,
    pub locals: Vec<Rc<Variable>>,
    /// `align_to(sum of local sizes, 8)`, assigned post-parse.
    pub stack_size: Cell<usize>,
}

/// A whole compilation unit: file-scope globals (including anonymous
/// string-literal globals introduced while parsing) plus all functions.
#[derive(Debug, Default)]
pub struct Program {
    pub globals: Vec<Rc<Variable>>,
    pub functions: Vec<Function>,
}

/// One AST node, covering both statements and expressions. Every node keeps
/// its representative token for diagnostics; `ty` is filled by [`add_type`]
/// once the node's children are known.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub token: Token,
    pub ty: Option<Rc<Type>>,
}

#[derive(Debug)]
pub enum NodeKind {
    // Arithmetic on integers.
    Add { lhs: Box<Node>, rhs: Box<Node> },
    Sub { lhs: Box<Node>, rhs: Box<Node> },
    Mul { lhs: Box<Node>, rhs: Box<Node> },
    Div { lhs: Box<Node>, rhs: Box<Node> },
    // Pointer-aware arithmetic; codegen assumes the pointer operand is lhs.
    PtrAdd { lhs: Box<Node>, rhs: Box<Node> },
    PtrSub { lhs: Box<Node>, rhs: Box<Node> },
    PtrDiff { lhs: Box<Node>, rhs: Box<Node> },
    // Comparison. `>`/`>=` are desugared to `Lt`/`Le` with swapped operands.
    Eq { lhs: Box<Node>, rhs: Box<Node> },
    Ne { lhs: Box<Node>, rhs: Box<Node> },
    Lt { lhs: Box<Node>, rhs: Box<Node> },
    Le { lhs: Box<Node>, rhs: Box<Node> },
    // Memory.
    Addr { lhs: Box<Node> },
    Deref { lhs: Box<Node> },
    Member { lhs: Box<Node>, name: String, offset: usize },
    Assign { lhs: Box<Node>, rhs: Box<Node> },
    // Control.
    If { cond: Box<Node>, cons: Box<Node>, alt: Option<Box<Node>> },
    While { cond: Box<Node>, cons: Box<Node> },
    For { init: Option<Box<Node>>, cond: Option<Box<Node>>, updt: Option<Box<Node>>, cons: Box<Node> },
    Return { lhs: Box<Node> },
    Block { body: Vec<Node> },
    ExprStmt { lhs: Box<Node> },
    StmtExpr { body: Vec<Node> },
    /// A statement with no runtime effect (bare declarations, typedefs).
    Null,
    // Leaves.
    Num { val: i64 },
    Var { var: Rc<Variable> },
    Call { func_name: String, args: Vec<Node> },
}

impl Node {
    pub fn new(kind: NodeKind, token: Token) -> Node {
        Node { kind, token, ty: None }
    }

    pub fn is_array(&self) -> bool {
        matches!(&self.ty, Some(t) if t.is_array())
    }
}

/// Fill in every node's `ty`, visiting children first. A node that already
/// carries a type (assigned directly during parsing, e.g. `Var`/`Member`
/// leaves) is left untouched, so re-running this walk on an already-typed
/// tree is a no-op.
pub fn add_type(node: &mut Node) {
    if node.ty.is_some() {
        return;
    }

    match &mut node.kind {
        NodeKind::Add { lhs, rhs }
        | NodeKind::Sub { lhs, rhs }
        | NodeKind::Mul { lhs, rhs }
        | NodeKind::Div { lhs, rhs }
        | NodeKind::Eq { lhs, rhs }
        | NodeKind::Ne { lhs, rhs }
        | NodeKind::Lt { lhs, rhs }
        | NodeKind::Le { lhs, rhs }
        | NodeKind::PtrDiff { lhs, rhs } => {
            add_type(lhs);
            add_type(rhs);
            node.ty = Some(Rc::new(Type::Int));
        }
        NodeKind::PtrAdd { lhs, rhs } | NodeKind::PtrSub { lhs, rhs } => {
            add_type(lhs);
            add_type(rhs);
            node.ty = lhs.ty.clone();
        }
        NodeKind::Assign { lhs, rhs } => {
            add_type(lhs);
            add_type(rhs);
            node.ty = lhs.ty.clone();
        }
        NodeKind::Addr { lhs } => {
            add_type(lhs);
            let base = match &lhs.ty {
                Some(t) if t.is_array() => t.base().unwrap().clone(),
                Some(t) => t.clone(),
                None => unreachable!("lhs typed by the recursive call above"),
            };
            node.ty = Some(Type::ptr_to(base));
        }
        NodeKind::Deref { lhs } => {
            add_type(lhs);
            let base = lhs.ty.as_ref().and_then(|t| t.base().cloned());
            node.ty = base;
        }
        NodeKind::Member { lhs, .. } => {
            add_type(lhs);
            // Leaf-assigned at parse time (see parser::expr::member), so this
            // branch is unreachable for well-formed trees; kept for safety.
        }
        NodeKind::If { cond, cons, alt } => {
            add_type(cond);
            add_type(cons);
            if let Some(alt) = alt {
                add_type(alt);
            }
        }
        NodeKind::While { cond, cons } => {
            add_type(cond);
            add_type(cons);
        }
        NodeKind::For { init, cond, updt, cons } => {
            if let Some(init) = init {
                add_type(init);
            }
            if let Some(cond) = cond {
                add_type(cond);
            }
            if let Some(updt) = updt {
                add_type(updt);
            }
            add_type(cons);
        }
        NodeKind::Return { lhs } => add_type(lhs),
        NodeKind::Block { body } => {
            for stmt in body.iter_mut() {
                add_type(stmt);
            }
        }
        NodeKind::StmtExpr { body } => {
            for stmt in body.iter_mut() {
                add_type(stmt);
            }
            node.ty = body.last().and_then(|n| n.ty.clone());
        }
        NodeKind::ExprStmt { lhs } => add_type(lhs),
        NodeKind::Call { args, .. } => {
            for arg in args.iter_mut() {
                add_type(arg);
            }
            node.ty = Some(Rc::new(Type::Int));
        }
        NodeKind::Num { .. } => node.ty = Some(Rc::new(Type::Int)),
        NodeKind::Var { var } => node.ty = Some(var.ty.clone()),
        NodeKind::Null => {}
    }
}
