//! # Expression Grammar
//!
//! `assign` through `primary`, plus the pointer-arithmetic disambiguation
//! table (`new_add`/`new_sub`), array-subscript and member-access
//! desugaring, `sizeof`, and string-literal lifting to anonymous globals.

use std::rc::Rc;

use crate::ast::{add_type, Node, NodeKind, Variable};
use crate::error::ErrorKind;
use crate::lexer::token::Token;
use crate::types::Type;

use super::scope::Binding;
use super::Parser;

impl Parser {
    pub(crate) fn expr(&mut self) -> Result<Node, crate::error::Diagnostic> {
        self.assign()
    }

    fn assign(&mut self) -> Result<Node, crate::error::Diagnostic> {
        let lhs = self.equality()?;
        if self.consume("=") {
            let tok = self.cur().clone();
            let rhs = self.assign()?;
            let mut node = Node::new(NodeKind::Assign { lhs: Box::new(lhs), rhs: Box::new(rhs) }, tok);
            add_type(&mut node);
            return Ok(node);
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Node, crate::error::Diagnostic> {
        let mut node = self.relational()?;
        loop {
            let tok = self.cur().clone();
            if self.consume("==") {
                let rhs = self.relational()?;
                node = Node::new(NodeKind::Eq { lhs: Box::new(node), rhs: Box::new(rhs) }, tok);
                add_type(&mut node);
            } else if self.consume("!=") {
                let rhs = self.relational()?;
                node = Node::new(NodeKind::Ne { lhs: Box::new(node), rhs: Box::new(rhs) }, tok);
                add_type(&mut node);
            } else {
                return Ok(node);
            }
        }
    }

    fn relational(&mut self) -> Result<Node, crate::error::Diagnostic> {
        let mut node = self.add()?;
        loop {
            let tok = self.cur().clone();
            if self.consume("<") {
                let rhs = self.add()?;
                node = Node::new(NodeKind::Lt { lhs: Box::new(node), rhs: Box::new(rhs) }, tok);
                add_type(&mut node);
            } else if self.consume("<=") {
                let rhs = self.add()?;
                node = Node::new(NodeKind::Le { lhs: Box::new(node), rhs: Box::new(rhs) }, tok);
                add_type(&mut node);
            } else if self.consume(">") {
                // Desugared: swap operands onto Lt.
                let rhs = self.add()?;
                node = Node::new(NodeKind::Lt { lhs: Box::new(rhs), rhs: Box::new(node) }, tok);
                add_type(&mut node);
            } else if self.consume(">=") {
                let rhs = self.add()?;
                node = Node::new(NodeKind::Le { lhs: Box::new(rhs), rhs: Box::new(node) }, tok);
                add_type(&mut node);
            } else {
                return Ok(node);
            }
        }
    }

    fn add(&mut self) -> Result<Node, crate::error::Diagnostic> {
        let mut node = self.mul()?;
        loop {
            let tok = self.cur().clone();
            if self.consume("+") {
                let rhs = self.mul()?;
                node = self.new_add(node, rhs, tok)?;
            } else if self.consume("-") {
                let rhs = self.mul()?;
                node = self.new_sub(node, rhs, tok)?;
            } else {
                return Ok(node);
            }
        }
    }

    /// Pointer-arithmetic disambiguation for `+`. `int + int` is plain
    /// `Add`; anything with a pointer/array operand becomes `PtrAdd` with
    /// the pointer canonicalised to `lhs`; `ptr + ptr` is invalid.
    fn new_add(&mut self, lhs: Node, rhs: Node, tok: Token) -> Result<Node, crate::error::Diagnostic> {
        let lhs_ptr = lhs.ty.as_ref().map_or(false, |t| t.is_ptr_like());
        let rhs_ptr = rhs.ty.as_ref().map_or(false, |t| t.is_ptr_like());
        let mut node = match (lhs_ptr, rhs_ptr) {
            (false, false) => Node::new(NodeKind::Add { lhs: Box::new(lhs), rhs: Box::new(rhs) }, tok),
            (false, true) => Node::new(NodeKind::PtrAdd { lhs: Box::new(rhs), rhs: Box::new(lhs) }, tok),
            (true, false) => Node::new(NodeKind::PtrAdd { lhs: Box::new(lhs), rhs: Box::new(rhs) }, tok),
            (true, true) => {
                return Err(self.err_here(ErrorKind::InvalidOperands, "invalid operands"));
            }
        };
        add_type(&mut node);
        Ok(node)
    }

    /// Pointer-arithmetic disambiguation for `-`. `ptr - ptr` is `PtrDiff`
    /// (element count); `ptr - int` is `PtrSub`; `int - ptr` is invalid.
    fn new_sub(&mut self, lhs: Node, rhs: Node, tok: Token) -> Result<Node, crate::error::Diagnostic> {
        let lhs_ptr = lhs.ty.as_ref().map_or(false, |t| t.is_ptr_like());
        let rhs_ptr = rhs.ty.as_ref().map_or(false, |t| t.is_ptr_like());
        let mut node = match (lhs_ptr, rhs_ptr) {
            (false, false) => Node::new(NodeKind::Sub { lhs: Box::new(lhs), rhs: Box::new(rhs) }, tok),
            (true, false) => Node::new(NodeKind::PtrSub { lhs: Box::new(lhs), rhs: Box::new(rhs) }, tok),
            (true, true) => Node::new(NodeKind::PtrDiff { lhs: Box::new(lhs), rhs: Box::new(rhs) }, tok),
            (false, true) => {
                return Err(self.err_here(ErrorKind::InvalidOperands, "invalid operands"));
            }
        };
        add_type(&mut node);
        Ok(node)
    }

    fn mul(&mut self) -> Result<Node, crate::error::Diagnostic> {
        let mut node = self.unary()?;
        loop {
            let tok = self.cur().clone();
            if self.consume("*") {
                let rhs = self.unary()?;
                node = Node::new(NodeKind::Mul { lhs: Box::new(node), rhs: Box::new(rhs) }, tok);
                add_type(&mut node);
            } else if self.consume("/") {
                let rhs = self.unary()?;
                node = Node::new(NodeKind::Div { lhs: Box::new(node), rhs: Box::new(rhs) }, tok);
                add_type(&mut node);
            } else {
                return Ok(node);
            }
        }
    }

    fn unary(&mut self) -> Result<Node, crate::error::Diagnostic> {
        let tok = self.cur().clone();
        if self.consume("+") {
            return self.unary();
        }
        if self.consume("-") {
            // `-x` is `0 - x`, reusing the same pointer-arithmetic path.
            let zero = Node::new(NodeKind::Num { val: 0 }, tok.clone());
            let rhs = self.unary()?;
            return self.new_sub(zero, rhs, tok);
        }
        if self.consume("&") {
            let lhs = self.unary()?;
            let mut node = Node::new(NodeKind::Addr { lhs: Box::new(lhs) }, tok);
            add_type(&mut node);
            return Ok(node);
        }
        if self.consume("*") {
            let lhs = self.unary()?;
            return self.build_deref(lhs, tok);
        }
        if self.consume("sizeof") {
            let operand = self.unary()?;
            let size = operand.ty.as_ref().map(|t| t.size() as i64).unwrap_or(0);
            return Ok(Node::new(NodeKind::Num { val: size }, tok));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Node, crate::error::Diagnostic> {
        let mut node = self.primary()?;
        loop {
            let tok = self.cur().clone();
            if self.consume("[") {
                // `x[y]` desugars to `*(x + y)`.
                let index = self.expr()?;
                self.expect("]")?;
                let added = self.new_add(node, index, tok.clone())?;
                node = self.build_deref(added, tok)?;
            } else if self.consume(".") {
                node = self.member_access(node, tok)?;
            } else if self.consume("->") {
                // `a->m` desugars to `(*a).m`.
                let deref = self.build_deref(node, tok.clone())?;
                node = self.member_access(deref, tok)?;
            } else {
                return Ok(node);
            }
        }
    }

    /// Build a `Deref` node, checking eagerly that the operand has a
    /// pointer or array type (fatal `InvalidDeref` otherwise) rather than
    /// silently leaving the result untyped.
    fn build_deref(&mut self, lhs: Node, tok: Token) -> Result<Node, crate::error::Diagnostic> {
        let base = lhs.ty.as_ref().and_then(|t| t.base().cloned());
        let base = match base {
            Some(b) => b,
            None => return Err(self.err_here(ErrorKind::InvalidDeref, "invalid pointer dereference")),
        };
        let mut node = Node::new(NodeKind::Deref { lhs: Box::new(lhs) }, tok);
        node.ty = Some(base);
        Ok(node)
    }

    fn member_access(&mut self, base: Node, tok: Token) -> Result<Node, crate::error::Diagnostic> {
        let name = self.expect_ident()?;
        let struct_ty = match &base.ty {
            Some(t) if t.members().is_some() => t.clone(),
            _ => return Err(self.err_here(ErrorKind::NotAStruct, "not a struct")),
        };
        let member = struct_ty
            .find_member(&name)
            .ok_or_else(|| self.err_here(ErrorKind::NoSuchMember, format!("no such member '{name}'")))?;
        let member_ty = member.ty.clone();
        let offset = member.offset;
        let mut node = Node::new(NodeKind::Member { lhs: Box::new(base), name, offset }, tok);
        node.ty = Some(member_ty);
        Ok(node)
    }

    fn primary(&mut self) -> Result<Node, crate::error::Diagnostic> {
        let tok = self.cur().clone();

        if self.consume("(") {
            if self.is("{") {
                return self.stmt_expr(tok);
            }
            let node = self.expr()?;
            self.expect(")")?;
            return Ok(node);
        }

        if let Some(val) = self.cur().as_number() {
            self.bump();
            return Ok(Node::new(NodeKind::Num { val }, tok));
        }

        if let Some(bytes) = self.cur().as_string_bytes().map(|b| b.to_vec()) {
            self.bump();
            return Ok(self.new_string_literal(bytes, tok));
        }

        if self.cur().is_ident() {
            let name = self.bump().lexeme;
            if self.consume("(") {
                return self.call(name, tok);
            }
            return self.var_ref(&name, tok);
        }

        Err(self.err_here(ErrorKind::ExpectedToken, "expected an expression"))
    }

    fn var_ref(&mut self, name: &str, tok: Token) -> Result<Node, crate::error::Diagnostic> {
        match self.scopes.find_var(name) {
            Some(Binding::Var(var)) => {
                let mut node = Node::new(NodeKind::Var { var: var.clone() }, tok);
                add_type(&mut node);
                Ok(node)
            }
            _ => Err(self.err_here(ErrorKind::UndefinedVariable, format!("undefined variable '{name}'"))),
        }
    }

    fn call(&mut self, func_name: String, tok: Token) -> Result<Node, crate::error::Diagnostic> {
        let mut args = Vec::new();
        if !self.is(")") {
            loop {
                args.push(self.assign()?);
                if !self.consume(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        let mut node = Node::new(NodeKind::Call { func_name, args }, tok);
        add_type(&mut node);
        Ok(node)
    }

    /// `( { stmt+ } )`. Yields the value of its last statement, which must
    /// be an `ExprStmt`; that statement is rewritten in place to expose its
    /// expression as the block's value.
    fn stmt_expr(&mut self, tok: Token) -> Result<Node, crate::error::Diagnostic> {
        self.expect("{")?;
        let mark = self.scopes.mark();
        let mut body = Vec::new();
        while !self.consume("}") {
            body.push(self.stmt()?);
        }
        self.scopes.restore(mark);
        self.expect(")")?;

        match body.last() {
            Some(n) if matches!(n.kind, NodeKind::ExprStmt { .. }) => {}
            _ => return Err(self.err_here(ErrorKind::VoidStmtExpr, "statement expression returning void")),
        }

        // Expose the last ExprStmt's inner expression as the block's value.
        if let Some(NodeKind::ExprStmt { lhs }) = body.pop().map(|n| n.kind) {
            body.push(*lhs);
        }

        let mut node = Node::new(NodeKind::StmtExpr { body }, tok);
        add_type(&mut node);
        Ok(node)
    }

    fn new_string_literal(&mut self, bytes: Vec<u8>, tok: Token) -> Node {
        let name = format!(".L.data.{}", self.string_lit_count);
        self.string_lit_count += 1;
        let ty = Type::array_of(Rc::new(Type::Char), bytes.len());
        let var = Variable::new_global(name.clone(), ty, Some(bytes));
        self.scopes.push_var(name, var.clone());
        self.add_global(var.clone());
        let mut node = Node::new(NodeKind::Var { var }, tok);
        add_type(&mut node);
        node
    }
}
