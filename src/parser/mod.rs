//! # Parser
//!
//! Recursive-descent parser that builds a typed AST directly: each
//! expression node's [`crate::ast::add_type`] call runs as soon as the node
//! is constructed, so by the time a statement is fully parsed every one of
//! its expression nodes already carries a type. Identifiers resolve against
//! two parallel scope stacks (see [`scope`]) kept as parser fields rather
//! than process-wide state.
//!
//! Unlike the teacher's assembler, which collects errors across a whole
//! source file and reports them together, this parser aborts with the first
//! diagnostic it hits — matching the specification's "first diagnostic
//! aborts" invariant.

pub mod expr;
pub mod scope;

#[cfg(test)]
mod tests;

use std::cell::Cell;
use std::rc::Rc;

use crate::ast::{add_type, Function, Node, NodeKind, Program, Variable};
use crate::error::{Diagnostic, ErrorKind};
use crate::lexer::token::Token;
use crate::types::Type;
use scope::{Binding, Scopes};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) scopes: Scopes,
    pub(crate) locals: Vec<Rc<Variable>>,
    globals: Vec<Rc<Variable>>,
    functions: Vec<Function>,
    pub(crate) string_lit_count: usize,
}

/// Parse a whole token stream (as produced by [`crate::lexer::tokenize`])
/// into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> Result<Program, Diagnostic> {
    let mut p = Parser::new(tokens);
    while !p.is_eof() {
        let base = p.basetype()?;

        // A bare tag declaration (`struct P{ ... };`) at file scope: the
        // tag is already registered as a side effect of `basetype`, and
        // there's no following variable or function to parse.
        if p.consume(";") {
            continue;
        }

        let name = p.expect_ident()?;
        if p.is("(") {
            p.function(base, name)?;
        } else {
            p.global_var(base, name)?;
        }
    }
    Ok(Program { globals: p.globals, functions: p.functions })
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            scopes: Scopes::new(),
            locals: Vec::new(),
            globals: Vec::new(),
            functions: Vec::new(),
            string_lit_count: 0,
        }
    }

    // --- cursor primitives -------------------------------------------------

    pub(crate) fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn is(&self, text: &str) -> bool {
        self.cur().is(text)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.cur().is_eof()
    }

    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        self.pos += 1;
        tok
    }

    /// Consume the current token if it's the reserved word/punctuator `text`.
    pub(crate) fn consume(&mut self, text: &str) -> bool {
        if self.is(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, text: &str) -> Result<(), Diagnostic> {
        if self.consume(text) {
            Ok(())
        } else {
            Err(self.err_here(ErrorKind::ExpectedToken, format!("expected '{text}'")))
        }
    }

    /// The diagnostic text here reproduces a copy-paste bug from the
    /// compiler this is ported from: failing to find an identifier reports
    /// "Expected an integer" rather than "Expected an identifier".
    pub(crate) fn expect_ident(&mut self) -> Result<String, Diagnostic> {
        if self.cur().is_ident() {
            Ok(self.bump().lexeme)
        } else {
            Err(self.err_here(ErrorKind::ExpectedIdent, "Expected an integer"))
        }
    }

    pub(crate) fn expect_number(&mut self) -> Result<i64, Diagnostic> {
        match self.cur().as_number() {
            Some(v) => {
                self.bump();
                Ok(v)
            }
            None => Err(self.err_here(ErrorKind::ExpectedNumber, "expected a number")),
        }
    }

    pub(crate) fn err_here(&self, kind: ErrorKind, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(kind, message, self.cur().span)
    }

    /// Registers an anonymous global (currently only lifted string literals)
    /// directly, bypassing the top-level `program()` loop since these can
    /// be introduced from anywhere inside an expression.
    pub(crate) fn add_global(&mut self, var: Rc<Variable>) {
        self.globals.push(var);
    }

    /// Whether the current token can begin a `basetype`: a builtin keyword,
    /// `struct`, or an identifier already bound to a typedef.
    pub(crate) fn is_typename(&self) -> bool {
        if self.is("char") || self.is("int") || self.is("struct") {
            return true;
        }
        self.cur().is_ident() && matches!(self.scopes.find_var(&self.cur().lexeme), Some(Binding::Typedef(_)))
    }

    // --- top-level declarations --------------------------------------------

    fn function(&mut self, _ret_ty: Rc<Type>, name: String) -> Result<(), Diagnostic> {
        self.locals.clear();
        self.expect("(")?;
        let params = self.func_params()?;
        self.expect(")")?;
        let body = self.fn_body()?;
        let locals = std::mem::take(&mut self.locals);
        self.functions.push(Function { name, params, body, locals, stack_size: Cell::new(0) });
        Ok(())
    }

    fn func_params(&mut self) -> Result<Vec<Rc<Variable>>, Diagnostic> {
        let mut params = Vec::new();
        if self.is(")") {
            return Ok(params);
        }
        loop {
            let base = self.basetype()?;
            let name = self.expect_ident()?;
            let ty = self.type_suffix(base)?;
            let var = Variable::new_local(name.clone(), ty);
            self.scopes.push_var(name, var.clone());
            self.locals.push(var.clone());
            params.push(var);
            if !self.consume(",") {
                break;
            }
        }
        Ok(params)
    }

    /// The function body block. Unlike a nested `{...}` block (see
    /// [`Self::compound_stmt`]), this one does not restore the scope stack
    /// on exit: each function starts with an empty `locals` list, but the
    /// typedef/tag bindings (and, as a faithfully-preserved quirk, any
    /// variable bindings) accumulated by earlier functions remain visible.
    fn fn_body(&mut self) -> Result<Vec<Node>, Diagnostic> {
        self.expect("{")?;
        let mut body = Vec::new();
        while !self.consume("}") {
            body.push(self.stmt()?);
        }
        Ok(body)
    }

    fn global_var(&mut self, base_ty: Rc<Type>, name: String) -> Result<(), Diagnostic> {
        let ty = self.type_suffix(base_ty)?;
        self.expect(";")?;
        let var = Variable::new_global(name.clone(), ty, None);
        self.scopes.push_var(name, var.clone());
        self.globals.push(var);
        Ok(())
    }

    // --- types --------------------------------------------------------------

    fn basetype(&mut self) -> Result<Rc<Type>, Diagnostic> {
        let mut ty = if self.consume("char") {
            Rc::new(Type::Char)
        } else if self.consume("int") {
            Rc::new(Type::Int)
        } else if self.is("struct") {
            self.struct_decl()?
        } else {
            let name = self.expect_ident()?;
            match self.scopes.find_var(&name) {
                Some(Binding::Typedef(ty)) => ty.clone(),
                _ => return Err(self.err_here(ErrorKind::UnknownType, format!("unknown type name '{name}'"))),
            }
        };
        while self.consume("*") {
            ty = Type::ptr_to(ty);
        }
        Ok(ty)
    }

    fn struct_decl(&mut self) -> Result<Rc<Type>, Diagnostic> {
        self.expect("struct")?;
        let tag = if self.cur().is_ident() { Some(self.bump().lexeme) } else { None };

        if !self.is("{") {
            let name = tag.ok_or_else(|| self.err_here(ErrorKind::UnknownTag, "expected a struct tag or body"))?;
            return self
                .scopes
                .find_tag(&name)
                .cloned()
                .ok_or_else(|| self.err_here(ErrorKind::UnknownTag, format!("unknown struct tag '{name}'")));
        }

        self.expect("{")?;
        let mut fields = Vec::new();
        while !self.consume("}") {
            let base = self.basetype()?;
            let name = self.expect_ident()?;
            let ty = self.type_suffix(base)?;
            self.expect(";")?;
            fields.push((name, ty));
        }

        let ty = Type::struct_of(fields);
        if let Some(name) = tag {
            self.scopes.push_tag(name, ty.clone());
        }
        Ok(ty)
    }

    /// `("[" num "]")*`. Suffixes nest right-to-left: `int a[2][3]` is an
    /// array of 2 arrays of 3 ints, built by recursing before wrapping.
    fn type_suffix(&mut self, base: Rc<Type>) -> Result<Rc<Type>, Diagnostic> {
        if !self.consume("[") {
            return Ok(base);
        }
        let len = self.expect_number()?;
        self.expect("]")?;
        let inner = self.type_suffix(base)?;
        Ok(Type::array_of(inner, len as usize))
    }

    // --- statements -----------------------------------------------------------

    fn stmt(&mut self) -> Result<Node, Diagnostic> {
        let tok = self.cur().clone();

        if self.consume("return") {
            let lhs = self.expr()?;
            self.expect(";")?;
            let mut node = Node::new(NodeKind::Return { lhs: Box::new(lhs) }, tok);
            add_type(&mut node);
            return Ok(node);
        }

        if self.consume("if") {
            self.expect("(")?;
            let cond = self.expr()?;
            self.expect(")")?;
            let cons = self.stmt()?;
            let alt = if self.consume("else") { Some(Box::new(self.stmt()?)) } else { None };
            let mut node = Node::new(NodeKind::If { cond: Box::new(cond), cons: Box::new(cons), alt }, tok);
            add_type(&mut node);
            return Ok(node);
        }

        if self.consume("while") {
            self.expect("(")?;
            let cond = self.expr()?;
            self.expect(")")?;
            let cons = self.stmt()?;
            let mut node = Node::new(NodeKind::While { cond: Box::new(cond), cons: Box::new(cons) }, tok);
            add_type(&mut node);
            return Ok(node);
        }

        if self.consume("for") {
            self.expect("(")?;
            let init = if !self.is(";") { Some(Box::new(self.expr_stmt()?)) } else { None };
            self.expect(";")?;
            let cond = if !self.is(";") { Some(Box::new(self.expr()?)) } else { None };
            self.expect(";")?;
            let updt = if !self.is(")") { Some(Box::new(self.expr_stmt()?)) } else { None };
            self.expect(")")?;
            let cons = Box::new(self.stmt()?);
            let mut node = Node::new(NodeKind::For { init, cond, updt, cons }, tok);
            add_type(&mut node);
            return Ok(node);
        }

        if self.is("{") {
            return self.compound_stmt();
        }

        if self.consume("typedef") {
            let base = self.basetype()?;
            let name = self.expect_ident()?;
            let ty = self.type_suffix(base)?;
            self.expect(";")?;
            self.scopes.push_typedef(name, ty);
            return Ok(Node::new(NodeKind::Null, tok));
        }

        if self.is_typename() {
            return self.declaration();
        }

        let node = self.expr_stmt()?;
        self.expect(";")?;
        Ok(node)
    }

    /// `"{" stmt* "}"`, restoring the scope stack to its pre-block state on
    /// exit. Used for nested blocks, not the function body itself.
    fn compound_stmt(&mut self) -> Result<Node, Diagnostic> {
        let tok = self.cur().clone();
        self.expect("{")?;
        let mark = self.scopes.mark();
        let mut body = Vec::new();
        while !self.consume("}") {
            body.push(self.stmt()?);
        }
        self.scopes.restore(mark);
        Ok(Node::new(NodeKind::Block { body }, tok))
    }

    fn declaration(&mut self) -> Result<Node, Diagnostic> {
        let tok = self.cur().clone();
        let base = self.basetype()?;

        // A bare tag declaration (`struct P{ ... };`) has no following
        // identifier at all; `struct_decl` already registered the tag as a
        // side effect of parsing `base`, so there's nothing left to do.
        if self.consume(";") {
            return Ok(Node::new(NodeKind::Null, tok));
        }

        let name = self.expect_ident()?;
        let ty = self.type_suffix(base)?;

        let var = Variable::new_local(name.clone(), ty);
        self.scopes.push_var(name, var.clone());
        self.locals.push(var.clone());

        if self.consume(";") {
            return Ok(Node::new(NodeKind::Null, tok));
        }

        self.expect("=")?;
        let mut lhs = Node::new(NodeKind::Var { var }, tok.clone());
        add_type(&mut lhs);
        let rhs = self.expr()?;
        self.expect(";")?;

        let mut assign = Node::new(NodeKind::Assign { lhs: Box::new(lhs), rhs: Box::new(rhs) }, tok.clone());
        add_type(&mut assign);
        Ok(Node::new(NodeKind::ExprStmt { lhs: Box::new(assign) }, tok))
    }

    pub(crate) fn expr_stmt(&mut self) -> Result<Node, Diagnostic> {
        let tok = self.cur().clone();
        let lhs = self.expr()?;
        let mut node = Node::new(NodeKind::ExprStmt { lhs: Box::new(lhs) }, tok);
        add_type(&mut node);
        Ok(node)
    }
}
