//! Recursive-descent parser.
//!
//! One token of look-ahead by default. Two places need more: disambiguating
//! a component member as a property or a plain field, and disambiguating an
//! instance-body item as a binding or a nested child instance. Both go
//! through [`Parser::speculative`], which saves the cursor, runs a closure,
//! and rewinds on failure rather than committing partial AST nodes.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::types::Type;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    /// Lexes `src` in full, dropping comments, then wraps the resulting
    /// token stream.
    pub fn new(src: &str) -> PResult<Self> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer
                .next_token()
                .map_err(|e| ParseError::new(e.to_string(), String::new(), e.span()))?;
            let is_eof = tok.is_eof();
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            Err(ParseError::new(format!("expected {what}"), tok.lexeme, tok.span))
        }
    }

    fn mark(&self) -> usize {
        self.pos
    }

    fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    /// Runs `f` against the current cursor; on `Err`, rewinds as if `f` had
    /// never run, so the caller can fall through to the next alternative.
    fn speculative<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let mark = self.mark();
        let result = f(self);
        if result.is_err() {
            self.reset(mark);
        }
        result
    }

    pub fn parse_compile_unit(&mut self) -> PResult<CompileUnit> {
        let mut documents = Vec::new();
        while !self.check(TokenKind::Eof) {
            documents.push(self.parse_document()?);
        }
        Ok(CompileUnit { documents })
    }

    fn parse_document(&mut self) -> PResult<Document> {
        if self.check(TokenKind::Def) {
            self.parse_definition()
        } else if self.check(TokenKind::Identifier) {
            Ok(Document::Instance(self.parse_instance()?))
        } else {
            let tok = self.peek().clone();
            Err(ParseError::new("expected a definition or an instance", tok.lexeme, tok.span))
        }
    }

    // ---- definitions (struct / component) ----

    fn parse_definition(&mut self) -> PResult<Document> {
        let start = self.expect(TokenKind::Def, "'def'")?.span;
        let name = self.expect(TokenKind::Identifier, "a name")?.lexeme;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut fields = Vec::new();
        let mut properties = Vec::new();
        let mut methods = Vec::new();
        let mut enums = Vec::new();

        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Enum) {
                enums.push(self.parse_enum()?);
                continue;
            }
            if self.check(TokenKind::Def) {
                methods.push(self.parse_method(Some(name.clone()))?);
                continue;
            }
            match self.speculative(Self::parse_property) {
                Ok(mut prop) => {
                    prop.owner = name.clone();
                    properties.push(prop);
                }
                Err(_) => fields.push(self.parse_field()?),
            }
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.span;
        let span = start.to(end);

        if properties.is_empty() && methods.is_empty() && enums.is_empty() {
            Ok(Document::Struct(StructDecl { name, fields, span }))
        } else {
            Ok(Document::Component(ComponentDef {
                name,
                properties,
                methods,
                enums,
                property_edges: Vec::new(),
                span,
            }))
        }
    }

    fn parse_field(&mut self) -> PResult<FieldDecl> {
        let ty_start = self.peek().span;
        let ty = self.parse_type()?;
        let name_tok = self.expect(TokenKind::Identifier, "a field name")?;
        let end = self.expect(TokenKind::Semicolon, "';'")?.span;
        Ok(FieldDecl {
            name: name_tok.lexeme,
            ty,
            field_index: None,
            span: ty_start.to(end),
        })
    }

    fn parse_property(&mut self) -> PResult<PropertyDecl> {
        let ty_start = self.peek().span;
        let ty = self.parse_type()?;
        let name_tok = self.expect(TokenKind::Identifier, "a property name")?;
        self.expect(TokenKind::Colon, "':'")?;
        let init = self.parse_initializer()?;
        let end = self.expect(TokenKind::Semicolon, "';'")?.span;
        Ok(PropertyDecl {
            name: name_tok.lexeme,
            ty,
            init,
            owner: String::new(),
            field_index: None,
            span: ty_start.to(end),
        })
    }

    fn parse_enum(&mut self) -> PResult<EnumDecl> {
        let start = self.expect(TokenKind::Enum, "'enum'")?.span;
        let name = self.expect(TokenKind::Identifier, "an enum name")?.lexeme;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut constants = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let tok = self.expect(TokenKind::Identifier, "an enum constant")?;
            constants.push(EnumConstantDecl {
                name: tok.lexeme,
                value: None,
                span: tok.span,
            });
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.span;
        Ok(EnumDecl {
            name,
            constants,
            span: start.to(end),
        })
    }

    fn parse_method(&mut self, owner: Option<String>) -> PResult<MethodDecl> {
        let start = self.expect(TokenKind::Def, "'def'")?.span;
        let name = self.expect(TokenKind::Identifier, "a method name")?.lexeme;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            let ty_span = self.peek().span;
            let ty = self.parse_type()?;
            let name_tok = self.expect(TokenKind::Identifier, "a parameter name")?;
            params.push(ParamDecl {
                name: name_tok.lexeme,
                ty,
                local_index: None,
                span: ty_span.to(name_tok.span),
            });
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let mut body = self.parse_compound()?;
        synthesize_implicit_return(&mut body);
        let end = body.span;
        Ok(MethodDecl {
            name,
            return_ty: Type::Void,
            params,
            body,
            owner,
            local_count: None,
            span: start.to(end),
        })
    }

    fn parse_type(&mut self) -> PResult<Type> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::KwInt => {
                self.advance();
                Ok(Type::Int)
            }
            TokenKind::KwFloat => {
                self.advance();
                Ok(Type::Float)
            }
            TokenKind::KwString => {
                self.advance();
                Ok(Type::String)
            }
            TokenKind::KwVoid => {
                self.advance();
                Ok(Type::Void)
            }
            TokenKind::KwList => {
                self.advance();
                self.expect(TokenKind::Lt, "'<'")?;
                let elem = self.parse_type()?;
                self.expect(TokenKind::Gt, "'>'")?;
                Ok(Type::list(elem))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Type::Custom(tok.lexeme))
            }
            _ => Err(ParseError::new("expected a type", tok.lexeme, tok.span)),
        }
    }

    // ---- statements ----

    fn parse_compound(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::LBrace, "'{'")?.span;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.parse_block_item()?);
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.span;
        Ok(Stmt::new(StmtKind::Compound(stmts), start.to(end)))
    }

    /// A block item tries the statement grammar first, then falls back to a
    /// local declaration.
    fn parse_block_item(&mut self) -> PResult<Stmt> {
        match self.speculative(Self::parse_statement) {
            Ok(stmt) => Ok(stmt),
            Err(_) => self.parse_local_decl(),
        }
    }

    fn parse_local_decl(&mut self) -> PResult<Stmt> {
        let ty_span = self.peek().span;
        let ty = self.parse_type()?;
        let name_tok = self.expect(TokenKind::Identifier, "a variable name")?;
        let init = if self.check(TokenKind::Colon) {
            self.advance();
            Some(self.parse_initializer()?)
        } else {
            None
        };
        let end = self.expect(TokenKind::Semicolon, "';'")?.span;
        Ok(Stmt::new(
            StmtKind::Decl(VarDecl {
                name: name_tok.lexeme,
                ty,
                init,
                local_index: None,
                span: ty_span.to(end),
            }),
            ty_span.to(end),
        ))
    }

    fn parse_statement(&mut self) -> PResult<Stmt> {
        match self.peek().kind {
            TokenKind::LBrace => self.parse_compound(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Break => {
                let tok = self.advance();
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::new(StmtKind::Break, tok.span))
            }
            TokenKind::Continue => {
                let tok = self.advance();
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::new(StmtKind::Continue, tok.span))
            }
            TokenKind::Return => {
                let start = self.advance().span;
                let expr = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let end = self.expect(TokenKind::Semicolon, "';'")?.span;
                Ok(Stmt::new(StmtKind::Return(expr), start.to(end)))
            }
            _ => {
                let expr = self.parse_expr_or_assignment()?;
                let end = self.expect(TokenKind::Semicolon, "';'")?.span;
                let span = expr.span.to(end);
                Ok(Stmt::new(StmtKind::Expr(expr), span))
            }
        }
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::If, "'if'")?.span;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_branch = Box::new(self.parse_statement_as_block()?);
        let (else_branch, end) = if self.check(TokenKind::Else) {
            self.advance();
            let else_stmt = self.parse_statement_as_block()?;
            let end = else_stmt.span;
            (Some(Box::new(else_stmt)), end)
        } else {
            let end = then_branch.span;
            (None, end)
        };
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            start.to(end),
        ))
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::While, "'while'")?.span;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement_as_block()?);
        let end = body.span;
        Ok(Stmt::new(StmtKind::While { cond, body }, start.to(end)))
    }

    /// A loop/if body may be a bare statement or a compound block; either
    /// way it's parsed through `parse_statement` so a single statement
    /// doesn't need to be wrapped by the caller.
    fn parse_statement_as_block(&mut self) -> PResult<Stmt> {
        if self.check(TokenKind::LBrace) {
            self.parse_compound()
        } else {
            self.parse_statement()
        }
    }

    // ---- expressions ----

    fn parse_initializer(&mut self) -> PResult<Expr> {
        if self.check(TokenKind::LBrace) {
            self.parse_init_list()
        } else {
            self.parse_expr()
        }
    }

    fn parse_init_list(&mut self) -> PResult<Expr> {
        let start = self.expect(TokenKind::LBrace, "'{'")?.span;
        let mut elems = Vec::new();
        while !self.check(TokenKind::RBrace) {
            elems.push(self.parse_initializer()?);
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.span;
        Ok(Expr::new(ExprKind::InitList(elems), start.to(end)))
    }

    /// An expression-statement may be a plain expression or an assignment;
    /// assignment is not a grammar level of the precedence cascade, just a
    /// `<lvalue> = <expr>` wrapped as a binary-like node at statement level.
    fn parse_expr_or_assignment(&mut self) -> PResult<Expr> {
        let lhs = self.parse_expr()?;
        if self.check(TokenKind::Assign) {
            self.advance();
            let rhs = self.parse_expr()?;
            let span = lhs.span.to(rhs.span);
            return Ok(Expr::new(
                ExprKind::Assign {
                    target: Box::new(lhs),
                    value: Box::new(rhs),
                },
                span,
            ));
        }
        Ok(lhs)
    }

    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.check(TokenKind::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Or,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.check(TokenKind::AndAnd) {
            self.advance();
            let rhs = self.parse_equality()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::And,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_relational()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.advance().span;
            let operand = self.parse_unary()?;
            let span = start.to(operand.span);
            Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ))
        } else {
            self.parse_postfix()
        }
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek().kind {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.check(TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        if self.check(TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    let end = self.expect(TokenKind::RParen, "')'")?.span;
                    let span = expr.span.to(end);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let end = self.expect(TokenKind::RBracket, "']'")?.span;
                    let span = expr.span.to(end);
                    expr = Expr::new(
                        ExprKind::Index {
                            list: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect(TokenKind::Identifier, "a member name")?;
                    let span = expr.span.to(name.span);
                    expr = Expr::new(
                        ExprKind::Member {
                            base: Box::new(expr),
                            name: name.lexeme,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                if tok.lexeme.contains('.') {
                    let v: f32 = tok.lexeme.parse().map_err(|_| {
                        ParseError::new("invalid float literal", tok.lexeme.clone(), tok.span)
                    })?;
                    Ok(Expr::new(ExprKind::FloatLit(v), tok.span))
                } else {
                    let v: i32 = tok.lexeme.parse().map_err(|_| {
                        ParseError::new("invalid integer literal", tok.lexeme.clone(), tok.span)
                    })?;
                    Ok(Expr::new(ExprKind::IntLit(v), tok.span))
                }
            }
            TokenKind::StringLit => {
                self.advance();
                Ok(Expr::new(ExprKind::StringLit(tok.lexeme), tok.span))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::new(ExprKind::Ref(tok.lexeme), tok.span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(ParseError::new("expected an expression", tok.lexeme, tok.span)),
        }
    }

    // ---- component instances ----

    fn parse_instance(&mut self) -> PResult<ComponentInstance> {
        let name_tok = self.expect(TokenKind::Identifier, "a component name")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut bindings = Vec::new();
        let mut children = Vec::new();
        let mut explicit_id = None;
        while !self.check(TokenKind::RBrace) {
            // One token of look-ahead decides binding vs child instance
            // without consuming the leading identifier either way: both
            // alternatives start by re-reading it themselves.
            if self.peek_at(1).kind == TokenKind::LBrace {
                children.push(self.parse_instance()?);
                continue;
            }
            let prop_tok = self.expect(TokenKind::Identifier, "a property name or child component")?;
            self.expect(TokenKind::Colon, "':'")?;
            if prop_tok.lexeme == "id" {
                let id_tok = self.expect(TokenKind::Identifier, "an identifier")?;
                explicit_id = Some(id_tok.lexeme);
                continue;
            }
            let value = self.parse_initializer()?;
            let span = prop_tok.span.to(value.span);
            bindings.push(Binding {
                property: prop_tok.lexeme,
                value,
                field_index: None,
                span,
            });
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.span;
        Ok(ComponentInstance {
            component_name: name_tok.lexeme,
            explicit_id,
            bindings,
            children,
            instance_index: None,
            instance_tree_size: None,
            span: name_tok.span.to(end),
        })
    }
}

/// If a method body's top-level compound ends without a `return`, appends an
/// implicit `return;` so the emitter never falls off the end of a function.
fn synthesize_implicit_return(body: &mut Stmt) {
    if let StmtKind::Compound(stmts) = &mut body.kind {
        let needs_return = !matches!(
            stmts.last().map(|s| &s.kind),
            Some(StmtKind::Return(_))
        );
        if needs_return {
            stmts.push(Stmt::new(StmtKind::Return(None), body.span));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> CompileUnit {
        Parser::new(src).unwrap().parse_compile_unit().unwrap()
    }

    #[test]
    fn parses_struct_with_only_fields() {
        let unit = parse("def Point { int x; int y; }");
        assert!(matches!(unit.documents[0], Document::Struct(_)));
    }

    #[test]
    fn parses_component_with_properties() {
        let unit = parse("def Rect { int width: 1; int height: 2; }");
        match &unit.documents[0] {
            Document::Component(c) => assert_eq!(c.properties.len(), 2),
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn parses_instance_with_id_and_bindings() {
        let unit = parse("Rect { id: a width: 10 }");
        match &unit.documents[0] {
            Document::Instance(i) => {
                assert_eq!(i.explicit_id.as_deref(), Some("a"));
                assert_eq!(i.bindings.len(), 1);
            }
            other => panic!("expected instance, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_child_instances() {
        let unit = parse("Scene { Rect { width: 1 } Rect { width: 2 } }");
        match &unit.documents[0] {
            Document::Instance(i) => assert_eq!(i.children.len(), 2),
            other => panic!("expected instance, got {other:?}"),
        }
    }

    #[test]
    fn left_associative_arithmetic_folds_bottom_up() {
        let unit = parse("def C { int w: 3 + 4 * 2; }");
        match &unit.documents[0] {
            Document::Component(c) => {
                assert!(matches!(c.properties[0].init.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn method_body_gets_implicit_return() {
        let unit = parse("def C { def f() { int x: 1; } }");
        match &unit.documents[0] {
            Document::Component(c) => {
                if let StmtKind::Compound(stmts) = &c.methods[0].body.kind {
                    assert!(matches!(stmts.last().unwrap().kind, StmtKind::Return(None)));
                }
            }
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn init_list_only_parses_at_initializer_positions() {
        let unit = parse("def C { list<int> xs: {1, 2, 3}; }");
        match &unit.documents[0] {
            Document::Component(c) => assert!(matches!(c.properties[0].init.kind, ExprKind::InitList(_))),
            other => panic!("expected component, got {other:?}"),
        }
    }
}
