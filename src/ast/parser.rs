//! Recursive-descent parser: tokens → [`Program`] (spec §4.2).
use log::trace;

use crate::token::{is_type_ctor_keyword, Position, Token, TokenKind};

use super::{BinaryOp, Expression, MemberProperty, Param, Program, Statement, SyntaxError};

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Recursive-descent parser over a fixed token slice.
///
/// Exposed as a pure function of its input tokens so the evaluator can
/// re-invoke it on the raw token slice stored inside a `TypeCtor` node (spec
/// §4.3, §9's "deferred sub-parse").
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

const EOF_POSITION: Position = (0, 0);

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(tokens: Vec<Token>) -> ParseResult<Program> {
        let mut parser = Parser::new(tokens);
        parser.program()
    }

    /// Parse a single expression from a raw token slice, as used by the `f`,
    /// `fobj`, `fint`, and `fstr` constructors (spec §4.3).
    pub fn parse_single_expression(tokens: Vec<Token>) -> ParseResult<Expression> {
        let mut parser = Parser::new(tokens);
        let expr = parser.expression()?;
        Ok(expr)
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_position(&self) -> Position {
        self.current().map(|t| t.position).unwrap_or(EOF_POSITION)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check_kind(&self, kind: &TokenKind) -> bool {
        self.current().map(|t| &t.kind == kind).unwrap_or(false)
    }

    fn check_identifier(&self, name: &str) -> bool {
        self.current().map(|t| t.is_identifier(name)).unwrap_or(false)
    }

    fn check_symbol(&self, op: &str) -> bool {
        self.current().map(|t| t.is_symbol(op)).unwrap_or(false)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let position = self.current_position();
        match self.current() {
            Some(token) => SyntaxError::new(
                format!("expected {expected}, found {}", token.describe()),
                position,
            ),
            None => SyntaxError::new(format!("expected {expected}, found end of input"), position),
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check_kind(&kind) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_symbol(&mut self, op: &str) -> ParseResult<Token> {
        if self.check_symbol(op) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.unexpected(&format!("'{op}'")))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<Token> {
        self.expect_kind(TokenKind::Identifier, "identifier")
    }

    fn skip_newlines(&mut self) {
        while self.check_kind(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn skip_optional_newline(&mut self) {
        if self.check_kind(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn program(&mut self) -> ParseResult<Program> {
        let mut body = vec![];
        loop {
            self.skip_newlines();
            while self.check_kind(&TokenKind::Dedent) {
                self.advance();
                self.skip_newlines();
            }
            if self.current().is_none() {
                break;
            }
            body.push(self.statement()?);
            self.skip_optional_newline();
        }
        Ok(Program { body })
    }

    fn block(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect_indent()?;
        let mut body = vec![];
        loop {
            self.skip_newlines();
            if self.check_kind(&TokenKind::Dedent) {
                self.advance();
                break;
            }
            if self.current().is_none() {
                break;
            }
            body.push(self.statement()?);
            self.skip_optional_newline();
        }
        Ok(body)
    }

    /// `expect_kind(Indent(0), ..)` only matches a literal width-0 indent, so
    /// widen the match to any `Indent(_)`.
    fn expect_indent(&mut self) -> ParseResult<Token> {
        match self.current() {
            Some(t) if matches!(t.kind, TokenKind::Indent(_)) => Ok(self.advance().unwrap()),
            _ => Err(self.unexpected("indented block")),
        }
    }

    fn statement(&mut self) -> ParseResult<Statement> {
        trace!("parsing statement at {:?}", self.current());
        let position = self.current_position();

        if self.check_identifier("import") {
            return self.import_statement();
        }
        if self.check_identifier("var") {
            return self.var_decl();
        }
        if self.check_identifier("func") {
            return self.func_decl();
        }
        if self.check_identifier("return") {
            return self.return_statement();
        }
        if self.check_identifier("if") {
            return self.if_statement();
        }
        if self.check_identifier("while") {
            return self.while_statement();
        }
        if self.check_identifier("for") {
            return self.for_statement();
        }
        if self.check_identifier("break") {
            self.advance();
            return Ok(Statement::Break { position });
        }
        if self.check_identifier("continue") {
            self.advance();
            return Ok(Statement::Continue { position });
        }

        if self.is_assignment_ahead() {
            return self.assign();
        }

        let expr = self.expression()?;
        Ok(Statement::ExprStmt { expr, position })
    }

    fn is_assignment_ahead(&self) -> bool {
        matches!(
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)),
            (Some(a), Some(b)) if a.kind == TokenKind::Identifier && b.is_symbol("=")
        )
    }

    fn var_decl(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        self.advance(); // `var`
        self.expect_kind(TokenKind::LBracket, "'['")?;
        let name = self.expect_identifier()?.text;
        self.expect_kind(TokenKind::RBracket, "']'")?;
        self.expect_symbol("=")?;
        let value = self.expression()?;
        Ok(Statement::VarDecl {
            name,
            value,
            position,
        })
    }

    fn assign(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        let name = self.expect_identifier()?.text;
        self.expect_symbol("=")?;
        let value = self.expression()?;
        Ok(Statement::Assign {
            name,
            value,
            position,
        })
    }

    fn func_decl(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        self.advance(); // `func`
        self.expect_kind(TokenKind::LBracket, "'['")?;
        let name = self.expect_identifier()?.text;
        self.expect_symbol("(")?;
        let mut params = vec![];
        if !self.check_symbol(")") {
            loop {
                params.push(self.param()?);
                if self.check_symbol(",") {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_symbol(")")?;
        self.expect_kind(TokenKind::RBracket, "']'")?;
        self.skip_optional_newline();
        let body = self.block()?;
        Ok(Statement::FuncDecl {
            name,
            params,
            body,
            position,
        })
    }

    fn param(&mut self) -> ParseResult<Param> {
        let position = self.current_position();
        if self.check_identifier("var") {
            self.advance();
            self.expect_kind(TokenKind::LBracket, "'['")?;
            let name = self.expect_identifier()?.text;
            self.expect_kind(TokenKind::RBracket, "']'")?;
            Ok(Param { name, position })
        } else {
            let name = self.expect_identifier()?.text;
            Ok(Param { name, position })
        }
    }

    fn return_statement(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        self.advance(); // `return`
        let at_terminator = matches!(
            self.current().map(|t| &t.kind),
            None | Some(TokenKind::Newline) | Some(TokenKind::Dedent)
        );
        let value = if at_terminator {
            None
        } else {
            Some(self.expression()?)
        };
        Ok(Statement::Return { value, position })
    }

    fn if_statement(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        self.advance(); // `if`
        self.expect_kind(TokenKind::LBracket, "'['")?;
        let test = self.expression()?;
        self.expect_kind(TokenKind::RBracket, "']'")?;
        self.skip_optional_newline();
        let consequent = self.block()?;

        let alternate = if self.check_identifier("else") {
            self.advance();
            self.skip_optional_newline();
            Some(self.block()?)
        } else {
            None
        };

        Ok(Statement::If {
            test,
            consequent,
            alternate,
            position,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        self.advance(); // `while`
        self.expect_kind(TokenKind::LBracket, "'['")?;
        let test = self.expression()?;
        self.expect_kind(TokenKind::RBracket, "']'")?;
        self.skip_optional_newline();
        let body = self.block()?;
        Ok(Statement::While {
            test,
            body,
            position,
        })
    }

    fn for_statement(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        self.advance(); // `for`
        self.expect_kind(TokenKind::LBracket, "'['")?;
        let init = self.for_clause()?;
        self.expect_symbol(",")?;
        let test = self.expression()?;
        self.expect_symbol(",")?;
        let update = self.for_clause()?;
        self.expect_kind(TokenKind::RBracket, "']'")?;
        self.skip_optional_newline();
        let body = self.block()?;
        Ok(Statement::For {
            init: Box::new(init),
            test,
            update: Box::new(update),
            body,
            position,
        })
    }

    /// A `for` clause is a var-decl, assignment, or bare expression, without
    /// a trailing newline (spec §4.2).
    fn for_clause(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        if self.check_identifier("var") {
            self.var_decl()
        } else if self.is_assignment_ahead() {
            self.assign()
        } else {
            let expr = self.expression()?;
            Ok(Statement::ExprStmt { expr, position })
        }
    }

    fn import_statement(&mut self) -> ParseResult<Statement> {
        let position = self.current_position();
        self.advance(); // `import`
        let mut module_name = self.expect_identifier()?.text;
        while self.check_symbol(".") {
            self.advance();
            let segment = self.expect_identifier()?.text;
            module_name.push('.');
            module_name.push_str(&segment);
        }
        Ok(Statement::Import {
            module_name,
            position,
        })
    }

    // --- expressions -----------------------------------------------------

    pub fn expression(&mut self) -> ParseResult<Expression> {
        self.comparison()
    }

    fn comparison(&mut self) -> ParseResult<Expression> {
        let mut left = self.additive()?;
        loop {
            if !self.check_kind(&TokenKind::Symbol) {
                break;
            }
            let op = match self.current().map(|t| t.text.as_str()) {
                Some("==") => BinaryOp::Eq,
                Some("!=") => BinaryOp::Neq,
                Some("<=") => BinaryOp::Le,
                Some(">=") => BinaryOp::Ge,
                Some("<") => BinaryOp::Lt,
                Some(">") => BinaryOp::Gt,
                _ => break,
            };
            let position = self.current_position();
            self.advance();
            let right = self.additive()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    /// `*` and `/` bind at the same precedence as `+` and `-`, left to
    /// right — intentional per spec §4.2/§9, not a bug to "fix".
    fn additive(&mut self) -> ParseResult<Expression> {
        let mut left = self.call_member_primary()?;
        loop {
            if !self.check_kind(&TokenKind::Symbol) {
                break;
            }
            let op = match self.current().map(|t| t.text.as_str()) {
                Some("+") => BinaryOp::Add,
                Some("-") => BinaryOp::Sub,
                Some("*") => BinaryOp::Mul,
                Some("/") => BinaryOp::Div,
                _ => break,
            };
            let position = self.current_position();
            self.advance();
            let right = self.call_member_primary()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn call_member_primary(&mut self) -> ParseResult<Expression> {
        let mut expr = self.primary()?;
        loop {
            if self.check_symbol(".") {
                let position = self.current_position();
                self.advance();
                let property = if self.check_symbol("{") {
                    self.advance();
                    let inner = self.expression()?;
                    self.expect_symbol("}")?;
                    MemberProperty::Dynamic(Box::new(inner))
                } else if self.check_kind(&TokenKind::Identifier) || self.check_kind(&TokenKind::Number) {
                    let text = self.advance().unwrap().text;
                    MemberProperty::Static(text)
                } else {
                    return Err(self.unexpected("member name after '.'"));
                };
                expr = Expression::Member {
                    object: Box::new(expr),
                    property,
                    position,
                };
                continue;
            }

            if self.check_symbol("(") {
                let position = self.current_position();
                self.advance();
                let mut args = vec![];
                if !self.check_symbol(")") {
                    loop {
                        args.push(self.expression()?);
                        if self.check_symbol(",") {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect_symbol(")")?;
                expr = Expression::Call {
                    callee: Box::new(expr),
                    args,
                    position,
                };
                continue;
            }

            if self.check_kind(&TokenKind::LBracket) {
                if let Expression::Identifier { name, .. } = &expr {
                    if is_type_ctor_keyword(name) {
                        let kind = name.clone();
                        let position = expr.position();
                        let body_tokens = self.harvest_bracket_body()?;
                        expr = Expression::TypeCtor {
                            kind,
                            body_tokens,
                            position,
                        };
                        continue;
                    }
                }
                break;
            }

            break;
        }
        Ok(expr)
    }

    /// Collect the verbatim, balanced token slice between a constructor's
    /// `[` and matching `]` (spec §3, §4.3). Nested `[...]` pairs are
    /// preserved in full so a deferred sub-parse sees a well-formed stream.
    fn harvest_bracket_body(&mut self) -> ParseResult<Vec<Token>> {
        self.expect_kind(TokenKind::LBracket, "'['")?;
        let mut depth = 1usize;
        let mut body = vec![];
        loop {
            let Some(token) = self.current().cloned() else {
                return Err(self.unexpected("']'"));
            };
            match token.kind {
                TokenKind::LBracket => {
                    depth += 1;
                    body.push(token);
                    self.advance();
                }
                TokenKind::RBracket => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                    body.push(token);
                }
                _ => {
                    body.push(token);
                    self.advance();
                }
            }
        }
        Ok(body)
    }

    fn primary(&mut self) -> ParseResult<Expression> {
        let position = self.current_position();
        if self.check_symbol("(") {
            self.advance();
            let inner = self.expression()?;
            self.expect_symbol(")")?;
            return Ok(inner);
        }
        if self.check_kind(&TokenKind::Identifier) {
            let name = self.advance().unwrap().text;
            return Ok(Expression::Identifier { name, position });
        }
        if self.check_kind(&TokenKind::Number) {
            let text = self.advance().unwrap().text;
            let value = parse_integer_text(&text);
            return Ok(Expression::Literal { value, position });
        }
        Err(self.unexpected("expression"))
    }
}

/// Parse the integer part of a lexed number token. Squared's value model has
/// no float primitive (spec §3), so a literal like `1.5` evaluates to `1` —
/// the fractional part is accepted lexically (spec §4.1's grammar) but has
/// no runtime representation.
pub fn parse_integer_text(text: &str) -> i64 {
    let integer_part = text.split('.').next().unwrap_or(text);
    integer_part.parse::<i64>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse(source: &str) -> ParseResult<Program> {
        let tokens = lex(source).unwrap();
        Parser::parse_program(tokens)
    }

    #[test]
    fn parses_var_decl_and_print() {
        let program = parse("var [x] = int[10]\nprint(x)\n").unwrap();
        assert_eq!(program.body.len(), 2);
        assert!(matches!(program.body[0], Statement::VarDecl { .. }));
        assert!(matches!(program.body[1], Statement::ExprStmt { .. }));
    }

    #[test]
    fn parses_if_else() {
        let program = parse("if [x > int[1]]\n    print(x)\nelse\n    print(y)\n").unwrap();
        assert_eq!(program.body.len(), 1);
        let Statement::If { alternate, .. } = &program.body[0] else {
            panic!("expected if");
        };
        assert!(alternate.is_some());
    }

    #[test]
    fn precedence_is_flat_left_to_right() {
        let program = parse("print(a + b * c)\n").unwrap();
        let Statement::ExprStmt { expr, .. } = &program.body[0] else {
            panic!("expected expr stmt");
        };
        let Expression::Call { args, .. } = expr else {
            panic!("expected call");
        };
        let Expression::Binary { op, left, .. } = &args[0] else {
            panic!("expected binary");
        };
        // `a + b` binds first because +/- /* share one left-to-right level.
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(**left, Expression::Identifier { .. }));
    }

    #[test]
    fn type_ctor_preserves_nested_brackets() {
        let program = parse("print(a[int[1], int[2]])\n").unwrap();
        let Statement::ExprStmt { expr, .. } = &program.body[0] else {
            panic!("expected expr stmt");
        };
        let Expression::Call { args, .. } = expr else {
            panic!("expected call");
        };
        let Expression::TypeCtor { kind, body_tokens, .. } = &args[0] else {
            panic!("expected type ctor");
        };
        assert_eq!(kind, "a");
        assert!(body_tokens.iter().any(|t| t.kind == TokenKind::LBracket));
    }

    #[test]
    fn unexpected_token_is_fatal() {
        let err = parse("var [x] =\n").unwrap_err();
        assert!(err.message.contains("expected expression"));
    }
}
