//! Recursive-descent parser for payoff expressions.
//!
//! Precedence, lowest first: comparison, additive, multiplicative, unary
//! sign, power (right-associative, binds tighter than a leading sign on its
//! left), indexing, primary.

use super::ast::*;
use super::lexer::{compile_error, tokenize, Span, Token, TokenKind};
use pricer_core::types::PricingError;

/// Longest accepted payoff source, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 4096;

/// Deepest accepted nesting of brackets, subscripts, signs and powers.
pub const MAX_NESTING: usize = 64;

/// Parser state wrapping a token stream.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    source_len: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>, source_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            source_len,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or_else(|| self.eof_span())
    }

    fn eof_span(&self) -> Span {
        Span::new(self.source_len, self.source_len)
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<Span, PricingError> {
        match self.peek() {
            Some(tok) if &tok.kind == expected => {
                let span = tok.span;
                self.pos += 1;
                Ok(span)
            }
            Some(tok) => Err(compile_error(
                format!(
                    "expected {}, found {}",
                    expected.describe(),
                    tok.kind.describe()
                ),
                tok.span.start,
            )),
            None => Err(compile_error(
                format!("expected {}, found end of input", expected.describe()),
                self.source_len,
            )),
        }
    }

    fn enter(&mut self) -> Result<(), PricingError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(compile_error(
                format!("expression nests deeper than {MAX_NESTING} levels"),
                self.current_span().start,
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

/// Parses payoff source text into an expression tree.
pub fn parse(source: &str) -> Result<Expr, PricingError> {
    if source.len() > MAX_EXPRESSION_LEN {
        return Err(compile_error(
            format!("expression is longer than {MAX_EXPRESSION_LEN} bytes"),
            MAX_EXPRESSION_LEN,
        ));
    }

    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(compile_error("payoff expression is empty", 0));
    }

    let mut p = Parser::new(tokens, source.len());
    let expr = parse_expr(&mut p)?;

    match p.peek() {
        None => Ok(expr),
        Some(tok) if is_comparison(&tok.kind) => Err(compile_error(
            "chained comparisons are not supported",
            tok.span.start,
        )),
        Some(tok) => Err(compile_error(
            format!("unexpected {}", tok.kind.describe()),
            tok.span.start,
        )),
    }
}

fn is_comparison(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge
            | TokenKind::EqEq
            | TokenKind::Ne
    )
}

fn parse_expr(p: &mut Parser) -> Result<Expr, PricingError> {
    p.enter()?;
    let expr = parse_comparison(p)?;
    p.leave();
    Ok(expr)
}

fn parse_comparison(p: &mut Parser) -> Result<Expr, PricingError> {
    let left = parse_additive(p)?;
    let op = match p.peek_kind() {
        Some(TokenKind::Lt) => CompareOp::Lt,
        Some(TokenKind::Le) => CompareOp::Le,
        Some(TokenKind::Gt) => CompareOp::Gt,
        Some(TokenKind::Ge) => CompareOp::Ge,
        Some(TokenKind::EqEq) => CompareOp::Eq,
        Some(TokenKind::Ne) => CompareOp::Ne,
        _ => return Ok(left),
    };
    p.advance();
    let right = parse_additive(p)?;
    let span = Span::new(left.span.start, right.span.end);
    Ok(Expr {
        kind: ExprKind::Compare {
            op,
            lhs: Box::new(left),
            rhs: Box::new(right),
        },
        span,
    })
}

fn parse_additive(p: &mut Parser) -> Result<Expr, PricingError> {
    let mut left = parse_multiplicative(p)?;
    loop {
        let op = match p.peek_kind() {
            Some(TokenKind::Plus) => BinaryOp::Add,
            Some(TokenKind::Minus) => BinaryOp::Sub,
            _ => break,
        };
        p.advance();
        let right = parse_multiplicative(p)?;
        left = binary(op, left, right);
    }
    Ok(left)
}

fn parse_multiplicative(p: &mut Parser) -> Result<Expr, PricingError> {
    let mut left = parse_unary(p)?;
    loop {
        let op = match p.peek_kind() {
            Some(TokenKind::Star) => BinaryOp::Mul,
            Some(TokenKind::Slash) => BinaryOp::Div,
            Some(TokenKind::Percent) => BinaryOp::Mod,
            _ => break,
        };
        p.advance();
        let right = parse_unary(p)?;
        left = binary(op, left, right);
    }
    Ok(left)
}

fn parse_unary(p: &mut Parser) -> Result<Expr, PricingError> {
    let op = match p.peek_kind() {
        Some(TokenKind::Minus) => UnaryOp::Neg,
        Some(TokenKind::Plus) => UnaryOp::Pos,
        _ => return parse_power(p),
    };
    let span = p.current_span();
    p.advance();
    p.enter()?;
    let operand = parse_unary(p)?;
    p.leave();
    let end = operand.span.end;
    Ok(Expr {
        kind: ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        span: Span::new(span.start, end),
    })
}

fn parse_power(p: &mut Parser) -> Result<Expr, PricingError> {
    let base = parse_postfix(p)?;
    if !matches!(p.peek_kind(), Some(TokenKind::StarStar)) {
        return Ok(base);
    }
    p.advance();
    p.enter()?;
    let exponent = parse_unary(p)?;
    p.leave();
    Ok(binary(BinaryOp::Pow, base, exponent))
}

fn parse_postfix(p: &mut Parser) -> Result<Expr, PricingError> {
    let mut expr = parse_primary(p)?;
    let mut indexed = 0;
    loop {
        match p.peek_kind() {
            Some(TokenKind::LBracket) => {
                p.advance();
                // each subscript wraps the target one level deeper
                p.enter()?;
                indexed += 1;
                let index = parse_expr(p)?;
                let end = p.expect(&TokenKind::RBracket)?;
                let span = Span::new(expr.span.start, end.end);
                expr = Expr {
                    kind: ExprKind::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                };
            }
            Some(TokenKind::Dot) => {
                return Err(compile_error(
                    "attribute access is not supported",
                    p.current_span().start,
                ));
            }
            Some(TokenKind::LParen) => {
                return Err(compile_error(
                    "only named functions can be called",
                    p.current_span().start,
                ));
            }
            _ => {
                for _ in 0..indexed {
                    p.leave();
                }
                return Ok(expr);
            }
        }
    }
}

fn parse_primary(p: &mut Parser) -> Result<Expr, PricingError> {
    let span = p.current_span();
    match p.peek_kind().cloned() {
        Some(TokenKind::Number(n)) => {
            p.advance();
            Ok(Expr {
                kind: ExprKind::Number(n),
                span,
            })
        }
        Some(TokenKind::LParen) => {
            p.advance();
            let inner = parse_expr(p)?;
            let end = p.expect(&TokenKind::RParen)?;
            Ok(Expr {
                kind: inner.kind,
                span: Span::new(span.start, end.end),
            })
        }
        Some(TokenKind::Ident(name)) => {
            p.advance();
            if name == "math" && matches!(p.peek_kind(), Some(TokenKind::Dot)) {
                return parse_qualified_call(p, span);
            }
            if matches!(p.peek_kind(), Some(TokenKind::LParen)) {
                let (args, end) = parse_call_args(p)?;
                let kind = match Builtin::resolve(&name) {
                    Some(function) => ExprKind::Call { function, args },
                    None => ExprKind::UndefinedCall { name, args },
                };
                return Ok(Expr {
                    kind,
                    span: Span::new(span.start, end.end),
                });
            }
            let kind = match Variable::resolve(&name) {
                Some(variable) => ExprKind::Variable(variable),
                None => ExprKind::UndefinedName(name),
            };
            Ok(Expr { kind, span })
        }
        Some(kind) => Err(compile_error(
            format!("expected expression, found {}", kind.describe()),
            span.start,
        )),
        None => Err(compile_error(
            "expected expression, found end of input",
            span.start,
        )),
    }
}

/// Finite constants readable as `math.<name>`.
fn math_constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        "tau" => Some(std::f64::consts::TAU),
        _ => None,
    }
}

/// `math.<constant>` or `math.<name>(...)`; `math` has already been consumed.
fn parse_qualified_call(p: &mut Parser, start: Span) -> Result<Expr, PricingError> {
    p.advance();
    let name_span = p.current_span();
    let name = match p.peek_kind() {
        Some(TokenKind::Ident(name)) => name.clone(),
        _ => {
            return Err(compile_error(
                "expected a function name after 'math.'",
                name_span.start,
            ))
        }
    };
    p.advance();

    if let Some(value) = math_constant(&name) {
        return Ok(Expr {
            kind: ExprKind::Number(value),
            span: Span::new(start.start, name_span.end),
        });
    }

    let function = Builtin::resolve_qualified(&name).ok_or_else(|| {
        compile_error(
            format!("'math.{name}' is not an allowed function"),
            name_span.start,
        )
    })?;

    if !matches!(p.peek_kind(), Some(TokenKind::LParen)) {
        return Err(compile_error(
            format!("'math.{name}' must be called"),
            p.current_span().start,
        ));
    }
    let (args, end) = parse_call_args(p)?;
    Ok(Expr {
        kind: ExprKind::Call { function, args },
        span: Span::new(start.start, end.end),
    })
}

/// Parses `( expr, ... )` and returns the arguments and the closing span.
fn parse_call_args(p: &mut Parser) -> Result<(Vec<Expr>, Span), PricingError> {
    p.expect(&TokenKind::LParen)?;
    let mut args = Vec::new();
    if !matches!(p.peek_kind(), Some(TokenKind::RParen)) {
        args.push(parse_expr(p)?);
        while matches!(p.peek_kind(), Some(TokenKind::Comma)) {
            p.advance();
            args.push(parse_expr(p)?);
        }
    }
    let end = p.expect(&TokenKind::RParen)?;
    Ok((args, end))
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = Span::new(lhs.span.start, rhs.span.end);
    Expr {
        kind: ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_position(source: &str) -> usize {
        match parse(source) {
            Err(PricingError::PayoffCompile { position, .. }) => position,
            other => panic!("expected compile error for {:?}, got {:?}", source, other),
        }
    }

    fn compile_message(source: &str) -> String {
        match parse(source) {
            Err(PricingError::PayoffCompile { message, .. }) => message,
            other => panic!("expected compile error for {:?}, got {:?}", source, other),
        }
    }

    #[test]
    fn parse_vanilla_call() {
        let expr = parse("max(S - 100, 0)").unwrap();
        match expr.kind {
            ExprKind::Call { function, args } => {
                assert_eq!(function, Builtin::Max);
                assert_eq!(args.len(), 2);
                assert!(matches!(
                    args[0].kind,
                    ExprKind::Binary {
                        op: BinaryOp::Sub,
                        ..
                    }
                ));
            }
            other => panic!("expected call, got {:?}", other),
        }
        assert_eq!(expr.span, Span::new(0, 15));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("1 + 2 * 3").unwrap();
        match expr.kind {
            ExprKind::Binary { op, rhs, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(
                    rhs.kind,
                    ExprKind::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2 ** 3 ** 2").unwrap();
        match expr.kind {
            ExprKind::Binary { op, lhs, rhs } => {
                assert_eq!(op, BinaryOp::Pow);
                assert_eq!(lhs.kind, ExprKind::Number(2.0));
                assert!(matches!(
                    rhs.kind,
                    ExprKind::Binary {
                        op: BinaryOp::Pow,
                        ..
                    }
                ));
            }
            other => panic!("expected power, got {:?}", other),
        }
    }

    #[test]
    fn leading_minus_applies_after_power() {
        let expr = parse("-2 ** 2").unwrap();
        assert!(matches!(
            expr.kind,
            ExprKind::Unary {
                op: UnaryOp::Neg,
                ..
            }
        ));
    }

    #[test]
    fn names_are_resolved() {
        assert_eq!(
            parse("S").unwrap().kind,
            ExprKind::Variable(Variable::Terminal)
        );
        assert_eq!(
            parse("spot").unwrap().kind,
            ExprKind::UndefinedName("spot".to_string())
        );
        assert!(matches!(
            parse("bogus(S)").unwrap().kind,
            ExprKind::UndefinedCall { .. }
        ));
    }

    #[test]
    fn qualified_math_call() {
        match parse("math.exp(S)").unwrap().kind {
            ExprKind::Call { function, .. } => assert_eq!(function, Builtin::Exp),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn math_constants_are_number_leaves() {
        let expr = parse("math.pi").unwrap();
        assert_eq!(expr.kind, ExprKind::Number(std::f64::consts::PI));
        assert_eq!(expr.span, Span::new(0, 7));
        assert_eq!(
            parse("math.e").unwrap().kind,
            ExprKind::Number(std::f64::consts::E)
        );
        assert_eq!(
            parse("math.tau").unwrap().kind,
            ExprKind::Number(std::f64::consts::TAU)
        );
        assert_eq!(compile_position("math.pi(2)"), 7);
        assert_eq!(
            parse("pi").unwrap().kind,
            ExprKind::UndefinedName("pi".to_string())
        );
    }

    #[test]
    fn indexing_chains() {
        let expr = parse("path[0] + path[-1]").unwrap();
        match expr.kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                assert!(matches!(lhs.kind, ExprKind::Index { .. }));
                assert!(matches!(rhs.kind, ExprKind::Index { .. }));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn rejects_attribute_access() {
        assert_eq!(compile_position("S.real"), 1);
        assert_eq!(compile_position("math.inf"), 5);
        assert_eq!(compile_position("math.system(1)"), 5);
        assert_eq!(compile_position("math.exp"), 8);
        assert!(compile_message("path.__class__").contains("attribute"));
    }

    #[test]
    fn rejects_calling_expressions() {
        assert_eq!(compile_position("(S)(1)"), 3);
    }

    #[test]
    fn rejects_incomplete_input() {
        assert_eq!(compile_position(""), 0);
        assert_eq!(compile_position("   "), 0);
        assert_eq!(compile_position("max(S - 100, 0"), 14);
        assert_eq!(compile_position("S -"), 3);
        assert_eq!(compile_position("S 100"), 2);
    }

    #[test]
    fn rejects_chained_comparison() {
        assert!(compile_message("1 < S < 2").contains("chained"));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let deep = format!("{}S{}", "(".repeat(200), ")".repeat(200));
        assert!(compile_message(&deep).contains("nests deeper"));

        let signs = format!("{}S", "-".repeat(200));
        assert!(compile_message(&signs).contains("nests deeper"));
    }

    #[test]
    fn rejects_long_subscript_chains() {
        let chained = format!("path{}", "[0]".repeat(200));
        assert!(compile_message(&chained).contains("nests deeper"));
        assert!(parse("path[0][0]").is_ok());
    }

    #[test]
    fn rejects_oversized_source() {
        let long = "S + ".repeat(2000) + "S";
        assert!(compile_message(&long).contains("longer than"));
    }

    #[test]
    fn accepts_moderately_long_sums() {
        let sum = "path[0] + ".repeat(300) + "S";
        assert!(parse(&sum).is_ok());
    }
}
