use crate::ast::{AstNode, BinaryOp, CompareOp, UnaryOp};
use crate::lexer::{tokenize, LexError, Token, TokenKind};

/// Deepest nesting of parentheses, calls, signs and exponents accepted.
pub const MAX_NESTING_DEPTH: usize = 200;
/// Tallest tree accepted, counting each operator of a `+`/`*` chain as a level.
pub const MAX_TREE_HEIGHT: usize = 1000;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("unexpected token at {pos}: expected {expected}, got {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        pos: usize,
    },
    #[error("invalid number literal at {pos}: {literal}")]
    InvalidNumber { literal: String, pos: usize },
    #[error("keyword argument `{keyword}` at {pos} is not allowed in call to `{function}`")]
    KeywordArgument {
        function: String,
        keyword: String,
        pos: usize,
    },
    #[error("starred argument at {pos} is not allowed in call to `{function}`")]
    StarredArgument { function: String, pos: usize },
    #[error("expression nested too deeply at {pos}")]
    TooDeep { pos: usize },
}

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
    height: usize,
}

pub fn parse_expression(input: &str) -> Result<AstNode, ParseError> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).parse()
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let pos = tokens.last().map_or(0, |token| token.pos + token.lexeme.chars().count());
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                pos,
            });
        }
        Self {
            tokens,
            index: 0,
            depth: 0,
            height: 0,
        }
    }

    pub fn parse(mut self) -> Result<AstNode, ParseError> {
        let expression = self.parse_comparison()?;
        self.expect(TokenKind::Eof)?;
        Ok(expression)
    }

    fn parse_comparison(&mut self) -> Result<AstNode, ParseError> {
        let first = self.parse_additive()?;
        let mut chain = Vec::new();
        while let Some(op) = compare_op(self.peek().kind) {
            self.advance();
            chain.push((op, self.parse_additive()?));
        }
        if chain.is_empty() {
            return Ok(first);
        }
        Ok(AstNode::Compare {
            first: Box::new(first),
            chain,
        })
    }

    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_chain(
            |kind| match kind {
                TokenKind::Plus => Some(BinaryOp::Add),
                TokenKind::Minus => Some(BinaryOp::Sub),
                _ => None,
            },
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_chain(
            |kind| match kind {
                TokenKind::Star => Some(BinaryOp::Mul),
                TokenKind::Slash => Some(BinaryOp::Div),
                TokenKind::DoubleSlash => Some(BinaryOp::FloorDiv),
                TokenKind::Percent => Some(BinaryOp::Mod),
                _ => None,
            },
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let op = if self.match_kind(TokenKind::Plus) {
            UnaryOp::Plus
        } else if self.match_kind(TokenKind::Minus) {
            UnaryOp::Minus
        } else {
            return self.parse_power();
        };
        let operand = self.nested(Self::parse_unary)?;
        Ok(AstNode::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    // `**` binds tighter than a sign on its left but takes a signed
    // exponent on its right, so `-2 ** -1` is `-(2 ** (-1))`.
    fn parse_power(&mut self) -> Result<AstNode, ParseError> {
        let base = self.parse_primary()?;
        if !self.match_kind(TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.nested(Self::parse_unary)?;
        Ok(AstNode::Binary {
            left: Box::new(base),
            op: BinaryOp::Pow,
            right: Box::new(exponent),
        })
    }

    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number => {
                let value = token
                    .lexeme
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber {
                        literal: token.lexeme.clone(),
                        pos: token.pos,
                    })?;
                Ok(AstNode::Number(value))
            }
            TokenKind::Identifier => {
                if self.match_kind(TokenKind::LParen) {
                    let args = self.nested(|parser| parser.parse_call_args(token.lexeme.as_str()))?;
                    return Ok(AstNode::Call {
                        name: token.lexeme,
                        args,
                    });
                }
                Ok(AstNode::Variable(token.lexeme))
            }
            TokenKind::LParen => {
                let expr = self.nested(Self::parse_comparison)?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(unexpected("expression", &token)),
        }
    }

    fn parse_call_args(&mut self, function: &str) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) {
            self.reject_unsupported_argument(function)?;
            args.push(self.parse_comparison()?);
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn reject_unsupported_argument(&self, function: &str) -> Result<(), ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Star | TokenKind::DoubleStar => Err(ParseError::StarredArgument {
                function: function.to_string(),
                pos: token.pos,
            }),
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::Assign => {
                Err(ParseError::KeywordArgument {
                    function: function.to_string(),
                    keyword: token.lexeme.clone(),
                    pos: token.pos,
                })
            }
            _ => Ok(()),
        }
    }

    fn parse_binary_chain<F, G>(&mut self, matcher: F, mut parse_operand: G) -> Result<AstNode, ParseError>
    where
        F: Fn(TokenKind) -> Option<BinaryOp>,
        G: FnMut(&mut Self) -> Result<AstNode, ParseError>,
    {
        let mut node = parse_operand(self)?;
        let base_height = self.height;
        while let Some(op) = matcher(self.peek().kind) {
            // A chain folds into a left-deep tree one level per operator.
            if self.height >= MAX_TREE_HEIGHT {
                return Err(ParseError::TooDeep { pos: self.peek().pos });
            }
            self.height += 1;
            self.advance();
            let right = parse_operand(self)?;
            node = AstNode::Binary {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        self.height = base_height;
        Ok(node)
    }

    // Every recursive grammar rule goes through here, which bounds both
    // parser and evaluator recursion.
    fn nested<T, F>(&mut self, parse: F) -> Result<T, ParseError>
    where
        F: FnOnce(&mut Self) -> Result<T, ParseError>,
    {
        if self.depth >= MAX_NESTING_DEPTH || self.height >= MAX_TREE_HEIGHT {
            return Err(ParseError::TooDeep { pos: self.peek().pos });
        }
        self.depth += 1;
        self.height += 1;
        let result = parse(self);
        self.depth -= 1;
        self.height -= 1;
        result
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(describe_kind(kind), &token))
        }
    }

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }
}

fn compare_op(kind: TokenKind) -> Option<CompareOp> {
    match kind {
        TokenKind::EqEq => Some(CompareOp::Eq),
        TokenKind::NotEq => Some(CompareOp::Ne),
        TokenKind::Lt => Some(CompareOp::Lt),
        TokenKind::Le => Some(CompareOp::Le),
        TokenKind::Gt => Some(CompareOp::Gt),
        TokenKind::Ge => Some(CompareOp::Ge),
        _ => None,
    }
}

fn unexpected(expected: &str, token: &Token) -> ParseError {
    let found = match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        _ => format!("`{}`", token.lexeme),
    };
    ParseError::UnexpectedToken {
        expected: expected.to_string(),
        found,
        pos: token.pos,
    }
}

fn describe_kind(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::RParen => "`)`",
        TokenKind::Eof => "end of input",
        _ => "token",
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
