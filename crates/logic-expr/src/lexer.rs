#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
    Comma,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

/// Words that belong to general-purpose languages and would suggest
/// constructs the expression language does not have.
const RESERVED_WORDS: &[&str] = &[
    "and", "or", "not", "in", "is", "if", "else", "lambda", "True", "False", "None",
];

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },
    #[error("malformed number literal `{literal}` at {pos}")]
    MalformedNumber { literal: String, pos: usize },
    #[error("reserved word `{word}` at {pos} is not allowed")]
    ReservedWord { word: String, pos: usize },
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let mut index = 0usize;
    let mut tokens = Vec::new();

    while index < chars.len() {
        let ch = chars[index];
        if ch.is_whitespace() {
            index += 1;
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            tokens.push(consume_identifier(&chars, &mut index)?);
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && next_is_digit(&chars, index)) {
            tokens.push(consume_number(&chars, &mut index)?);
            continue;
        }

        let token = tokenize_symbol(&chars, &mut index)?;
        tokens.push(token);
        index += 1;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        pos: chars.len(),
    });

    Ok(tokens)
}

fn consume_identifier(chars: &[char], index: &mut usize) -> Result<Token, LexError> {
    let start = *index;
    *index += 1;
    while *index < chars.len() && (chars[*index].is_ascii_alphanumeric() || chars[*index] == '_') {
        *index += 1;
    }
    let lexeme: String = chars[start..*index].iter().collect();
    if RESERVED_WORDS.contains(&lexeme.as_str()) {
        return Err(LexError::ReservedWord {
            word: lexeme,
            pos: start,
        });
    }
    Ok(Token {
        kind: TokenKind::Identifier,
        lexeme,
        pos: start,
    })
}

fn consume_number(chars: &[char], index: &mut usize) -> Result<Token, LexError> {
    let start = *index;
    consume_digits(chars, index);

    if *index < chars.len() && chars[*index] == '.' {
        *index += 1;
        consume_digits(chars, index);
    }

    if *index < chars.len() && matches!(chars[*index], 'e' | 'E') {
        *index += 1;
        if *index < chars.len() && matches!(chars[*index], '+' | '-') {
            *index += 1;
        }
        let exponent_start = *index;
        consume_digits(chars, index);
        if *index == exponent_start {
            return Err(LexError::MalformedNumber {
                literal: chars[start..*index].iter().collect(),
                pos: start,
            });
        }
    }

    let lexeme: String = chars[start..*index].iter().collect();
    Ok(Token {
        kind: TokenKind::Number,
        lexeme,
        pos: start,
    })
}

fn consume_digits(chars: &[char], index: &mut usize) {
    while *index < chars.len() && chars[*index].is_ascii_digit() {
        *index += 1;
    }
}

fn tokenize_symbol(chars: &[char], index: &mut usize) -> Result<Token, LexError> {
    let ch = chars[*index];
    let pos = *index;
    if let Some(token) = two_char_op(chars, index, ch, pos) {
        return Ok(token);
    }
    one_char_op(ch, pos).ok_or(LexError::UnexpectedCharacter { ch, pos })
}

fn simple(kind: TokenKind, ch: char, pos: usize) -> Token {
    Token {
        kind,
        lexeme: ch.to_string(),
        pos,
    }
}

fn token_pair(kind: TokenKind, lexeme: &str, pos: usize) -> Token {
    Token {
        kind,
        lexeme: lexeme.to_string(),
        pos,
    }
}

fn two_char_op(chars: &[char], index: &mut usize, ch: char, pos: usize) -> Option<Token> {
    let (kind, lexeme) = match ch {
        '*' if matches_next(chars, pos, '*') => (TokenKind::DoubleStar, "**"),
        '/' if matches_next(chars, pos, '/') => (TokenKind::DoubleSlash, "//"),
        '!' if matches_next(chars, pos, '=') => (TokenKind::NotEq, "!="),
        '=' if matches_next(chars, pos, '=') => (TokenKind::EqEq, "=="),
        '<' if matches_next(chars, pos, '=') => (TokenKind::Le, "<="),
        '>' if matches_next(chars, pos, '=') => (TokenKind::Ge, ">="),
        _ => return None,
    };
    *index += 1;
    Some(token_pair(kind, lexeme, pos))
}

fn one_char_op(ch: char, pos: usize) -> Option<Token> {
    let kind = match ch {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        ',' => TokenKind::Comma,
        '=' => TokenKind::Assign,
        '<' => TokenKind::Lt,
        '>' => TokenKind::Gt,
        _ => return None,
    };
    Some(simple(kind, ch, pos))
}

fn matches_next(chars: &[char], index: usize, expected: char) -> bool {
    chars.get(index + 1).copied() == Some(expected)
}

fn next_is_digit(chars: &[char], index: usize) -> bool {
    chars.get(index + 1).is_some_and(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
#[path = "lexer_test.rs"]
mod tests;
