use super::{tokenize, LexError, TokenKind};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .expect("tokenize")
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn tokenizes_composite_expression() {
    assert_eq!(
        kinds("2 ** -x // 3 >= max(a_1, .5)"),
        vec![
            TokenKind::Number,
            TokenKind::DoubleStar,
            TokenKind::Minus,
            TokenKind::Identifier,
            TokenKind::DoubleSlash,
            TokenKind::Number,
            TokenKind::Ge,
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Number,
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keeps_number_lexemes_intact() {
    let tokens = tokenize("1 2.5 3. .25 1e3 2.5E-2").expect("tokenize");
    let lexemes = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Number)
        .map(|token| token.lexeme.as_str())
        .collect::<Vec<_>>();
    assert_eq!(lexemes, vec!["1", "2.5", "3.", ".25", "1e3", "2.5E-2"]);
}

#[test]
fn rejects_attribute_access_and_subscripts() {
    assert_eq!(
        tokenize("math.pi"),
        Err(LexError::UnexpectedCharacter { ch: '.', pos: 4 })
    );
    assert_eq!(
        tokenize("xs[0]"),
        Err(LexError::UnexpectedCharacter { ch: '[', pos: 2 })
    );
}

#[test]
fn rejects_string_literals_and_reserved_words() {
    assert!(matches!(
        tokenize("'abc'"),
        Err(LexError::UnexpectedCharacter { ch: '\'', .. })
    ));
    assert_eq!(
        tokenize("x and y"),
        Err(LexError::ReservedWord {
            word: "and".to_string(),
            pos: 2,
        })
    );
    assert!(matches!(tokenize("True"), Err(LexError::ReservedWord { .. })));
}

#[test]
fn rejects_exponent_without_digits() {
    assert_eq!(
        tokenize("1e+"),
        Err(LexError::MalformedNumber {
            literal: "1e+".to_string(),
            pos: 0,
        })
    );
}

#[test]
fn lone_equals_is_an_assign_token() {
    assert_eq!(
        kinds("f(x=1)"),
        vec![
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}
