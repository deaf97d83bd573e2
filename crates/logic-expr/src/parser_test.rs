use super::{parse_expression, ParseError};
use crate::ast::{AstNode, BinaryOp, CompareOp, UnaryOp};
use crate::lexer::LexError;

fn num(value: f64) -> Box<AstNode> {
    Box::new(AstNode::Number(value))
}

#[test]
fn parses_operator_precedence() {
    let ast = parse_expression("1 + 2 * 3").expect("parse");
    let AstNode::Binary { left, op, right } = ast else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(*left, AstNode::Number(1.0));
    let AstNode::Binary { op, .. } = *right else {
        panic!("expected nested binary");
    };
    assert_eq!(op, BinaryOp::Mul);
}

#[test]
fn power_is_right_associative() {
    let ast = parse_expression("2 ** 3 ** 2").expect("parse");
    assert_eq!(
        ast,
        AstNode::Binary {
            left: num(2.0),
            op: BinaryOp::Pow,
            right: Box::new(AstNode::Binary {
                left: num(3.0),
                op: BinaryOp::Pow,
                right: num(2.0),
            }),
        }
    );
}

#[test]
fn power_binds_tighter_than_leading_minus() {
    let ast = parse_expression("-2 ** -1").expect("parse");
    assert_eq!(
        ast,
        AstNode::Unary {
            op: UnaryOp::Minus,
            operand: Box::new(AstNode::Binary {
                left: num(2.0),
                op: BinaryOp::Pow,
                right: Box::new(AstNode::Unary {
                    op: UnaryOp::Minus,
                    operand: num(1.0),
                }),
            }),
        }
    );
}

#[test]
fn chained_comparison_keeps_every_link() {
    let ast = parse_expression("a < b <= c != 4").expect("parse");
    let AstNode::Compare { first, chain } = ast else {
        panic!("expected compare");
    };
    assert_eq!(*first, AstNode::Variable("a".to_string()));
    let ops = chain.iter().map(|(op, _)| *op).collect::<Vec<_>>();
    assert_eq!(ops, vec![CompareOp::Lt, CompareOp::Le, CompareOp::Ne]);
}

#[test]
fn parses_calls_with_nested_arguments() {
    let ast = parse_expression("max(1, min(x, 2), y // 3,)").expect("parse");
    let AstNode::Call { name, args } = ast else {
        panic!("expected call");
    };
    assert_eq!(name, "max");
    assert_eq!(args.len(), 3);
    assert!(matches!(args[1], AstNode::Call { ref name, .. } if name == "min"));
    assert!(matches!(
        args[2],
        AstNode::Binary {
            op: BinaryOp::FloorDiv,
            ..
        }
    ));
}

#[test]
fn rejects_keyword_and_starred_arguments() {
    assert_eq!(
        parse_expression("round(x, ndigits=2)"),
        Err(ParseError::KeywordArgument {
            function: "round".to_string(),
            keyword: "ndigits".to_string(),
            pos: 9,
        })
    );
    assert_eq!(
        parse_expression("max(*xs)"),
        Err(ParseError::StarredArgument {
            function: "max".to_string(),
            pos: 4,
        })
    );
}

#[test]
fn rejects_trailing_input_and_assignment() {
    let error = parse_expression("1 2").expect_err("must fail");
    assert_eq!(
        error,
        ParseError::UnexpectedToken {
            expected: "end of input".to_string(),
            found: "`2`".to_string(),
            pos: 2,
        }
    );
    assert!(matches!(
        parse_expression("x = 1"),
        Err(ParseError::UnexpectedToken { .. })
    ));
    assert!(matches!(
        parse_expression("(abs)(1)"),
        Err(ParseError::UnexpectedToken { .. })
    ));
}

#[test]
fn reports_missing_operand_at_end_of_input() {
    let error = parse_expression("1 +").expect_err("must fail");
    assert_eq!(
        error.to_string(),
        "unexpected token at 3: expected expression, got end of input"
    );
}

#[test]
fn lex_errors_surface_as_parse_errors() {
    assert_eq!(
        parse_expression("os.system"),
        Err(ParseError::Lex(LexError::UnexpectedCharacter { ch: '.', pos: 2 }))
    );
}

#[test]
fn nesting_up_to_the_limit_parses() {
    let depth = super::MAX_NESTING_DEPTH;
    let text = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(parse_expression(&text).expect("parse"), AstNode::Number(1.0));
}

#[test]
fn excessive_nesting_is_a_syntax_error() {
    let text = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
    assert_eq!(
        parse_expression(&text),
        Err(ParseError::TooDeep {
            pos: super::MAX_NESTING_DEPTH + 1
        })
    );

    let signs = format!("{}1", "-".repeat(3000));
    assert!(matches!(parse_expression(&signs), Err(ParseError::TooDeep { .. })));

    let calls = format!("{}1{}", "abs(".repeat(500), ")".repeat(500));
    assert!(matches!(parse_expression(&calls), Err(ParseError::TooDeep { .. })));

    let powers = vec!["2"; 500].join("**");
    assert!(matches!(parse_expression(&powers), Err(ParseError::TooDeep { .. })));
}

#[test]
fn long_operator_chains_are_bounded() {
    let accepted = vec!["1"; 500].join("+");
    assert!(parse_expression(&accepted).is_ok());

    let rejected = vec!["1"; 5000].join("+");
    assert!(matches!(parse_expression(&rejected), Err(ParseError::TooDeep { .. })));
}

#[test]
fn parser_tolerates_token_list_without_end_marker() {
    let error = super::Parser::new(Vec::new()).parse().expect_err("empty input");
    assert_eq!(
        error,
        ParseError::UnexpectedToken {
            expected: "expression".to_string(),
            found: "end of input".to_string(),
            pos: 0,
        }
    );

    let tokens = crate::lexer::tokenize("1 + 2")
        .expect("tokens")
        .into_iter()
        .filter(|token| token.kind != crate::lexer::TokenKind::Eof)
        .collect::<Vec<_>>();
    assert!(super::Parser::new(tokens).parse().is_ok());
}
