use super::{allowed_functions, evaluate_ast, evaluate_expression, Arity, Environment, EvalError, ExpressionError};
use crate::parser::{parse_expression, ParseError};

fn eval(expression: &str) -> Result<f64, ExpressionError> {
    evaluate_expression(expression, &Environment::new())
}

fn env(pairs: &[(&str, f64)]) -> Environment {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

#[test]
fn evaluates_arithmetic_expression() {
    assert_eq!(eval("2 + 3 * 4").expect("eval"), 14.0);
    assert_eq!(eval("(2 + 3) * 4").expect("eval"), 20.0);
    assert_eq!(eval("7 / 2").expect("eval"), 3.5);
    assert_eq!(eval("-7 // 2").expect("eval"), -4.0);
    assert_eq!(eval("-7 % 2").expect("eval"), 1.0);
    assert_eq!(eval("7 % -2").expect("eval"), -1.0);
}

#[test]
fn evaluates_variables_and_functions() {
    let value = evaluate_expression("2 + 3*x - sqrt(y)", &env(&[("x", 4.0), ("y", 9.0)]))
        .expect("eval");
    assert_eq!(value, 11.0);
}

#[test]
fn power_semantics() {
    assert_eq!(eval("2 ** 3 ** 2").expect("eval"), 512.0);
    assert_eq!(eval("-2 ** 2").expect("eval"), -4.0);
    assert_eq!(eval("2 ** -1").expect("eval"), 0.5);
    assert_eq!(eval("pow(4, 0.5)").expect("eval"), 2.0);
    assert!(eval("(-8) ** (1/3)").expect("eval").is_nan());
    assert_eq!(eval("0 ** -1").expect("eval"), f64::INFINITY);
}

#[test]
fn division_by_zero_is_distinct() {
    for expression in ["1/0", "1 // 0", "1 % 0", "1 / -0.0"] {
        assert_eq!(
            eval(expression),
            Err(ExpressionError::Eval(EvalError::DivisionByZero)),
            "{expression}"
        );
    }
}

#[test]
fn unknown_variable_is_reported_by_name() {
    assert_eq!(
        eval("z"),
        Err(ExpressionError::Eval(EvalError::UnknownVariable("z".to_string())))
    );
    assert_eq!(
        evaluate_expression("X", &env(&[("x", 1.0)])),
        Err(ExpressionError::Eval(EvalError::UnknownVariable("X".to_string())))
    );
}

#[test]
fn chained_comparisons() {
    assert_eq!(eval("1 < 2 < 3").expect("eval"), 1.0);
    assert_eq!(eval("3 < 2 < 5").expect("eval"), 0.0);
    assert_eq!(eval("1 < 3 > 2").expect("eval"), 1.0);
    assert_eq!(eval("2 == 2.0 != 3").expect("eval"), 1.0);
    assert_eq!(eval("1 <= 1 >= 2").expect("eval"), 0.0);
}

#[test]
fn comparison_chain_short_circuits() {
    assert_eq!(eval("1 < 0 < (1/0)").expect("eval"), 0.0);
    assert_eq!(eval("1 > 2 == missing").expect("eval"), 0.0);
    assert_eq!(
        eval("1 < 2 < (1/0)"),
        Err(ExpressionError::Eval(EvalError::DivisionByZero))
    );
}

#[test]
fn binary_operands_do_not_short_circuit() {
    assert_eq!(
        eval("(1 < 0) * (1/0)"),
        Err(ExpressionError::Eval(EvalError::DivisionByZero))
    );
}

#[test]
fn whitelist_rejects_other_functions() {
    assert_eq!(
        eval("exp(1)"),
        Err(ExpressionError::Eval(EvalError::UnallowedFunction("exp".to_string())))
    );
    assert_eq!(
        eval("__import__(1)"),
        Err(ExpressionError::Eval(EvalError::UnallowedFunction("__import__".to_string())))
    );
    assert!(matches!(eval("math.sqrt(4)"), Err(ExpressionError::Syntax(_))));
    assert!(matches!(
        eval("max(x=1)"),
        Err(ExpressionError::Syntax(ParseError::KeywordArgument { .. }))
    ));
}

#[test]
fn unallowed_function_is_rejected_before_arguments_run() {
    assert_eq!(
        eval("exec(1/0)"),
        Err(ExpressionError::Eval(EvalError::UnallowedFunction("exec".to_string())))
    );
}

#[test]
fn wrong_arity_names_the_function() {
    assert_eq!(
        eval("sqrt(1, 2)"),
        Err(ExpressionError::Eval(EvalError::FunctionArity {
            name: "sqrt".to_string(),
            expected: Arity::Exactly(1),
            got: 2,
        }))
    );
    assert_eq!(
        eval("max()"),
        Err(ExpressionError::Eval(EvalError::FunctionArity {
            name: "max".to_string(),
            expected: Arity::AtLeast(1),
            got: 0,
        }))
    );
    let error = eval("round(1, 2, 3)").expect_err("must fail");
    assert_eq!(
        error.to_string(),
        "function 'round' expects 1 to 2 argument(s), got 3"
    );
}

#[test]
fn builtin_functions() {
    assert_eq!(eval("abs(-2.5)").expect("eval"), 2.5);
    assert_eq!(eval("min(3, 1, 2)").expect("eval"), 1.0);
    assert_eq!(eval("max(3, 1, 2)").expect("eval"), 3.0);
    assert_eq!(eval("min(7)").expect("eval"), 7.0);
    assert_eq!(eval("sqrt(16)").expect("eval"), 4.0);
    assert_eq!(
        eval("sqrt(-1)"),
        Err(ExpressionError::Eval(EvalError::MathDomain { function: "sqrt" }))
    );
}

#[test]
fn round_uses_bankers_rounding() {
    assert_eq!(eval("round(2.5)").expect("eval"), 2.0);
    assert_eq!(eval("round(3.5)").expect("eval"), 4.0);
    assert_eq!(eval("round(-2.5)").expect("eval"), -2.0);
    assert_eq!(eval("round(2.675, 2)").expect("eval"), 2.67);
    assert_eq!(eval("round(1234.5678, 1.9)").expect("eval"), 1234.6);
    assert_eq!(eval("round(1250, -2)").expect("eval"), 1200.0);
}

#[test]
fn round_rejects_non_finite_single_argument() {
    let env = env(&[("inf", f64::INFINITY)]);
    assert_eq!(
        evaluate_expression("round(inf)", &env),
        Err(ExpressionError::Eval(EvalError::MathDomain { function: "round" }))
    );
    assert_eq!(evaluate_expression("round(inf, 2)", &env).expect("eval"), f64::INFINITY);
}

#[test]
fn empty_expression_is_rejected_before_parsing() {
    assert_eq!(eval(""), Err(ExpressionError::Empty));
    assert_eq!(eval("   \t"), Err(ExpressionError::Empty));
}

#[test]
fn non_finite_values_are_ordinary_results() {
    let env = env(&[("big", 1e308)]);
    assert_eq!(evaluate_expression("big * 10", &env).expect("eval"), f64::INFINITY);
}

#[test]
fn repeated_evaluation_is_bit_identical() {
    let ast = parse_expression("sqrt(x) / 3 + round(x / 7, 3) ** 1.5").expect("parse");
    let env = env(&[("x", 2.0)]);
    let first = evaluate_ast(&ast, &env).expect("eval");
    let second = evaluate_ast(&ast, &env).expect("eval");
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn lists_allowed_functions_in_table_order() {
    assert_eq!(
        allowed_functions().collect::<Vec<_>>(),
        vec!["abs", "min", "max", "round", "sqrt", "pow"]
    );
}

#[test]
fn deeply_nested_text_is_rejected_as_syntax() {
    let text = format!("{}x{}", "(".repeat(1000), ")".repeat(1000));
    let error = evaluate_expression(&text, &env(&[("x", 1.0)])).expect_err("must reject");
    assert!(matches!(error, ExpressionError::Syntax(ParseError::TooDeep { .. })));
    assert!(error.to_string().starts_with("invalid expression: expression nested too deeply"));

    let sum = vec!["x"; 900].join(" + ");
    assert_eq!(evaluate_expression(&sum, &env(&[("x", 1.0)])), Ok(900.0));
}
