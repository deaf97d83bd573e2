use crate::ast::{AstNode, BinaryOp, CompareOp, UnaryOp};
use crate::numeric::{floor_div, floor_mod, round_to_digits};
use crate::parser::{parse_expression, ParseError};
use std::collections::BTreeMap;
use std::fmt;

/// Variable bindings visible to a single evaluation.
pub type Environment = BTreeMap<String, f64>;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("function '{0}' is not allowed")]
    UnallowedFunction(String),
    #[error("function '{name}' expects {expected} argument(s), got {got}")]
    FunctionArity {
        name: String,
        expected: Arity,
        got: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("math domain error in '{function}'")]
    MathDomain { function: &'static str },
}

/// Failure at the text boundary: empty input, bad syntax, or a failed
/// evaluation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,
    #[error("invalid expression: {0}")]
    Syntax(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ExpressionError {
    pub fn eval_error(&self) -> Option<&EvalError> {
        match self {
            ExpressionError::Eval(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(expected) => count == expected,
            Arity::AtLeast(min) => count >= min,
            Arity::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(expected) => write!(f, "{expected}"),
            Arity::AtLeast(min) => write!(f, "at least {min}"),
            Arity::Between(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

struct Builtin {
    name: &'static str,
    arity: Arity,
    apply: fn(&[f64]) -> Result<f64, EvalError>,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "abs",
        arity: Arity::Exactly(1),
        apply: builtin_abs,
    },
    Builtin {
        name: "min",
        arity: Arity::AtLeast(1),
        apply: builtin_min,
    },
    Builtin {
        name: "max",
        arity: Arity::AtLeast(1),
        apply: builtin_max,
    },
    Builtin {
        name: "round",
        arity: Arity::Between(1, 2),
        apply: builtin_round,
    },
    Builtin {
        name: "sqrt",
        arity: Arity::Exactly(1),
        apply: builtin_sqrt,
    },
    Builtin {
        name: "pow",
        arity: Arity::Exactly(2),
        apply: builtin_pow,
    },
];

/// Names callable from expressions, in table order.
pub fn allowed_functions() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| builtin.name)
}

/// Parses and evaluates `expression` in one step. Blank input is rejected
/// before the parser runs.
pub fn evaluate_expression(expression: &str, env: &Environment) -> Result<f64, ExpressionError> {
    if expression.trim().is_empty() {
        return Err(ExpressionError::Empty);
    }
    let ast = parse_expression(expression)?;
    Ok(evaluate_ast(&ast, env)?)
}

pub fn evaluate_ast(ast: &AstNode, env: &Environment) -> Result<f64, EvalError> {
    match ast {
        AstNode::Number(value) => Ok(*value),
        AstNode::Variable(name) => env
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
        AstNode::Unary { op, operand } => {
            let value = evaluate_ast(operand, env)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Minus => -value,
            })
        }
        AstNode::Binary { left, op, right } => {
            let left = evaluate_ast(left, env)?;
            let right = evaluate_ast(right, env)?;
            evaluate_binary(left, *op, right)
        }
        AstNode::Call { name, args } => evaluate_call(name, args, env),
        AstNode::Compare { first, chain } => evaluate_compare(first, chain, env),
    }
}

fn evaluate_binary(left: f64, op: BinaryOp, right: f64) -> Result<f64, EvalError> {
    match op {
        BinaryOp::Add => Ok(left + right),
        BinaryOp::Sub => Ok(left - right),
        BinaryOp::Mul => Ok(left * right),
        BinaryOp::Pow => Ok(left.powf(right)),
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if right == 0.0 => {
            Err(EvalError::DivisionByZero)
        }
        BinaryOp::Div => Ok(left / right),
        BinaryOp::FloorDiv => Ok(floor_div(left, right)),
        BinaryOp::Mod => Ok(floor_mod(left, right)),
    }
}

// Operands after the first are evaluated only while the chain still holds,
// so `1 < 0 < 1 / 0` is 0.0 rather than a division error.
fn evaluate_compare(
    first: &AstNode,
    chain: &[(CompareOp, AstNode)],
    env: &Environment,
) -> Result<f64, EvalError> {
    let mut current = evaluate_ast(first, env)?;
    for (op, operand) in chain {
        let right = evaluate_ast(operand, env)?;
        if !op.holds(current, right) {
            return Ok(0.0);
        }
        current = right;
    }
    Ok(1.0)
}

fn evaluate_call(name: &str, args: &[AstNode], env: &Environment) -> Result<f64, EvalError> {
    let builtin = BUILTINS
        .iter()
        .find(|builtin| builtin.name == name)
        .ok_or_else(|| EvalError::UnallowedFunction(name.to_string()))?;
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(evaluate_ast(arg, env)?);
    }
    if !builtin.arity.accepts(values.len()) {
        return Err(EvalError::FunctionArity {
            name: builtin.name.to_string(),
            expected: builtin.arity,
            got: values.len(),
        });
    }
    (builtin.apply)(&values)
}

fn builtin_abs(args: &[f64]) -> Result<f64, EvalError> {
    Ok(args[0].abs())
}

fn builtin_min(args: &[f64]) -> Result<f64, EvalError> {
    Ok(args[1..]
        .iter()
        .fold(args[0], |best, &candidate| if candidate < best { candidate } else { best }))
}

fn builtin_max(args: &[f64]) -> Result<f64, EvalError> {
    Ok(args[1..]
        .iter()
        .fold(args[0], |best, &candidate| if candidate > best { candidate } else { best }))
}

fn builtin_round(args: &[f64]) -> Result<f64, EvalError> {
    match args {
        [value] => {
            if !value.is_finite() {
                return Err(EvalError::MathDomain { function: "round" });
            }
            Ok(value.round_ties_even())
        }
        [value, digits] => {
            if digits.is_nan() {
                return Err(EvalError::MathDomain { function: "round" });
            }
            // Saturating cast; out-of-range digit counts are clamped later.
            Ok(round_to_digits(*value, digits.trunc() as i64))
        }
        _ => Err(EvalError::FunctionArity {
            name: "round".to_string(),
            expected: Arity::Between(1, 2),
            got: args.len(),
        }),
    }
}

fn builtin_sqrt(args: &[f64]) -> Result<f64, EvalError> {
    if args[0] < 0.0 {
        return Err(EvalError::MathDomain { function: "sqrt" });
    }
    Ok(args[0].sqrt())
}

fn builtin_pow(args: &[f64]) -> Result<f64, EvalError> {
    evaluate_binary(args[0], BinaryOp::Pow, args[1])
}

#[cfg(test)]
#[path = "evaluator_test.rs"]
mod tests;
