use crate::ast::AstNode;
use crate::evaluator::{evaluate_ast, Environment, EvalError, ExpressionError};
use crate::parser::parse_expression;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformOp {
    Map,
    Filter,
    Sum,
}

impl TransformOp {
    pub fn as_str(self) -> &'static str {
        match self {
            TransformOp::Map => "MAP",
            TransformOp::Filter => "FILTER",
            TransformOp::Sum => "SUM",
        }
    }

    fn produced(self) -> &'static str {
        match self {
            TransformOp::Map => "value",
            TransformOp::Filter => "predicate",
            TransformOp::Sum => "value in SUM",
        }
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformOp {
    type Err = TransformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "MAP" => Ok(TransformOp::Map),
            "FILTER" => Ok(TransformOp::Filter),
            "SUM" => Ok(TransformOp::Sum),
            other => Err(TransformError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// How elements are scheduled. Both strategies produce identical output,
/// including which error is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutput {
    Data(Vec<f64>),
    Scalar(f64),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum TransformError {
    #[error("unsupported op `{0}`")]
    UnsupportedOperation(String),
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: EvalError,
    },
    #[error("non-finite {produced} produced (NaN/Inf) at element {index}", produced = .op.produced())]
    NonFinite {
        op: TransformOp,
        index: usize,
        value: f64,
    },
    #[error("non-finite SUM total (NaN/Inf) after {count} elements")]
    NonFiniteTotal { count: usize, value: f64 },
}

impl TransformError {
    pub fn eval_error(&self) -> Option<&EvalError> {
        match self {
            TransformError::Element { source, .. } => Some(source),
            TransformError::Expression(error) => error.eval_error(),
            _ => None,
        }
    }
}

pub fn transform(
    op: TransformOp,
    data: &[f64],
    expr: &str,
    var_name: &str,
) -> Result<TransformOutput, TransformError> {
    transform_with(op, data, expr, var_name, Execution::Sequential)
}

/// Runs one transform. The expression is parsed once before any element is
/// touched; any element failure discards all accumulated output.
pub fn transform_with(
    op: TransformOp,
    data: &[f64],
    expr: &str,
    var_name: &str,
    execution: Execution,
) -> Result<TransformOutput, TransformError> {
    let values = evaluate_all(op, data, expr, var_name, execution)?;
    Ok(match op {
        TransformOp::Map => TransformOutput::Data(values),
        TransformOp::Filter => TransformOutput::Data(keep_selected(data, &values)),
        TransformOp::Sum => TransformOutput::Scalar(ordered_sum(&values)?),
    })
}

pub fn transform_map(data: &[f64], expr: &str, var_name: &str) -> Result<Vec<f64>, TransformError> {
    evaluate_all(TransformOp::Map, data, expr, var_name, Execution::Sequential)
}

pub fn transform_filter(data: &[f64], expr: &str, var_name: &str) -> Result<Vec<f64>, TransformError> {
    let keep = evaluate_all(TransformOp::Filter, data, expr, var_name, Execution::Sequential)?;
    Ok(keep_selected(data, &keep))
}

pub fn transform_sum(data: &[f64], expr: &str, var_name: &str) -> Result<f64, TransformError> {
    let terms = evaluate_all(TransformOp::Sum, data, expr, var_name, Execution::Sequential)?;
    ordered_sum(&terms)
}

fn evaluate_all(
    op: TransformOp,
    data: &[f64],
    expr: &str,
    var_name: &str,
    execution: Execution,
) -> Result<Vec<f64>, TransformError> {
    if expr.trim().is_empty() {
        return Err(ExpressionError::Empty.into());
    }
    let ast = parse_expression(expr).map_err(ExpressionError::from)?;
    evaluate_elements(op, &ast, data, var_name, execution)
}

fn keep_selected(data: &[f64], keep: &[f64]) -> Vec<f64> {
    data.iter()
        .zip(keep)
        .filter(|(_, keep)| **keep != 0.0)
        .map(|(element, _)| *element)
        .collect()
}

// Left-to-right from +0.0 so parallel and sequential runs agree bit for bit.
// Finite terms can still overflow the total.
fn ordered_sum(terms: &[f64]) -> Result<f64, TransformError> {
    let total = terms.iter().fold(0.0, |total, term| total + term);
    if !total.is_finite() {
        return Err(TransformError::NonFiniteTotal {
            count: terms.len(),
            value: total,
        });
    }
    Ok(total)
}

fn evaluate_elements(
    op: TransformOp,
    ast: &AstNode,
    data: &[f64],
    var_name: &str,
    execution: Execution,
) -> Result<Vec<f64>, TransformError> {
    let step = |(index, element): (usize, &f64)| evaluate_element(op, ast, var_name, index, *element);
    match execution {
        Execution::Sequential => data.iter().enumerate().map(step).collect(),
        Execution::Parallel => {
            // Collect every outcome first so the reported error is the one
            // at the lowest index, as in sequential order.
            let outcomes = data.par_iter().enumerate().map(step).collect::<Vec<_>>();
            outcomes.into_iter().collect()
        }
    }
}

fn evaluate_element(
    op: TransformOp,
    ast: &AstNode,
    var_name: &str,
    index: usize,
    element: f64,
) -> Result<f64, TransformError> {
    let env = Environment::from([(var_name.to_string(), element)]);
    let value = evaluate_ast(ast, &env).map_err(|source| TransformError::Element { index, source })?;
    if !value.is_finite() {
        return Err(TransformError::NonFinite { op, index, value });
    }
    Ok(value)
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
