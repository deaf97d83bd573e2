pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod numeric;
pub mod parser;
pub mod transform;

pub use ast::{AstNode, BinaryOp, CompareOp, UnaryOp};
pub use evaluator::{
    allowed_functions, evaluate_ast, evaluate_expression, Arity, Environment, EvalError, ExpressionError,
};
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use numeric::{floor_div, floor_mod, round_to_digits};
pub use parser::{parse_expression, ParseError, Parser, MAX_NESTING_DEPTH, MAX_TREE_HEIGHT};
pub use transform::{
    transform, transform_filter, transform_map, transform_sum, transform_with, Execution, TransformError,
    TransformOp, TransformOutput,
};
