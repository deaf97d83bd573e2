/// Parsed expression tree. Every value the tree produces is an `f64`;
/// comparisons yield 1.0 for true and 0.0 for false.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Number(f64),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<AstNode>,
    },
    Binary {
        left: Box<AstNode>,
        op: BinaryOp,
        right: Box<AstNode>,
    },
    Call {
        name: String,
        args: Vec<AstNode>,
    },
    /// `first op1 a op2 b ...`; the chain is never empty.
    Compare {
        first: Box<AstNode>,
        chain: Vec<(CompareOp, AstNode)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn holds(self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }
}
