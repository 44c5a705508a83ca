//! Expression tree produced by the payoff parser.
//!
//! Names and functions are resolved while parsing: the tree refers to
//! [`Variable`] and [`Builtin`] values rather than strings, and anything the
//! language does not define is kept as an `Undefined*` node that fails when
//! evaluated.

use super::lexer::Span;

/// An expression node with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(f64),
    Variable(Variable),
    /// A name that is not in scope.
    UndefinedName(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        function: Builtin,
        args: Vec<Expr>,
    },
    /// A call to a function that is not in the allow-list.
    UndefinedCall {
        name: String,
        args: Vec<Expr>,
    },
}

/// Names bound during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// The full simulated price sequence.
    Path,
    /// The terminal price, `path[-1]`.
    Terminal,
}

impl Variable {
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "path" => Some(Self::Path),
            "S" => Some(Self::Terminal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
        }
    }
}

/// Allow-listed functions callable from a payoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Max,
    Min,
    Abs,
    Exp,
    Log,
    Log10,
    Log2,
    Sqrt,
    Pow,
    Fabs,
    Floor,
    Ceil,
    Sin,
    Cos,
    Tan,
    Tanh,
    Fsum,
    Prod,
}

impl Builtin {
    /// Resolves a bare function name.
    pub fn resolve(name: &str) -> Option<Self> {
        let builtin = match name {
            "max" => Self::Max,
            "min" => Self::Min,
            "abs" => Self::Abs,
            "exp" => Self::Exp,
            "log" => Self::Log,
            "log10" => Self::Log10,
            "log2" => Self::Log2,
            "sqrt" => Self::Sqrt,
            "pow" => Self::Pow,
            "fabs" => Self::Fabs,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "tanh" => Self::Tanh,
            "fsum" => Self::Fsum,
            "prod" => Self::Prod,
            _ => return None,
        };
        Some(builtin)
    }

    /// Resolves a name written as `math.<name>`.
    ///
    /// The Python-style reducers `max`, `min` and `abs` are not members of
    /// `math`.
    pub fn resolve_qualified(name: &str) -> Option<Self> {
        match Self::resolve(name)? {
            Self::Max | Self::Min | Self::Abs => None,
            builtin => Some(builtin),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Abs => "abs",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Log2 => "log2",
            Self::Sqrt => "sqrt",
            Self::Pow => "pow",
            Self::Fabs => "fabs",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Tanh => "tanh",
            Self::Fsum => "fsum",
            Self::Prod => "prod",
        }
    }
}
