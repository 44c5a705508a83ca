//! Tree interpreter for compiled payoff expressions.

use super::ast::*;
use pricer_core::types::PricingError;
use std::fmt;

/// Runtime value: a scalar or a borrowed price sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Value<'a> {
    Scalar(f64),
    Sequence(&'a [f64]),
}

/// Where a value is consumed; rendered only when an error is reported.
#[derive(Debug, Clone, Copy)]
enum Context {
    Result,
    Sign,
    Operator(BinaryOp),
    Comparison,
    Indexing,
    Index,
    Call(Builtin),
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Result => write!(f, "payoff result"),
            Self::Sign => write!(f, "unary sign"),
            Self::Operator(op) => write!(f, "operator '{}'", op.symbol()),
            Self::Comparison => write!(f, "comparison"),
            Self::Indexing => write!(f, "indexing"),
            Self::Index => write!(f, "index"),
            Self::Call(function) => write!(f, "{}()", function.name()),
        }
    }
}

fn eval_error(message: impl Into<String>) -> PricingError {
    PricingError::PayoffEvaluation(message.into())
}

fn finite(value: f64, context: Context) -> Result<f64, PricingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(eval_error(format!("{context} produced a non-finite result")))
    }
}

impl<'a> Value<'a> {
    fn scalar(self, context: Context) -> Result<f64, PricingError> {
        match self {
            Value::Scalar(x) => Ok(x),
            Value::Sequence(_) => Err(eval_error(format!(
                "{context} expects a number, not a sequence"
            ))),
        }
    }

    fn sequence(self, context: Context) -> Result<&'a [f64], PricingError> {
        match self {
            Value::Sequence(values) => Ok(values),
            Value::Scalar(_) => Err(eval_error(format!(
                "{context} expects a sequence, not a number"
            ))),
        }
    }
}

/// Evaluates `expr` against a non-empty price path.
pub fn evaluate(expr: &Expr, path: &[f64]) -> Result<f64, PricingError> {
    if path.is_empty() {
        return Err(eval_error("path is empty"));
    }
    let value = eval_expr(expr, path)?.scalar(Context::Result)?;
    finite(value, Context::Result)
}

fn eval_expr<'a>(expr: &Expr, path: &'a [f64]) -> Result<Value<'a>, PricingError> {
    match &expr.kind {
        ExprKind::Number(n) => Ok(Value::Scalar(*n)),
        ExprKind::Variable(Variable::Path) => Ok(Value::Sequence(path)),
        ExprKind::Variable(Variable::Terminal) => path
            .last()
            .copied()
            .map(Value::Scalar)
            .ok_or_else(|| eval_error("path is empty")),
        ExprKind::UndefinedName(name) => {
            Err(eval_error(format!("name '{name}' is not defined")))
        }
        ExprKind::Unary { op, operand } => {
            let x = eval_expr(operand, path)?.scalar(Context::Sign)?;
            Ok(Value::Scalar(match op {
                UnaryOp::Neg => -x,
                UnaryOp::Pos => x,
            }))
        }
        ExprKind::Binary { .. } => eval_operator_chain(expr, path),
        ExprKind::Compare { op, lhs, rhs } => {
            let a = eval_expr(lhs, path)?.scalar(Context::Comparison)?;
            let b = eval_expr(rhs, path)?.scalar(Context::Comparison)?;
            Ok(Value::Scalar(if op.apply(a, b) { 1.0 } else { 0.0 }))
        }
        ExprKind::Index { target, index } => {
            let values = eval_expr(target, path)?.sequence(Context::Indexing)?;
            let i = eval_expr(index, path)?.scalar(Context::Index)?;
            index_sequence(values, i).map(Value::Scalar)
        }
        ExprKind::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| eval_expr(arg, path))
                .collect::<Result<Vec<_>, _>>()?;
            eval_builtin(*function, &args).map(Value::Scalar)
        }
        ExprKind::UndefinedCall { name, .. } => {
            Err(eval_error(format!("function '{name}' is not defined")))
        }
    }
}

/// Folds a left-nested operator chain such as `a + b - c` without recursing
/// down its left spine, so a long chain costs one stack frame.
fn eval_operator_chain<'a>(expr: &Expr, path: &'a [f64]) -> Result<Value<'a>, PricingError> {
    let mut pending = Vec::new();
    let mut node = expr;
    while let ExprKind::Binary { op, lhs, rhs } = &node.kind {
        pending.push((*op, rhs.as_ref()));
        node = lhs.as_ref();
    }

    let mut acc = eval_expr(node, path)?;
    while let Some((op, rhs)) = pending.pop() {
        let a = acc.scalar(Context::Operator(op))?;
        let b = eval_expr(rhs, path)?.scalar(Context::Operator(op))?;
        acc = Value::Scalar(eval_binary(op, a, b)?);
    }
    Ok(acc)
}

fn eval_binary(op: BinaryOp, a: f64, b: f64) -> Result<f64, PricingError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(eval_error("division by zero"));
            }
            a / b
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(eval_error("modulo by zero"));
            }
            // result takes the sign of the divisor
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => a.powf(b),
    };
    finite(value, Context::Operator(op))
}

fn index_sequence(values: &[f64], index: f64) -> Result<f64, PricingError> {
    if index.fract() != 0.0 || !index.is_finite() {
        return Err(eval_error(format!("index {index} is not an integer")));
    }
    let len = values.len() as f64;
    let resolved = if index < 0.0 { index + len } else { index };
    if resolved < 0.0 || resolved >= len {
        return Err(eval_error(format!(
            "index {index} is out of range for a path of length {}",
            values.len()
        )));
    }
    Ok(values[resolved as usize])
}

fn eval_builtin(function: Builtin, args: &[Value<'_>]) -> Result<f64, PricingError> {
    let context = Context::Call(function);
    let value = match function {
        Builtin::Max => reduce_extremum(function, args, f64::max)?,
        Builtin::Min => reduce_extremum(function, args, f64::min)?,
        Builtin::Abs | Builtin::Fabs => unary(function, args)?.abs(),
        Builtin::Exp => unary(function, args)?.exp(),
        Builtin::Log => match args {
            [x] => positive_domain(function, x.scalar(context)?)?.ln(),
            [x, base] => {
                let x = positive_domain(function, x.scalar(context)?)?;
                let base = positive_domain(function, base.scalar(context)?)?;
                if base == 1.0 {
                    return Err(eval_error("log() base must not be 1"));
                }
                x.ln() / base.ln()
            }
            _ => return Err(arity_error(function, "1 or 2", args.len())),
        },
        Builtin::Log10 => positive_domain(function, unary(function, args)?)?.log10(),
        Builtin::Log2 => positive_domain(function, unary(function, args)?)?.log2(),
        Builtin::Sqrt => {
            let x = unary(function, args)?;
            if x < 0.0 {
                return Err(eval_error(format!("math domain error: sqrt({x})")));
            }
            x.sqrt()
        }
        Builtin::Pow => match args {
            [x, y] => x.scalar(context)?.powf(y.scalar(context)?),
            _ => return Err(arity_error(function, "2", args.len())),
        },
        Builtin::Floor => unary(function, args)?.floor(),
        Builtin::Ceil => unary(function, args)?.ceil(),
        Builtin::Sin => unary(function, args)?.sin(),
        Builtin::Cos => unary(function, args)?.cos(),
        Builtin::Tan => unary(function, args)?.tan(),
        Builtin::Tanh => unary(function, args)?.tanh(),
        Builtin::Fsum => sequence_arg(function, args)?.iter().sum(),
        Builtin::Prod => sequence_arg(function, args)?.iter().product(),
    };
    finite(value, context)
}

fn arity_error(function: Builtin, expected: &str, got: usize) -> PricingError {
    eval_error(format!(
        "{}() takes {expected} argument(s), got {got}",
        function.name()
    ))
}

fn unary(function: Builtin, args: &[Value<'_>]) -> Result<f64, PricingError> {
    match args {
        [x] => x.scalar(Context::Call(function)),
        _ => Err(arity_error(function, "1", args.len())),
    }
}

fn sequence_arg<'a>(function: Builtin, args: &[Value<'a>]) -> Result<&'a [f64], PricingError> {
    match args {
        [x] => x.sequence(Context::Call(function)),
        _ => Err(arity_error(function, "1", args.len())),
    }
}

fn positive_domain(function: Builtin, x: f64) -> Result<f64, PricingError> {
    if x <= 0.0 {
        return Err(eval_error(format!(
            "math domain error: {}({x})",
            function.name()
        )));
    }
    Ok(x)
}

/// `max`/`min`: one non-empty sequence, or two or more numbers.
fn reduce_extremum(
    function: Builtin,
    args: &[Value<'_>],
    pick: fn(f64, f64) -> f64,
) -> Result<f64, PricingError> {
    let name = function.name();
    match args {
        [] => Err(eval_error(format!("{name}() expects at least 1 argument"))),
        [Value::Sequence(values)] => values
            .iter()
            .copied()
            .reduce(pick)
            .ok_or_else(|| eval_error(format!("{name}() arg is an empty sequence"))),
        [Value::Scalar(_)] => Err(eval_error(format!(
            "{name}() expects a sequence or at least two numbers"
        ))),
        [first, rest @ ..] => {
            let context = Context::Call(function);
            rest.iter().try_fold(
                first.scalar(context)?,
                |acc, arg| -> Result<f64, PricingError> { Ok(pick(acc, arg.scalar(context)?)) },
            )
        }
    }
}
