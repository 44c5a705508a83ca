//! # Payoff Expression Language
//!
//! Compiles textual payoff descriptions such as `max(S - 100, 0)` into
//! [`PayoffFunction`]s that can be evaluated against simulated price paths.
//!
//! ## Language
//!
//! A closed, side-effect-free arithmetic language:
//!
//! - **Names**: `path` (the full price sequence) and `S` (terminal price)
//! - **Operators**: `+ - * / % **`, unary `-`/`+`, comparisons
//!   `< <= > >= == !=` (yielding `1` or `0`), indexing `path[i]` with
//!   negative indices counted from the end
//! - **Functions**: `max`, `min`, `abs`, `exp`, `log`, `log10`, `log2`,
//!   `sqrt`, `pow`, `fabs`, `floor`, `ceil`, `sin`, `cos`, `tan`, `tanh`,
//!   `fsum`, `prod`; the elementary ones may be written `math.exp(...)`
//!
//! There is no assignment, attribute access, string literal or import. Text
//! outside the grammar fails at compile time with
//! [`PricingError::PayoffCompile`]; names and functions the language does not
//! define fail when evaluated with [`PricingError::PayoffEvaluation`].
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::payoff::parse_payoff_expression;
//!
//! let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();
//! assert_eq!(payoff.evaluate(&[100.0, 105.0]).unwrap(), 5.0);
//! assert_eq!(payoff.evaluate(&[100.0, 95.0]).unwrap(), 0.0);
//!
//! let lookback = parse_payoff_expression("max(path) - path[0]").unwrap();
//! assert_eq!(lookback.evaluate(&[100.0, 120.0, 110.0]).unwrap(), 20.0);
//! ```

mod ast;
mod eval;
mod lexer;
mod parser;

pub use parser::{MAX_EXPRESSION_LEN, MAX_NESTING};

use pricer_core::types::{OptionSpec, PricingError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Anything that maps a simulated price path to a payoff amount.
///
/// The path always starts at the spot price and ends at maturity.
pub trait PathPayoff {
    /// Payoff for one path.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::PayoffEvaluation`] when the payoff cannot be
    /// computed for this path.
    fn payoff(&self, path: &[f64]) -> Result<f64, PricingError>;
}

/// A compiled payoff expression.
///
/// Cloning shares the compiled tree. Evaluation is read-only, so one
/// instance can be used from many threads at once.
#[derive(Clone)]
pub struct PayoffFunction {
    expr: Arc<ast::Expr>,
    source: Arc<str>,
}

impl PayoffFunction {
    /// Source text the function was compiled from.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the payoff for one price path.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::PayoffEvaluation`] for an empty path, an
    /// undefined name or function, a wrong argument count or kind, a
    /// division or modulo by zero, a math domain error, a non-finite value,
    /// or a result that is a sequence rather than a number.
    #[inline]
    pub fn evaluate(&self, path: &[f64]) -> Result<f64, PricingError> {
        eval::evaluate(&self.expr, path)
    }
}

impl fmt::Debug for PayoffFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayoffFunction")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PayoffFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for PayoffFunction {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_payoff_expression(s)
    }
}

impl PathPayoff for PayoffFunction {
    #[inline]
    fn payoff(&self, path: &[f64]) -> Result<f64, PricingError> {
        self.evaluate(path)
    }
}

/// Vanilla terminal payoff of the contract.
impl PathPayoff for OptionSpec {
    #[inline]
    fn payoff(&self, path: &[f64]) -> Result<f64, PricingError> {
        path.last()
            .map(|&terminal| self.intrinsic(terminal))
            .ok_or_else(|| PricingError::PayoffEvaluation("path is empty".to_string()))
    }
}

impl<P: PathPayoff + ?Sized> PathPayoff for &P {
    #[inline]
    fn payoff(&self, path: &[f64]) -> Result<f64, PricingError> {
        (**self).payoff(path)
    }
}

/// Compiles a payoff expression.
///
/// # Errors
///
/// Returns [`PricingError::PayoffCompile`] with a message and the byte
/// offset of the problem when the text is not a valid expression.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::PricingError;
/// use pricer_pricing::payoff::parse_payoff_expression;
///
/// let digital = parse_payoff_expression("(S > 100) * 10").unwrap();
/// assert_eq!(digital.evaluate(&[100.0, 101.0]).unwrap(), 10.0);
///
/// let err = parse_payoff_expression("S.__class__").unwrap_err();
/// assert!(matches!(err, PricingError::PayoffCompile { position: 1, .. }));
/// ```
pub fn parse_payoff_expression(expression: &str) -> Result<PayoffFunction, PricingError> {
    let expr = parser::parse(expression)?;
    Ok(PayoffFunction {
        expr: Arc::new(expr),
        source: Arc::from(expression),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_vanilla_payoffs() {
        let call = parse_payoff_expression("max(S - 100, 0)").unwrap();
        assert_eq!(call.evaluate(&[100.0, 105.0]).unwrap(), 5.0);
        assert_eq!(call.evaluate(&[100.0, 95.0]).unwrap(), 0.0);

        let put = parse_payoff_expression("max(100 - S, 0)").unwrap();
        assert_eq!(put.evaluate(&[100.0, 95.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_asian_payoff() {
        let asian = parse_payoff_expression("max(fsum(path) / 3 - 100, 0)").unwrap();
        let value = asian.evaluate(&[100.0, 110.0, 120.0]).unwrap();
        assert!((value - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_source_and_display() {
        let payoff: PayoffFunction = "max(S - 90, 0)".parse().unwrap();
        assert_eq!(payoff.source(), "max(S - 90, 0)");
        assert_eq!(payoff.to_string(), "max(S - 90, 0)");
        assert!(format!("{:?}", payoff).contains("max(S - 90, 0)"));
    }

    #[test]
    fn test_clone_shares_tree() {
        let payoff = parse_payoff_expression("S").unwrap();
        let clone = payoff.clone();
        assert!(Arc::ptr_eq(&payoff.expr, &clone.expr));
    }

    #[test]
    fn test_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PayoffFunction>();
    }

    #[test]
    fn test_option_spec_as_path_payoff() {
        let call = OptionSpec::call(100.0, 1.0).unwrap();
        let put = OptionSpec::put(100.0, 1.0).unwrap();
        let path = [100.0, 80.0, 112.0];

        assert_eq!(call.payoff(&path).unwrap(), 12.0);
        assert_eq!(put.payoff(&path).unwrap(), 0.0);
        assert!(matches!(
            call.payoff(&[]),
            Err(PricingError::PayoffEvaluation(_))
        ));
    }

    #[test]
    fn test_text_and_spec_payoffs_agree() {
        let spec = OptionSpec::call(100.0, 1.0).unwrap();
        let text = parse_payoff_expression("max(S - 100, 0)").unwrap();
        for terminal in [50.0, 99.5, 100.0, 100.5, 250.0] {
            let path = [100.0, terminal];
            assert_eq!(spec.payoff(&path).unwrap(), text.payoff(&path).unwrap());
        }
    }

    #[test]
    fn test_unsafe_text_never_evaluates() {
        for source in [
            "__import__('os').system('true')",
            "open('/etc/passwd')",
            "S.__class__.__bases__",
            "[x for x in path]",
            "lambda: 0",
            "S; S",
            "x := 1",
        ] {
            assert!(
                matches!(
                    parse_payoff_expression(source),
                    Err(PricingError::PayoffCompile { .. })
                ),
                "expected compile error for {:?}",
                source
            );
        }
    }

    /// Compiles and evaluates on a thread with the stack size of a tokio
    /// blocking-pool worker.
    fn evaluate_on_small_stack(source: String, path: Vec<f64>) -> Result<f64, PricingError> {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || parse_payoff_expression(&source)?.evaluate(&path))
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_longest_operator_chain_evaluates() {
        let terms = (parser::MAX_EXPRESSION_LEN - 1) / 2;
        let sum = format!("S{}", "+1".repeat(terms));
        assert!(sum.len() <= parser::MAX_EXPRESSION_LEN);

        let value = evaluate_on_small_stack(sum, vec![100.0, 101.0]).unwrap();
        assert_eq!(value, 101.0 + terms as f64);

        let product = format!("S{}", "*1".repeat(terms));
        let value = evaluate_on_small_stack(product, vec![100.0, 101.0]).unwrap();
        assert_eq!(value, 101.0);
    }

    #[test]
    fn test_deepest_accepted_nesting_evaluates() {
        let depth = parser::MAX_NESTING - 4;
        let chain = "path[0] - 100 + ".repeat(100);
        let nested = format!("{}{}S{}", "max(".repeat(depth), chain, ", 0)".repeat(depth));

        let value = evaluate_on_small_stack(nested, vec![100.0, 105.0]).unwrap();
        assert_eq!(value, 105.0);
    }

    #[test]
    fn test_chain_reports_sequence_operand() {
        let err = parse_payoff_expression("1 + 2 * path - 3")
            .unwrap()
            .evaluate(&[100.0, 101.0])
            .unwrap_err();
        assert!(err.to_string().contains("operator '*'"));
    }

    proptest! {
        #[test]
        fn prop_compiler_never_panics(source in "\\PC{0,64}") {
            let _ = parse_payoff_expression(&source);
        }

        #[test]
        fn prop_grammar_fragments_never_panic(
            source in "[Spath0-9.()\\[\\],+*/%<>=! -]{0,48}"
        ) {
            if let Ok(payoff) = parse_payoff_expression(&source) {
                let _ = payoff.evaluate(&[100.0, 101.0, 99.0]);
            }
        }

        #[test]
        fn prop_vanilla_call_matches_intrinsic(terminal in 1.0_f64..500.0) {
            let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();
            let value = payoff.evaluate(&[100.0, terminal]).unwrap();
            prop_assert_eq!(value, (terminal - 100.0).max(0.0));
        }
    }
}
