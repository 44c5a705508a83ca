//! Integration tests for module exports.
//!
//! Verify that the public types and functions are reachable through both
//! their module paths and the `types`/`math` re-exports.

/// Test that the contract types are accessible via absolute path.
#[test]
fn test_option_module_exports() {
    use pricer_core::types::option::{OptionKind, OptionSpec};

    let spec = OptionSpec::new(OptionKind::Put, 90.0, 0.5).unwrap();
    assert_eq!(spec.kind(), OptionKind::Put);
    assert_eq!(spec.intrinsic(80.0), 10.0);
}

/// Test that the error taxonomy and helpers are accessible via absolute path.
#[test]
fn test_error_module_exports() {
    use pricer_core::types::error::{ensure_nonzero_count, ensure_positive, PricingError};

    assert_eq!(ensure_positive("spot", 1.5).unwrap(), 1.5);
    assert!(matches!(
        ensure_nonzero_count("paths", 0),
        Err(PricingError::InvalidInput { field: "paths", .. })
    ));
}

/// Test that the flat re-exports resolve to the same items.
#[test]
fn test_types_reexports() {
    use pricer_core::types::{MarketParams, OptionKind, OptionSpec};

    let market = MarketParams::new(100.0, 0.05, 0.2);
    assert!(market.validate().is_ok());

    let spec = OptionSpec::parse("CALL", 100.0, 1.0).unwrap();
    assert_eq!(spec.kind(), OptionKind::Call);
}

/// Test that distribution functions are accessible via both paths.
#[test]
fn test_math_module_exports() {
    use pricer_core::math::distributions::norm_cdf;
    use pricer_core::math::norm_pdf;

    assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
    assert!((norm_pdf(0.0_f64) - 0.398_942_280_401_432_7).abs() < 1e-12);
}
