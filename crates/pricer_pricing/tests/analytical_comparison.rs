//! Analytical comparison tests for the numerical engines.
//!
//! Verifies that the binomial lattice and the Monte Carlo engine converge
//! to the Black-Scholes closed form for European options.
//!
//! # Test Categories
//!
//! 1. Binomial convergence to Black-Scholes
//! 2. Binomial no-arbitrage properties (parity, bounds)
//! 3. Monte Carlo convergence with textual and vanilla payoffs
//! 4. Sequential and parallel execution agreement
//!
//! # Tolerances
//!
//! Monte Carlo assertions use three standard errors with an absolute floor.
//! Lattice assertions use a fixed absolute tolerance that shrinks with steps.

use approx::assert_relative_eq;
use pricer_core::math::norm_cdf;
use pricer_core::types::{MarketParams, OptionSpec};
use pricer_pricing::analytical::BlackScholes;
use pricer_pricing::mc::{
    monte_carlo_price, ExecutionMode, GbmParams, MonteCarloConfig, MonteCarloPricer,
};
use pricer_pricing::payoff::parse_payoff_expression;
use pricer_pricing::tree::{price_option, BinomialPricer};
use proptest::prelude::*;

fn standard_market() -> MarketParams {
    MarketParams::new(100.0, 0.05, 0.2)
}

fn standard_gbm() -> GbmParams {
    GbmParams::new(100.0, 0.05, 0.2, 1.0)
}

fn reference() -> BlackScholes {
    BlackScholes::new(standard_market()).unwrap()
}

fn mc_tolerance(std_error: f64) -> f64 {
    (3.0 * std_error).max(0.02)
}

// ============================================================================
// Binomial convergence
// ============================================================================

#[test]
fn test_binomial_atm_call_reference_value() {
    let call = OptionSpec::call(100.0, 1.0).unwrap();
    let price = price_option(100.0, &call, 0.05, 0.2, 100).unwrap();

    // CRR with 100 steps sits within a few cents of 10.4506
    assert!(
        (price - 10.4506).abs() < 0.05,
        "Binomial={:.4}, Analytical=10.4506",
        price
    );
}

#[test]
fn test_binomial_converges_with_steps() {
    let bs = reference();
    let call = OptionSpec::call(100.0, 1.0).unwrap();
    let analytical = bs.price(&call);

    for (steps, tolerance) in [(100, 0.05), (500, 0.01), (2000, 5e-3)] {
        let lattice = price_option(100.0, &call, 0.05, 0.2, steps).unwrap();
        let error = (lattice - analytical).abs();
        assert!(
            error < tolerance,
            "steps={}, Binomial={:.4}, Analytical={:.4}, Error={:.4}, Tolerance={:.4}",
            steps,
            lattice,
            analytical,
            error,
            tolerance
        );
    }
}

#[test]
fn test_binomial_put_matches_black_scholes() {
    let bs = reference();
    let pricer = BinomialPricer::new(1000).unwrap();

    for strike in [80.0, 100.0, 120.0] {
        let put = OptionSpec::put(strike, 1.0).unwrap();
        let lattice = pricer.price(&standard_market(), &put).unwrap();
        let analytical = bs.price(&put);
        assert!(
            (lattice - analytical).abs() < 0.02,
            "K={}, Binomial={:.4}, Analytical={:.4}",
            strike,
            lattice,
            analytical
        );
    }
}

#[test]
fn test_binomial_deep_itm_call_approaches_forward_intrinsic() {
    let call = OptionSpec::call(10.0, 1.0).unwrap();
    let price = price_option(100.0, &call, 0.05, 0.2, 200).unwrap();
    let forward_intrinsic = 100.0 - 10.0 * (-0.05_f64).exp();
    assert_relative_eq!(price, forward_intrinsic, epsilon = 1e-8);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_binomial_put_call_parity(
        spot in 50.0..150.0_f64,
        strike in 50.0..150.0_f64,
        rate in 0.0..0.08_f64,
        volatility in 0.1..0.5_f64,
        maturity in 0.25..2.0_f64,
        steps in 20usize..200,
    ) {
        let call = OptionSpec::call(strike, maturity).unwrap();
        let put = OptionSpec::put(strike, maturity).unwrap();
        let c = price_option(spot, &call, rate, volatility, steps).unwrap();
        let p = price_option(spot, &put, rate, volatility, steps).unwrap();

        let parity = spot - strike * (-rate * maturity).exp();
        prop_assert!((c - p - parity).abs() < 1e-8 * spot.max(strike));
    }

    #[test]
    fn prop_binomial_prices_are_bounded(
        spot in 50.0..150.0_f64,
        strike in 50.0..150.0_f64,
        rate in 0.0..0.08_f64,
        volatility in 0.1..0.5_f64,
        steps in 10usize..150,
    ) {
        let call = OptionSpec::call(strike, 1.0).unwrap();
        let put = OptionSpec::put(strike, 1.0).unwrap();
        let c = price_option(spot, &call, rate, volatility, steps).unwrap();
        let p = price_option(spot, &put, rate, volatility, steps).unwrap();

        prop_assert!(c >= 0.0);
        prop_assert!(p >= 0.0);
        prop_assert!(c <= spot + 1e-9);
        prop_assert!(p <= strike + 1e-9);
    }
}

// ============================================================================
// Monte Carlo convergence
// ============================================================================

#[test]
fn test_mc_textual_call_converges() {
    let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();
    let price =
        monte_carlo_price(100.0, 0.05, 0.2, 1.0, 100, 100_000, &payoff, Some(42)).unwrap();

    // standard error is about 0.047 at this path count
    assert!(
        (price - 10.4506).abs() < 0.2,
        "MC={:.4}, Analytical=10.4506",
        price
    );
}

#[test]
fn test_mc_vanilla_put_converges() {
    let bs = reference();
    let put = OptionSpec::put(100.0, 1.0).unwrap();
    let config = MonteCarloConfig::builder()
        .n_paths(100_000)
        .n_steps(1)
        .seed(7)
        .build()
        .unwrap();
    let pricer = MonteCarloPricer::new(config).unwrap();

    let result = pricer.price(standard_gbm(), &put).unwrap();
    let analytical = bs.price(&put);
    let error = (result.price - analytical).abs();
    let tolerance = mc_tolerance(result.std_error);

    assert!(
        error < tolerance,
        "MC={:.4}, Analytical={:.4}, Error={:.4}, Tolerance={:.4}",
        result.price,
        analytical,
        error,
        tolerance
    );
}

#[test]
fn test_mc_digital_call_converges() {
    // cash-or-nothing call: exp(-rT) N(d2)
    let bs = reference();
    let analytical = (-0.05_f64).exp() * norm_cdf(bs.d2(100.0, 1.0));

    let payoff = parse_payoff_expression("(S > 100) * 1").unwrap();
    let config = MonteCarloConfig::builder()
        .n_paths(100_000)
        .n_steps(1)
        .seed(11)
        .build()
        .unwrap();
    let result = MonteCarloPricer::new(config)
        .unwrap()
        .price(standard_gbm(), &payoff)
        .unwrap();

    let tolerance = mc_tolerance(result.std_error);
    assert!(
        (result.price - analytical).abs() < tolerance,
        "MC={:.4}, Analytical={:.4}, Tolerance={:.4}",
        result.price,
        analytical,
        tolerance
    );
}

#[test]
fn test_mc_parallel_call_converges() {
    let bs = reference();
    let call = OptionSpec::call(110.0, 1.0).unwrap();
    let config = MonteCarloConfig::builder()
        .n_paths(100_000)
        .n_steps(4)
        .seed(2024)
        .mode(ExecutionMode::Parallel)
        .build()
        .unwrap();
    let result = MonteCarloPricer::new(config)
        .unwrap()
        .price(standard_gbm(), &call)
        .unwrap();

    let analytical = bs.price(&call);
    let tolerance = mc_tolerance(result.std_error);
    assert!(
        (result.price - analytical).abs() < tolerance,
        "MC={:.4}, Analytical={:.4}, Tolerance={:.4}",
        result.price,
        analytical,
        tolerance
    );
}

#[test]
fn test_textual_and_vanilla_payoffs_agree_on_same_stream() {
    let call = OptionSpec::call(100.0, 1.0).unwrap();
    let textual = parse_payoff_expression("max(path[-1] - 100, 0)").unwrap();

    let vanilla = monte_carlo_price(100.0, 0.05, 0.2, 1.0, 12, 5_000, &call, Some(3)).unwrap();
    let expression =
        monte_carlo_price(100.0, 0.05, 0.2, 1.0, 12, 5_000, &textual, Some(3)).unwrap();

    assert_relative_eq!(vanilla, expression, epsilon = 1e-12);
}

#[test]
fn test_mc_and_binomial_agree() {
    let put = OptionSpec::put(95.0, 0.5).unwrap();
    let market = MarketParams::new(100.0, 0.03, 0.25);

    let lattice = BinomialPricer::new(1000).unwrap().price(&market, &put).unwrap();

    let config = MonteCarloConfig::builder()
        .n_paths(100_000)
        .n_steps(1)
        .seed(99)
        .build()
        .unwrap();
    let result = MonteCarloPricer::new(config)
        .unwrap()
        .price(GbmParams::new(100.0, 0.03, 0.25, 0.5), &put)
        .unwrap();

    let tolerance = mc_tolerance(result.std_error) + 0.01;
    assert!(
        (result.price - lattice).abs() < tolerance,
        "MC={:.4}, Binomial={:.4}, Tolerance={:.4}",
        result.price,
        lattice,
        tolerance
    );
}
