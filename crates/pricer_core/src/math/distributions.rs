//! Standard normal distribution functions.
//!
//! `norm_cdf` uses Hart's double-precision rational approximation (as
//! published by West, 2005), accurate to about 1e-14 in `f64`. Far in the
//! tail it switches to a continued fraction over [`norm_pdf`].

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Beyond this the rational form loses accuracy.
const RATIONAL_LIMIT: f64 = 7.071_067_811_865_47;

/// `Φ(-37)` underflows an `f64`.
const TAIL_CUTOFF: f64 = 37.0;

const NUMERATOR: [f64; 7] = [
    3.526_249_659_989_11e-2,
    0.700_383_064_443_688,
    6.373_962_203_531_65,
    33.912_866_078_383,
    112.079_291_497_871,
    221.213_596_169_931,
    220.206_867_912_376,
];

const DENOMINATOR: [f64; 8] = [
    8.838_834_764_831_84e-2,
    1.755_667_163_182_64,
    16.064_177_579_207,
    86.780_732_202_946_1,
    296.564_248_779_674,
    637.333_633_378_831,
    793.826_512_519_948,
    440.413_735_824_752,
];

/// Horner evaluation, highest-order coefficient first.
#[inline]
fn horner<T: Float>(coefficients: &[f64], x: T) -> T {
    coefficients
        .iter()
        .fold(T::zero(), |acc, &c| acc * x + T::from(c).unwrap())
}

/// Lower tail `Φ(-|x|)`.
#[inline]
fn lower_tail<T: Float>(x: T) -> T {
    let abs_x = x.abs();
    if abs_x > T::from(TAIL_CUTOFF).unwrap() {
        return T::zero();
    }

    if abs_x < T::from(RATIONAL_LIMIT).unwrap() {
        let half = T::from(0.5).unwrap();
        (-half * abs_x * abs_x).exp() * horner(&NUMERATOR, abs_x) / horner(&DENOMINATOR, abs_x)
    } else {
        // φ(x) / (x + 1/(x + 2/(x + 3/(x + 4/(x + 0.65)))))
        let mut fraction = abs_x + T::from(0.65).unwrap();
        for k in [4.0, 3.0, 2.0, 1.0] {
            fraction = abs_x + T::from(k).unwrap() / fraction;
        }
        norm_pdf(abs_x) / fraction
    }
}

/// Standard normal cumulative distribution function.
///
/// # Examples
/// ```
/// use pricer_core::math::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-14);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// assert!(norm_cdf(3.0_f64) > 0.99);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let tail = lower_tail(x);
    if x > T::zero() {
        T::one() - tail
    } else {
        tail
    }
}

/// Standard normal probability density function.
///
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let frac_1_sqrt_2pi = T::from(FRAC_1_SQRT_2PI).unwrap();
    let half = T::from(0.5).unwrap();
    frac_1_sqrt_2pi * (-half * x * x).exp()
}
