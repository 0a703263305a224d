//! # Earth orientation: obliquity, precession, nutation, sidereal time
//!
//! Rotations taking a direction from the ICRS to the true equator and equinox of date, plus
//! the Greenwich apparent sidereal time needed to turn an apparent right ascension into a
//! local hour angle.
//!
//! ## Overview
//!
//! - [`obleq`]: mean obliquity of the ecliptic (IAU 1976).
//! - [`nutation`]: nutation in longitude and obliquity, the complete 106-term IAU 1980 series.
//! - [`frame_bias_matrix`]: ICRS → mean equator and equinox of J2000.
//! - [`precession_matrix`]: IAU 1976 precession with the IAU 2000 rate corrections,
//!   J2000 mean → mean of date.
//! - [`nutation_matrix`]: mean of date → true of date.
//! - [`gast`]: Greenwich apparent sidereal time.
//!
//! The frame bias and the precession-rate corrections bring the IAU 1976/1980 chain within a
//! few milliarcseconds of the IAU 2000 models over the modern era.
//!
//! Every function takes a Julian Date on the TT scale unless stated otherwise. Matrices follow
//! the `x_date = M · x_J2000` convention and are built from the active rotations of
//! [`rotmt`](crate::ref_system::rotmt).
use nalgebra::Matrix3;

use crate::{
    constants::{ArcSec, JulianDay, Radian, DAYS_PER_CENTURY, DPI, J2000, RADSEC},
    ref_system::{rotmt, Axis},
    time::{gmst, horner, Instant},
};

/// Mean obliquity of J2000, arcseconds.
const EPS0: ArcSec = 84381.448;

/// Frame bias: offsets of the J2000 mean pole in longitude and obliquity, and of the
/// equinox in right ascension, arcseconds.
const DPSI_BIAS: ArcSec = -0.041775;
const DEPS_BIAS: ArcSec = -0.0068192;
const DRA_BIAS: ArcSec = -0.0146;

/// IAU 2000 corrections to the precession rates in longitude and obliquity, arcsec/century.
const PRECESSION_RATE_CORRECTION: ArcSec = -0.29965;
const OBLIQUITY_RATE_CORRECTION: ArcSec = -0.02524;

fn centuries(jd_tt: JulianDay) -> f64 {
    (jd_tt - J2000) / DAYS_PER_CENTURY
}

/// Compute the mean obliquity of the ecliptic at a given epoch (IAU 1976 model).
///
/// Arguments
/// ---------
/// * `jd_tt`: Julian Date (TT scale).
///
/// Returns
/// --------
/// * Mean obliquity of the ecliptic in radians.
///
/// Formula
/// -------
/// ```text
/// ε(T) = 84381.448″ − 46.8150″·T − 0.00059″·T² + 0.001813″·T³
/// ```
/// with `T` the Julian centuries since J2000.
pub fn obleq(jd_tt: JulianDay) -> Radian {
    horner(centuries(jd_tt), &[EPS0, -46.8150, -0.00059, 0.001813]) * RADSEC
}

/// Mean obliquity of date including the IAU 2000 obliquity-rate correction, radians.
pub fn mean_obliquity(jd_tt: JulianDay) -> Radian {
    obleq(jd_tt) + OBLIQUITY_RATE_CORRECTION * centuries(jd_tt) * RADSEC
}

/// Obliquity of the true ecliptic of date: [`mean_obliquity`] plus the nutation Δε, radians.
pub fn true_obliquity(jd_tt: JulianDay) -> Radian {
    let (_, deps) = nutation(jd_tt);
    mean_obliquity(jd_tt) + deps * RADSEC
}

/// One periodic term of the nutation series.
///
/// Multipliers of (l, l′, F, D, Ω) then the sine coefficient of Δψ and the cosine coefficient
/// of Δε, both in units of 0.0001″ with their secular rates per century.
struct NutationTerm {
    args: [i8; 5],
    psi: (f64, f64),
    eps: (f64, f64),
}

const fn term(args: [i8; 5], psi: (f64, f64), eps: (f64, f64)) -> NutationTerm {
    NutationTerm { args, psi, eps }
}

#[rustfmt::skip]
const NUTATION_TERMS: [NutationTerm; 106] = [
    term([ 0,  0,  0,  0,  1], (-171996.0, -174.2), ( 92025.0,  8.9)),
    term([ 0,  0,  0,  0,  2], (   2062.0,    0.2), (  -895.0,  0.5)),
    term([-2,  0,  2,  0,  1], (     46.0,    0.0), (   -24.0,  0.0)),
    term([ 2,  0, -2,  0,  0], (     11.0,    0.0), (     0.0,  0.0)),
    term([-2,  0,  2,  0,  2], (     -3.0,    0.0), (     1.0,  0.0)),
    term([ 1, -1,  0, -1,  0], (     -3.0,    0.0), (     0.0,  0.0)),
    term([ 0, -2,  2, -2,  1], (     -2.0,    0.0), (     1.0,  0.0)),
    term([ 2,  0, -2,  0,  1], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0,  2, -2,  2], ( -13187.0,   -1.6), (  5736.0, -3.1)),
    term([ 0,  1,  0,  0,  0], (   1426.0,   -3.4), (    54.0, -0.1)),
    term([ 0,  1,  2, -2,  2], (   -517.0,    1.2), (   224.0, -0.6)),
    term([ 0, -1,  2, -2,  2], (    217.0,   -0.5), (   -95.0,  0.3)),
    term([ 0,  0,  2, -2,  1], (    129.0,    0.1), (   -70.0,  0.0)),
    term([ 2,  0,  0, -2,  0], (     48.0,    0.0), (     1.0,  0.0)),
    term([ 0,  0,  2, -2,  0], (    -22.0,    0.0), (     0.0,  0.0)),
    term([ 0,  2,  0,  0,  0], (     17.0,   -0.1), (     0.0,  0.0)),
    term([ 0,  1,  0,  0,  1], (    -15.0,    0.0), (     9.0,  0.0)),
    term([ 0,  2,  2, -2,  2], (    -16.0,    0.1), (     7.0,  0.0)),
    term([ 0, -1,  0,  0,  1], (    -12.0,    0.0), (     6.0,  0.0)),
    term([-2,  0,  0,  2,  1], (     -6.0,    0.0), (     3.0,  0.0)),
    term([ 0, -1,  2, -2,  1], (     -5.0,    0.0), (     3.0,  0.0)),
    term([ 2,  0,  0, -2,  1], (      4.0,    0.0), (    -2.0,  0.0)),
    term([ 0,  1,  2, -2,  1], (      4.0,    0.0), (    -2.0,  0.0)),
    term([ 1,  0,  0, -1,  0], (     -4.0,    0.0), (     0.0,  0.0)),
    term([ 2,  1,  0, -2,  0], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0, -2,  2,  1], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  1, -2,  2,  0], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  1,  0,  0,  2], (      1.0,    0.0), (     0.0,  0.0)),
    term([-1,  0,  0,  1,  1], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  1,  2, -2,  0], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0,  2,  0,  2], (  -2274.0,   -0.2), (   977.0, -0.5)),
    term([ 1,  0,  0,  0,  0], (    712.0,    0.1), (    -7.0,  0.0)),
    term([ 0,  0,  2,  0,  1], (   -386.0,   -0.4), (   200.0,  0.0)),
    term([ 1,  0,  2,  0,  2], (   -301.0,    0.0), (   129.0, -0.1)),
    term([ 1,  0,  0, -2,  0], (   -158.0,    0.0), (    -1.0,  0.0)),
    term([-1,  0,  2,  0,  2], (    123.0,    0.0), (   -53.0,  0.0)),
    term([ 0,  0,  0,  2,  0], (     63.0,    0.0), (    -2.0,  0.0)),
    term([ 1,  0,  0,  0,  1], (     63.0,    0.1), (   -33.0,  0.0)),
    term([-1,  0,  0,  0,  1], (    -58.0,   -0.1), (    32.0,  0.0)),
    term([-1,  0,  2,  2,  2], (    -59.0,    0.0), (    26.0,  0.0)),
    term([ 1,  0,  2,  0,  1], (    -51.0,    0.0), (    27.0,  0.0)),
    term([ 0,  0,  2,  2,  2], (    -38.0,    0.0), (    16.0,  0.0)),
    term([ 2,  0,  0,  0,  0], (     29.0,    0.0), (    -1.0,  0.0)),
    term([ 1,  0,  2, -2,  2], (     29.0,    0.0), (   -12.0,  0.0)),
    term([ 2,  0,  2,  0,  2], (    -31.0,    0.0), (    13.0,  0.0)),
    term([ 0,  0,  2,  0,  0], (     26.0,    0.0), (    -1.0,  0.0)),
    term([-1,  0,  2,  0,  1], (     21.0,    0.0), (   -10.0,  0.0)),
    term([-1,  0,  0,  2,  1], (     16.0,    0.0), (    -8.0,  0.0)),
    term([ 1,  0,  0, -2,  1], (    -13.0,    0.0), (     7.0,  0.0)),
    term([-1,  0,  2,  2,  1], (    -10.0,    0.0), (     5.0,  0.0)),
    term([ 1,  1,  0, -2,  0], (     -7.0,    0.0), (     0.0,  0.0)),
    term([ 0,  1,  2,  0,  2], (      7.0,    0.0), (    -3.0,  0.0)),
    term([ 0, -1,  2,  0,  2], (     -7.0,    0.0), (     3.0,  0.0)),
    term([ 1,  0,  2,  2,  2], (     -8.0,    0.0), (     3.0,  0.0)),
    term([ 1,  0,  0,  2,  0], (      6.0,    0.0), (     0.0,  0.0)),
    term([ 2,  0,  2, -2,  2], (      6.0,    0.0), (    -3.0,  0.0)),
    term([ 0,  0,  0,  2,  1], (     -6.0,    0.0), (     3.0,  0.0)),
    term([ 0,  0,  2,  2,  1], (     -7.0,    0.0), (     3.0,  0.0)),
    term([ 1,  0,  2, -2,  1], (      6.0,    0.0), (    -3.0,  0.0)),
    term([ 0,  0,  0, -2,  1], (     -5.0,    0.0), (     3.0,  0.0)),
    term([ 1, -1,  0,  0,  0], (      5.0,    0.0), (     0.0,  0.0)),
    term([ 2,  0,  2,  0,  1], (     -5.0,    0.0), (     3.0,  0.0)),
    term([ 0,  1,  0, -2,  0], (     -4.0,    0.0), (     0.0,  0.0)),
    term([ 1,  0, -2,  0,  0], (      4.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0,  0,  1,  0], (     -4.0,    0.0), (     0.0,  0.0)),
    term([ 1,  1,  0,  0,  0], (     -3.0,    0.0), (     0.0,  0.0)),
    term([ 1,  0,  2,  0,  0], (      3.0,    0.0), (     0.0,  0.0)),
    term([ 1, -1,  2,  0,  2], (     -3.0,    0.0), (     1.0,  0.0)),
    term([-1, -1,  2,  2,  2], (     -3.0,    0.0), (     1.0,  0.0)),
    term([-2,  0,  0,  0,  1], (     -2.0,    0.0), (     1.0,  0.0)),
    term([ 3,  0,  2,  0,  2], (     -3.0,    0.0), (     1.0,  0.0)),
    term([ 0, -1,  2,  2,  2], (     -3.0,    0.0), (     1.0,  0.0)),
    term([ 1,  1,  2,  0,  2], (      2.0,    0.0), (    -1.0,  0.0)),
    term([-1,  0,  2, -2,  1], (     -2.0,    0.0), (     1.0,  0.0)),
    term([ 2,  0,  0,  0,  1], (      2.0,    0.0), (    -1.0,  0.0)),
    term([ 1,  0,  0,  0,  2], (     -2.0,    0.0), (     1.0,  0.0)),
    term([ 3,  0,  0,  0,  0], (      2.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0,  2,  1,  2], (      2.0,    0.0), (    -1.0,  0.0)),
    term([-1,  0,  0,  0,  2], (      1.0,    0.0), (    -1.0,  0.0)),
    term([ 1,  0,  0, -4,  0], (     -1.0,    0.0), (     0.0,  0.0)),
    term([-2,  0,  2,  2,  2], (      1.0,    0.0), (    -1.0,  0.0)),
    term([-1,  0,  2,  4,  2], (     -2.0,    0.0), (     1.0,  0.0)),
    term([ 2,  0,  0, -4,  0], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 1,  1,  2, -2,  2], (      1.0,    0.0), (    -1.0,  0.0)),
    term([ 1,  0,  2,  2,  1], (     -1.0,    0.0), (     1.0,  0.0)),
    term([-2,  0,  2,  4,  2], (     -1.0,    0.0), (     1.0,  0.0)),
    term([-1,  0,  4,  0,  2], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 1, -1,  0, -2,  0], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 2,  0,  2, -2,  1], (      1.0,    0.0), (    -1.0,  0.0)),
    term([ 2,  0,  2,  2,  2], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 1,  0,  0,  2,  1], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0,  4, -2,  2], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 3,  0,  2, -2,  2], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 1,  0,  2, -2,  0], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  1,  2,  0,  1], (      1.0,    0.0), (     0.0,  0.0)),
    term([-1, -1,  0,  2,  1], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0, -2,  0,  1], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0,  2, -1,  2], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  1,  0,  2,  0], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 1,  0, -2, -2,  0], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 0, -1,  2,  0,  1], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 1,  1,  0, -2,  1], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 1,  0, -2,  2,  0], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 2,  0,  0,  2,  0], (      1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  0,  2,  4,  2], (     -1.0,    0.0), (     0.0,  0.0)),
    term([ 0,  1,  0,  1,  0], (      1.0,    0.0), (     0.0,  0.0)),
];

/// Delaunay arguments (l, l′, F, D, Ω) in radians, `t` in Julian centuries of TT.
fn fundamental_arguments(t: f64) -> [f64; 5] {
    [
        horner(t, &[485866.733, 1717915922.633, 31.310, 0.064]),
        horner(t, &[1287099.804, 129596581.224, -0.577, -0.012]),
        horner(t, &[335778.877, 1739527263.137, -13.257, 0.011]),
        horner(t, &[1072261.307, 1602961601.328, -6.891, 0.019]),
        horner(t, &[450160.280, -6962890.539, 7.455, 0.008]),
    ]
    .map(|a| (a * RADSEC) % DPI)
}

/// Compute the nutation angles in longitude and obliquity (IAU 1980 theory).
///
/// Arguments
/// ---------
/// * `jd_tt`: Julian Date (TT scale).
///
/// Returns
/// --------
/// * A tuple `(Δψ, Δε)` in arcseconds.
///
/// The series is summed smallest term first.
pub fn nutation(jd_tt: JulianDay) -> (ArcSec, ArcSec) {
    let t = centuries(jd_tt);
    let fa = fundamental_arguments(t);

    let (dpsi, deps) = NUTATION_TERMS
        .iter()
        .rev()
        .fold((0.0, 0.0), |(dpsi, deps), term| {
            let arg: f64 = term
                .args
                .iter()
                .zip(fa.iter())
                .map(|(&k, &a)| k as f64 * a)
                .sum();
            (
                dpsi + (term.psi.0 + term.psi.1 * t) * arg.sin(),
                deps + (term.eps.0 + term.eps.1 * t) * arg.cos(),
            )
        });

    (dpsi * 1e-4, deps * 1e-4)
}

/// Frame bias matrix, ICRS → mean equator and equinox of J2000.
pub fn frame_bias_matrix() -> Matrix3<f64> {
    rotmt(DEPS_BIAS * RADSEC, Axis::X)
        * rotmt(-DPSI_BIAS * RADSEC * (EPS0 * RADSEC).sin(), Axis::Y)
        * rotmt(-DRA_BIAS * RADSEC, Axis::Z)
}

/// Precession matrix from the mean equator and equinox of J2000 to those of date.
///
/// IAU 1976 angles ψ_A, ω_A, χ_A (Lieske 1977) with the IAU 2000 corrections to the rates
/// of ψ_A and ω_A. In the frame-rotation convention the matrix is
/// `R3(χ_A) · R1(−ω_A) · R3(−ψ_A) · R1(ε0)`.
pub fn precession_matrix(jd_tt: JulianDay) -> Matrix3<f64> {
    let t = centuries(jd_tt);

    let psia = horner(t, &[0.0, 5038.7784 + PRECESSION_RATE_CORRECTION, -1.07259, -0.001147]);
    let oma = horner(t, &[EPS0, OBLIQUITY_RATE_CORRECTION, 0.05127, -0.007726]);
    let chia = horner(t, &[0.0, 10.5526, -2.38064, -0.001125]);

    rotmt(-chia * RADSEC, Axis::Z)
        * rotmt(oma * RADSEC, Axis::X)
        * rotmt(psia * RADSEC, Axis::Z)
        * rotmt(-EPS0 * RADSEC, Axis::X)
}

/// Nutation matrix from the mean equator and equinox of date to the true ones.
pub fn nutation_matrix(jd_tt: JulianDay) -> Matrix3<f64> {
    let epsm = mean_obliquity(jd_tt);
    let (dpsi, deps) = nutation(jd_tt);
    let epst = epsm + deps * RADSEC;

    rotmt(epst, Axis::X) * rotmt(dpsi * RADSEC, Axis::Z) * rotmt(-epsm, Axis::X)
}

/// Combined bias-precession-nutation matrix, ICRS → true equator and equinox of date.
pub fn precession_nutation_matrix(jd_tt: JulianDay) -> Matrix3<f64> {
    nutation_matrix(jd_tt) * precession_matrix(jd_tt) * frame_bias_matrix()
}

/// Equation of the equinoxes Δψ·cos ε, in radians.
pub fn equation_of_equinoxes(jd_tt: JulianDay) -> Radian {
    let (dpsi, _) = nutation(jd_tt);
    dpsi * RADSEC * mean_obliquity(jd_tt).cos()
}

/// Greenwich apparent sidereal time, in radians within [0, 2π).
pub fn gast(instant: &Instant) -> Radian {
    (gmst(instant.ut1()) + equation_of_equinoxes(instant.tt())).rem_euclid(DPI)
}
