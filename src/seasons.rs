//! # Equinoxes and solstices
//!
//! ## Overview
//!
//! [`find_seasons`] locates the four instants of a calendar year (UT1, proleptic Gregorian)
//! when the Sun's apparent geocentric ecliptic longitude of date crosses 0°, 90°, 180° and
//! 270°. The search runs [`find_discrete`] on the quadrant `⌊λ☉ / 90°⌋`, so each crossing is
//! found by bisection to the search epsilon (1 ms by default). For each instant the Sun's
//! astrometric right ascension and declination (J2000/ICRF, light-time corrected) are
//! reported as well.
//!
//! [`equinoxes_of_date`] and [`solstices_of_date`] answer a different question: for a given
//! instant, where do the equinoctial and solstitial points of date lie on the J2000 sky? They
//! solve, with a damped Gauss–Newton (Levenberg–Marquardt) iteration on a 2×2 system, for
//! the J2000 direction whose ecliptic coordinates of date are (180°, 0°) or (90°, 0°), then
//! take the antipode for the other point of the pair.
//!
//! ## See also
//! ------------
//! * [`crate::search::find_discrete`] – the bracketed search.
//! * [`crate::ephemeris::Ephemeris::apparent_ecliptic`] – the longitude being tracked.
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, RADEG},
    earth_orientation::{precession_nutation_matrix, true_obliquity},
    ephemeris::{Body, Ephemeris, SkyObject},
    ref_system::{cartesian_to_radec, equatorial_to_ecliptic, radec_to_unit},
    search::{find_discrete, SearchParams, SearchWindow},
    skypath_errors::SkyPathError,
    time::{CalendarTuple, Instant},
};

/// Tolerance of the equinox-of-date solve, degrees.
const OF_DATE_TOLERANCE: f64 = 1e-8;
const OF_DATE_MAX_ITER: usize = 100;
/// Finite-difference step of the Jacobian, degrees.
const JACOBIAN_STEP: f64 = 1e-6;

/// Equinox or solstice, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Vernal,
    Summer,
    Autumnal,
    Winter,
}

impl Season {
    /// Season starting when the Sun enters ecliptic quadrant `q` (0 = [0°, 90°)).
    fn from_quadrant(q: i64) -> Self {
        match q.rem_euclid(4) {
            0 => Season::Vernal,
            1 => Season::Summer,
            2 => Season::Autumnal,
            _ => Season::Winter,
        }
    }
}

/// One equinox or solstice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonEvent {
    pub season: Season,
    pub instant: Instant,
    /// UT1 calendar fields, fractional seconds kept.
    pub time: CalendarTuple,
    /// Astrometric right ascension of the Sun (J2000), degrees.
    pub ra: Degree,
    /// Astrometric declination of the Sun (J2000), degrees.
    pub dec: Degree,
}

/// The four equinoxes and solstices of a year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonSet {
    pub year: i32,
    pub vernal: SeasonEvent,
    pub summer: SeasonEvent,
    pub autumnal: SeasonEvent,
    pub winter: SeasonEvent,
}

impl SeasonSet {
    /// Events in fixed order: vernal, summer, autumnal, winter.
    pub fn events(&self) -> [&SeasonEvent; 4] {
        [&self.vernal, &self.summer, &self.autumnal, &self.winter]
    }
}

/// Quadrant of the Sun's apparent ecliptic longitude of date.
fn solar_quadrant(ephemeris: &Ephemeris, t: &Instant) -> Result<i64, SkyPathError> {
    let (lon, _) = ephemeris.apparent_ecliptic(&SkyObject::Body(Body::Sun), t)?;
    Ok((lon.rem_euclid(360.0) / 90.0).floor() as i64)
}

/// Equinoxes and solstices of `year`.
///
/// Arguments
/// ---------
/// * `ephemeris`: position facade.
/// * `year`: astronomical year number.
/// * `params`: search configuration (`season_step_days`, `epsilon_days`).
///
/// Return
/// ------
/// * a [`SeasonSet`] in fixed order.
/// * `Err(EphemerisRange)` if `[year-01-01, (year+1)-01-01]` leaves the ephemeris coverage.
/// * `Err(SolverDidNotConverge)` if the year does not contain exactly one crossing of each
///   quadrant boundary.
pub fn find_seasons(
    ephemeris: &Ephemeris,
    year: i32,
    params: &SearchParams,
) -> Result<SeasonSet, SkyPathError> {
    let window = SearchWindow::new(
        Instant::from_calendar(year, 1, 1, 0, 0, 0.0),
        Instant::from_calendar(year + 1, 1, 1, 0, 0, 0.0),
    );
    ephemeris.check_coverage(&window.start, &window.end)?;

    let crossings = find_discrete(&window, params.season_step_days, params, |t| {
        solar_quadrant(ephemeris, t)
    })?;
    tracing::debug!(year, crossings = crossings.len(), "season crossings found");

    let mut found: [Option<SeasonEvent>; 4] = [None; 4];
    for (instant, quadrant) in crossings {
        let season = Season::from_quadrant(quadrant);
        let (ra, dec) = ephemeris.position_of(&SkyObject::Body(Body::Sun), &instant)?;
        found[season as usize] = Some(SeasonEvent {
            season,
            instant,
            time: instant.to_calendar(),
            ra,
            dec,
        });
    }

    match found {
        [Some(vernal), Some(summer), Some(autumnal), Some(winter)] => Ok(SeasonSet {
            year,
            vernal,
            summer,
            autumnal,
            winter,
        }),
        _ => Err(SkyPathError::SolverDidNotConverge(format!(
            "expected four season crossings in {year}"
        ))),
    }
}

/// A J2000 equatorial direction, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialPoint {
    pub ra: Degree,
    pub dec: Degree,
}

/// Equinoctial points of date on the J2000 sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquinoxesOfDate {
    pub vernal: EquatorialPoint,
    pub autumnal: EquatorialPoint,
}

/// Solstitial points of date on the J2000 sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolsticesOfDate {
    pub summer: EquatorialPoint,
    pub winter: EquatorialPoint,
}

/// Residual `(β, λ − target)` of the J2000 direction `x = (α, δ)` in the true ecliptic frame
/// of `t`, degrees.
fn ecliptic_residual(x: &Vector2<f64>, t: &Instant, target_lon: Degree) -> Vector2<f64> {
    let jd_tt = t.tt();
    let rotation = equatorial_to_ecliptic(true_obliquity(jd_tt)) * precession_nutation_matrix(jd_tt);
    let (lon, lat, _) = cartesian_to_radec(rotation * radec_to_unit(x[0] * RADEG, x[1] * RADEG));

    let dlon = (lon / RADEG - target_lon + 180.0).rem_euclid(360.0) - 180.0;
    Vector2::new(lat / RADEG, dlon)
}

/// Levenberg–Marquardt on the 2×2 residual, from `x0`, numerical Jacobian.
fn solve_of_date(t: &Instant, target_lon: Degree, x0: Vector2<f64>) -> Result<Vector2<f64>, SkyPathError> {
    let mut x = x0;
    let mut r = ecliptic_residual(&x, t, target_lon);
    let mut lambda = 1e-3;

    for _ in 0..OF_DATE_MAX_ITER {
        if r.norm() < OF_DATE_TOLERANCE {
            return Ok(x);
        }

        let mut jac = Matrix2::zeros();
        for k in 0..2 {
            let mut xk = x;
            xk[k] += JACOBIAN_STEP;
            jac.set_column(k, &((ecliptic_residual(&xk, t, target_lon) - r) / JACOBIAN_STEP));
        }

        let jtj = jac.transpose() * jac;
        let gradient = jac.transpose() * r;
        let damped = jtj + Matrix2::from_diagonal(&jtj.diagonal()) * lambda;
        let Some(step) = damped.lu().solve(&(-gradient)) else {
            return Err(SkyPathError::SolverDidNotConverge(
                "singular normal equations".into(),
            ));
        };

        let candidate = x + step;
        let r_candidate = ecliptic_residual(&candidate, t, target_lon);
        if r_candidate.norm() < r.norm() {
            x = candidate;
            r = r_candidate;
            lambda = (lambda * 0.1).max(1e-12);
            if step.norm() < OF_DATE_TOLERANCE {
                return Ok(x);
            }
        } else {
            lambda *= 10.0;
        }
    }

    if r.norm() < OF_DATE_TOLERANCE * 1e2 {
        Ok(x)
    } else {
        Err(SkyPathError::SolverDidNotConverge(format!(
            "ecliptic point {target_lon}° of date, residual {:e}°",
            r.norm()
        )))
    }
}

/// J2000 positions of the vernal and autumnal points of date.
///
/// The autumnal point is solved directly from the initial guess (180°, 0°); the vernal point
/// is its antipode.
pub fn equinoxes_of_date(t: &Instant) -> Result<EquinoxesOfDate, SkyPathError> {
    let x = solve_of_date(t, 180.0, Vector2::new(180.0, 0.0))?;
    let (x1, x2) = (x[0], x[1]);
    let vernal_ra = if x1 - 180.0 >= 0.0 { x1 - 180.0 } else { x1 + 180.0 };
    Ok(EquinoxesOfDate {
        vernal: EquatorialPoint {
            ra: vernal_ra,
            dec: -x2,
        },
        autumnal: EquatorialPoint { ra: x1, dec: x2 },
    })
}

/// J2000 positions of the summer and winter solstitial points of date.
pub fn solstices_of_date(t: &Instant) -> Result<SolsticesOfDate, SkyPathError> {
    let x = solve_of_date(t, 90.0, Vector2::new(90.0, 0.0))?;
    let (x1, x2) = (x[0], x[1]);
    Ok(SolsticesOfDate {
        summer: EquatorialPoint { ra: x1, dec: x2 },
        winter: EquatorialPoint {
            ra: x1 + 180.0,
            dec: -x2,
        },
    })
}
