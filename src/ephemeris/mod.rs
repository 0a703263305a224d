//! # Ephemeris access
//!
//! The engine never reads an ephemeris file directly. Positions come from an
//! [`EphemerisProvider`] injected at construction time; the [`Ephemeris`] facade turns those
//! raw positions into what the searches need: astrometric and apparent right ascension and
//! declination, apparent ecliptic longitude of date, and topocentric altitude/azimuth.
//!
//! ## Overview
//!
//! - [`Body`]: solar-system bodies addressable through a provider.
//! - [`FixedStar`] / [`SkyObject`]: a resolved celestial target (moving body or fixed star).
//! - [`EphemerisProvider`]: the external collaborator contract (positions + coverage).
//! - [`spk::SpkEphemeris`]: JPL SPK kernel reader, DE406 by default; the reference provider.
//! - [`keplerian::KeplerianEphemeris`]: approximate analytic fallback needing no data file.
//! - [`Ephemeris`]: the facade (module [`apparent`]).
//!
//! ## Frames and time scales
//!
//! Providers return positions in AU, in the ICRF/J2000 mean equatorial frame, relative to any
//! inertial origin (heliocentric or barycentric), for a Julian Date on the TDB scale. The
//! facade takes UT1 [`Instant`](crate::time::Instant)s and converts with ΔT.
//!
//! ## See also
//! ------------
//! * [`crate::earth_orientation`] – precession, nutation and sidereal time.
//! * [`crate::ref_system`] – aberration and horizontal coordinates.
use std::fmt;

use nalgebra::Vector3;

use crate::{
    constants::{Degree, JulianDay, DAYS_PER_CENTURY, J1991_25, RADEG},
    ref_system::radec_to_unit,
    skypath_errors::SkyPathError,
    time::CalendarDate,
};

pub mod apparent;
pub mod keplerian;
pub mod spk;

pub use apparent::{Ephemeris, HorizontalCoordinates};

/// Solar-system bodies known to the engine.
///
/// The giant planets and Pluto are addressed through their system barycenters, which is what
/// planetary ephemerides tabulate for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    JupiterBarycenter,
    SaturnBarycenter,
    UranusBarycenter,
    NeptuneBarycenter,
    PlutoBarycenter,
}

impl Body {
    /// Lower-case ephemeris label, e.g. `"jupiter barycenter"`.
    pub fn label(&self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Earth => "earth",
            Body::Mars => "mars",
            Body::JupiterBarycenter => "jupiter barycenter",
            Body::SaturnBarycenter => "saturn barycenter",
            Body::UranusBarycenter => "uranus barycenter",
            Body::NeptuneBarycenter => "neptune barycenter",
            Body::PlutoBarycenter => "pluto barycenter",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A star at a catalogued position, optionally with proper motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStar {
    /// Right ascension (ICRS) at the catalogue epoch, degrees.
    pub ra: Degree,
    /// Declination (ICRS) at the catalogue epoch, degrees.
    pub dec: Degree,
    /// Proper motion in right ascension, μα·cos δ, milliarcseconds per year.
    pub pm_ra_mas_per_year: f64,
    /// Proper motion in declination, milliarcseconds per year.
    pub pm_dec_mas_per_year: f64,
    /// Catalogue epoch (TT Julian Date).
    pub epoch: JulianDay,
}

impl FixedStar {
    /// A star with no proper motion.
    pub fn new(ra: Degree, dec: Degree) -> Self {
        FixedStar {
            ra,
            dec,
            pm_ra_mas_per_year: 0.0,
            pm_dec_mas_per_year: 0.0,
            epoch: J1991_25,
        }
    }

    /// A star from right ascension in hours and declination in degrees.
    pub fn from_hours(ra_hours: f64, dec: Degree) -> Self {
        Self::new(ra_hours * 15.0, dec)
    }

    pub fn with_proper_motion(mut self, pm_ra: f64, pm_dec: f64, epoch: JulianDay) -> Self {
        self.pm_ra_mas_per_year = pm_ra;
        self.pm_dec_mas_per_year = pm_dec;
        self.epoch = epoch;
        self
    }

    /// ICRS unit vector at `jd_tt`, proper motion applied linearly on the tangent plane.
    pub fn unit_vector(&self, jd_tt: JulianDay) -> Vector3<f64> {
        let (ra, dec) = (self.ra * RADEG, self.dec * RADEG);
        let u0 = radec_to_unit(ra, dec);
        if self.pm_ra_mas_per_year == 0.0 && self.pm_dec_mas_per_year == 0.0 {
            return u0;
        }

        let years = (jd_tt - self.epoch) / (DAYS_PER_CENTURY / 100.0);
        let mas = RADEG / 3_600_000.0;
        let (sa, ca) = ra.sin_cos();
        let sd = dec.sin();
        let e_ra = Vector3::new(-sa, ca, 0.0);
        let e_dec = Vector3::new(-sd * ca, -sd * sa, dec.cos());

        (u0 + years
            * mas
            * (self.pm_ra_mas_per_year * e_ra + self.pm_dec_mas_per_year * e_dec))
            .normalize()
    }
}

/// A resolved celestial target: either a moving body or a fixed star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkyObject {
    Body(Body),
    Star(FixedStar),
}

/// Raw position source backing the [`Ephemeris`] facade.
///
/// Implementations must be immutable after construction and safe to share between threads;
/// the engine wraps them in an `Arc` and only ever reads from them.
pub trait EphemerisProvider: fmt::Debug + Send + Sync {
    /// Position of `body` at `jd_tdb`, AU, ICRF/J2000 mean equatorial frame.
    fn position(&self, body: Body, jd_tdb: JulianDay) -> Result<Vector3<f64>, SkyPathError>;

    /// First and last calendar days covered by the data.
    fn coverage(&self) -> (CalendarDate, CalendarDate);
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;
    use crate::ref_system::cartesian_to_radec;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fixed_star_without_motion() {
        let star = FixedStar::from_hours(18.6156, 38.78);
        let (ra, dec, _) = cartesian_to_radec(star.unit_vector(2_460_000.5));
        assert_abs_diff_eq!(ra.to_degrees(), 279.234, epsilon = 1e-9);
        assert_abs_diff_eq!(dec.to_degrees(), 38.78, epsilon = 1e-9);
    }

    #[test]
    fn test_fixed_star_proper_motion() {
        // Barnard's star drifts ~10.3″/yr, mostly northwards
        let star = FixedStar::new(269.45402305, 4.66828815).with_proper_motion(
            -797.84, 10326.93, J1991_25,
        );
        let later = J1991_25 + 100.0 * 365.25;
        let (ra, dec, _) = cartesian_to_radec(star.unit_vector(later));
        assert_abs_diff_eq!(dec.to_degrees() - 4.66828815, 10326.93 * 100.0 / 3.6e6, epsilon = 1e-4);
        assert!(ra.to_degrees() < 269.45402305);
    }

    #[test]
    fn test_body_labels() {
        assert_eq!(Body::JupiterBarycenter.to_string(), "jupiter barycenter");
        assert_eq!(Body::Mars.label(), "mars");
    }
}
