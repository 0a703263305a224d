//! # Ephemeris facade: astrometric and apparent places
//!
//! [`Ephemeris`] wraps a shared [`EphemerisProvider`] and derives, for a [`SkyObject`] at a UT1
//! [`Instant`]:
//!
//! 1. **Astrometric place**: geocentric direction in the J2000/ICRF frame, corrected for
//!    light time (bodies) or proper motion (stars). See [`Ephemeris::position_of`].
//! 2. **Apparent place**: astrometric place plus annual aberration, rotated to the true
//!    equator and equinox of date (frame bias, IAU 1976 precession with the IAU 2000 rate
//!    corrections, IAU 1980 nutation).
//! 3. **Horizontal coordinates**: topocentric altitude and azimuth from the Greenwich
//!    apparent sidereal time and the observer's latitude/longitude
//!    ([`Ephemeris::apparent_altaz`]). Refraction is not applied; the search thresholds
//!    carry it instead.
//!
//! ## See also
//! ------------
//! * [`crate::earth_orientation`] – precession, nutation, sidereal time.
//! * [`crate::ref_system`] – aberration, horizontal transform.
use std::sync::Arc;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, JulianDay, AU, DPI, RADEG, VLIGHT_AU},
    earth_orientation::{gast, precession_nutation_matrix, true_obliquity},
    ephemeris::{Body, EphemerisProvider, SkyObject},
    observer::ObserverLocation,
    ref_system::{cartesian_to_radec, correct_aberration, equatorial_to_ecliptic, equatorial_to_horizontal},
    skypath_errors::SkyPathError,
    time::{CalendarDate, Instant},
};

/// Half-width of the central difference used for the Earth's velocity, days.
const VELOCITY_STEP: f64 = 0.01;

/// Earth equatorial radius, AU.
const EARTH_RADIUS_AU: f64 = 6378.137 / AU;

/// Topocentric altitude and azimuth, degrees (azimuth from north through east).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoordinates {
    pub alt: Degree,
    pub az: Degree,
}

/// Read-only facade over an [`EphemerisProvider`].
#[derive(Debug, Clone)]
pub struct Ephemeris {
    provider: Arc<dyn EphemerisProvider>,
}

impl Ephemeris {
    pub fn new(provider: Arc<dyn EphemerisProvider>) -> Self {
        Ephemeris { provider }
    }

    pub fn provider(&self) -> &dyn EphemerisProvider {
        self.provider.as_ref()
    }

    /// First and last calendar days covered by the provider.
    pub fn coverage(&self) -> (CalendarDate, CalendarDate) {
        self.provider.coverage()
    }

    /// Fail with [`SkyPathError::EphemerisRange`] unless `[first, last]` lies within coverage.
    pub fn check_coverage(&self, first: &Instant, last: &Instant) -> Result<(), SkyPathError> {
        let (min, max) = self.coverage();
        let start = Instant::from_calendar(min.year, min.month, min.day, 0, 0, 0.0);
        let end = Instant::from_calendar(max.year, max.month, max.day, 0, 0, 0.0).add_days(1.0);
        if *first < start || *last > end {
            return Err(SkyPathError::EphemerisRange { min, max });
        }
        Ok(())
    }

    /// Earth position (AU) and velocity (AU/day) at `jd_tdb`.
    fn earth_state(&self, jd_tdb: JulianDay) -> Result<(Vector3<f64>, Vector3<f64>), SkyPathError> {
        let position = self.provider.position(Body::Earth, jd_tdb)?;
        let before = self.provider.position(Body::Earth, jd_tdb - VELOCITY_STEP)?;
        let after = self.provider.position(Body::Earth, jd_tdb + VELOCITY_STEP)?;
        Ok((position, (after - before) / (2.0 * VELOCITY_STEP)))
    }

    /// Geocentric astrometric vector (J2000 frame): AU for bodies, unit vector for stars.
    fn astrometric_vector(
        &self,
        target: &SkyObject,
        instant: &Instant,
        earth: &Vector3<f64>,
    ) -> Result<Vector3<f64>, SkyPathError> {
        let jd_tdb = instant.tdb();
        match target {
            SkyObject::Star(star) => Ok(star.unit_vector(instant.tt())),
            SkyObject::Body(body) => {
                // light time: the body is seen where it was when the light left it
                let mut light_time = 0.0;
                let mut relative = Vector3::zeros();
                for _ in 0..3 {
                    relative = self.provider.position(*body, jd_tdb - light_time)? - earth;
                    light_time = relative.norm() / VLIGHT_AU;
                }
                Ok(relative)
            }
        }
    }

    /// Astrometric right ascension and declination (J2000/ICRF), degrees.
    ///
    /// Arguments
    /// ---------
    /// * `target`: resolved body or star.
    /// * `instant`: UT1 instant of observation.
    ///
    /// Return
    /// ------
    /// * `(ra, dec)` in degrees, `ra` in [0, 360).
    pub fn position_of(&self, target: &SkyObject, instant: &Instant) -> Result<(Degree, Degree), SkyPathError> {
        let earth = self.provider.position(Body::Earth, instant.tdb())?;
        let v = self.astrometric_vector(target, instant, &earth)?;
        let (ra, dec, _) = cartesian_to_radec(v);
        Ok((ra / RADEG, dec / RADEG))
    }

    /// Geocentric apparent vector referred to the true equator and equinox of date.
    fn apparent_vector(&self, target: &SkyObject, instant: &Instant) -> Result<Vector3<f64>, SkyPathError> {
        let (earth, velocity) = self.earth_state(instant.tdb())?;
        let astrometric = self.astrometric_vector(target, instant, &earth)?;

        // stars carry a unit vector: scale so the aberration uses the light-time of one AU
        let aberrated = match target {
            SkyObject::Star(_) => correct_aberration(astrometric, velocity),
            SkyObject::Body(_) => {
                let unit = astrometric.normalize();
                correct_aberration(unit, velocity).normalize() * astrometric.norm()
            }
        };
        Ok(precession_nutation_matrix(instant.tt()) * aberrated)
    }

    /// Apparent geocentric right ascension and declination of date, degrees.
    pub fn apparent_radec(&self, target: &SkyObject, instant: &Instant) -> Result<(Degree, Degree), SkyPathError> {
        let (ra, dec, _) = cartesian_to_radec(self.apparent_vector(target, instant)?);
        Ok((ra / RADEG, dec / RADEG))
    }

    /// Apparent geocentric ecliptic longitude and latitude on the true ecliptic of date, degrees.
    pub fn apparent_ecliptic(&self, target: &SkyObject, instant: &Instant) -> Result<(Degree, Degree), SkyPathError> {
        let ecliptic = equatorial_to_ecliptic(true_obliquity(instant.tt())) * self.apparent_vector(target, instant)?;
        let (lon, lat, _) = cartesian_to_radec(ecliptic);
        Ok((lon / RADEG, lat / RADEG))
    }

    /// Topocentric altitude and azimuth without refraction, degrees.
    ///
    /// Arguments
    /// ---------
    /// * `target`: resolved body or star.
    /// * `instant`: UT1 instant of observation.
    /// * `location`: observer on the Earth's surface.
    ///
    /// Return
    /// ------
    /// * [`HorizontalCoordinates`] with `alt` in [−90, 90] and `az` in [0, 360).
    pub fn apparent_altaz(
        &self,
        target: &SkyObject,
        instant: &Instant,
        location: &ObserverLocation,
    ) -> Result<HorizontalCoordinates, SkyPathError> {
        let latitude = location.latitude() * RADEG;
        let local_sidereal = gast(instant) + location.longitude() * RADEG;

        let mut apparent = self.apparent_vector(target, instant)?;
        if let SkyObject::Body(_) = target {
            // diurnal parallax: shift the origin to the observer
            let (sl, cl) = local_sidereal.sin_cos();
            let (sp, cp) = latitude.sin_cos();
            apparent -= Vector3::new(cp * cl, cp * sl, sp) * EARTH_RADIUS_AU;
        }

        let (ra, dec, _) = cartesian_to_radec(apparent);
        let (alt, az) = equatorial_to_horizontal(local_sidereal - ra, dec, latitude);
        Ok(HorizontalCoordinates {
            alt: alt / RADEG,
            az: az / RADEG,
        })
    }

    /// Local hour angle of the target, radians in (−π, π].
    pub fn hour_angle(
        &self,
        target: &SkyObject,
        instant: &Instant,
        location: &ObserverLocation,
    ) -> Result<f64, SkyPathError> {
        let (ra, _, _) = cartesian_to_radec(self.apparent_vector(target, instant)?);
        let h = (gast(instant) + location.longitude() * RADEG - ra).rem_euclid(DPI);
        Ok(if h > std::f64::consts::PI { h - DPI } else { h })
    }
}

#[cfg(test)]
mod apparent_test {
    use super::*;
    use crate::ephemeris::{keplerian::KeplerianEphemeris, FixedStar};
    use approx::assert_abs_diff_eq;

    fn ephemeris() -> Ephemeris {
        Ephemeris::new(Arc::new(KeplerianEphemeris::new()))
    }

    #[test]
    fn test_sun_position_at_equinox() {
        // 2000 vernal equinox, astrometric RA ≈ 0.0062°, Dec ≈ 0.0028°
        let eph = ephemeris();
        let t = Instant::from_calendar(2000, 3, 20, 7, 35, 14.6175);
        let (ra, dec) = eph.position_of(&SkyObject::Body(Body::Sun), &t).unwrap();
        let ra = if ra > 180.0 { ra - 360.0 } else { ra };
        assert_abs_diff_eq!(ra, 0.0062, epsilon = 0.02);
        assert_abs_diff_eq!(dec, 0.0028, epsilon = 0.01);

        let (lon, lat) = eph.apparent_ecliptic(&SkyObject::Body(Body::Sun), &t).unwrap();
        let lon = if lon > 180.0 { lon - 360.0 } else { lon };
        assert_abs_diff_eq!(lon, 0.0, epsilon = 0.02);
        assert_abs_diff_eq!(lat, 0.0, epsilon = 0.002);
    }

    #[test]
    fn test_polaris_altitude() {
        // Polaris sits within a degree of the pole: altitude ≈ latitude
        let eph = ephemeris();
        let polaris = SkyObject::Star(FixedStar::new(37.94614689, 89.26413805));
        let loc = ObserverLocation::new(45.0, 7.0).unwrap();
        for hours in [0.0, 6.0, 12.0, 18.0] {
            let t = Instant::from_calendar(2024, 1, 1, 0, 0, 0.0).add_days(hours / 24.0);
            let hz = eph.apparent_altaz(&polaris, &t, &loc).unwrap();
            assert!((hz.alt - 45.0).abs() < 1.0, "{hz:?}");
            assert!(hz.az < 2.0 || hz.az > 358.0, "{hz:?}");
        }
    }

    #[test]
    fn test_meridian_altitude() {
        let eph = ephemeris();
        let vega = SkyObject::Star(FixedStar::new(279.23410832, 38.78299311));
        let loc = ObserverLocation::new(40.0, -75.0).unwrap();
        let mut t = Instant::from_calendar(2024, 7, 1, 0, 0, 0.0);
        // walk to the upper culmination with the hour angle
        for _ in 0..5 {
            let h = eph.hour_angle(&vega, &t, &loc).unwrap();
            t = t.add_days(-h / std::f64::consts::TAU / 1.002_737_909);
        }
        let hz = eph.apparent_altaz(&vega, &t, &loc).unwrap();
        // 90 − 40 + δ(of date) ≈ 88.8°, north of the zenith
        assert_abs_diff_eq!(hz.alt, 88.8, epsilon = 0.05);
        assert!(hz.az < 1.0 || hz.az > 359.0);
    }

    #[test]
    fn test_check_coverage() {
        let eph = ephemeris();
        let ok = Instant::from_calendar(-2999, 1, 1, 0, 0, 0.0);
        assert!(eph.check_coverage(&ok, &ok.add_days(365.0)).is_ok());

        let early = Instant::from_calendar(-3000, 1, 1, 0, 0, 0.0);
        let err = eph.check_coverage(&early, &early.add_days(365.0)).unwrap_err();
        assert!(err.is_range());
        assert_eq!(
            err.to_string(),
            "Out of the ephemeris date range: -2999-01-01/+3000-01-01"
        );
    }
}
