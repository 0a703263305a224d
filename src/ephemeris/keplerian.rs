//! # Analytic planetary ephemeris
//!
//! [`KeplerianEphemeris`] evaluates the JPL mean orbital elements fitted over
//! 3000 BC – 3000 AD (E. M. Standish, *Keplerian Elements for Approximate Positions of the
//! Major Planets*), including the extra mean-anomaly terms of the outer planets. The Earth is
//! recovered from the Earth–Moon barycenter with a low-precision lunar theory.
//!
//! This is an approximate fallback for when no JPL kernel is available, not a substitute for
//! one. Typical errors are a few tens of arcseconds for the inner planets and the Sun, and up
//! to several arcminutes for the outer planets: about a minute of time on rise, set and
//! transit, and up to ten minutes on the equinoxes and solstices. The reported coverage is
//! the fit interval of the elements, 1 January 3000 BC to 1 January 3000 AD.
//!
//! ## See also
//! ------------
//! * [`super::spk::SpkEphemeris`] – the DE406 provider used for reference results.
use nalgebra::Vector3;
use roots::{find_root_newton_raphson, SimpleConvergency};

use crate::{
    constants::{JulianDay, DAYS_PER_CENTURY, EARTH_MOON_MASS_RATIO, J2000, RADEG},
    earth_orientation::obleq,
    ephemeris::{Body, EphemerisProvider},
    ref_system::{ecliptic_to_equatorial, radec_to_unit},
    skypath_errors::SkyPathError,
    time::{horner, CalendarDate},
};

/// Fit interval of the mean elements.
const FIT_FIRST_DAY: (i32, u32, u32) = (-2999, 1, 1);
const FIT_LAST_DAY: (i32, u32, u32) = (3000, 1, 1);

/// Earth equatorial radius in AU, scale of the lunar parallax.
const EARTH_RADIUS_AU: f64 = 6378.14 / crate::constants::AU;

/// Mean elements at J2000 and their rates per Julian century.
///
/// `[a (AU), e, I (deg), L (deg), ϖ (deg), Ω (deg)]`
struct MeanElements {
    base: [f64; 6],
    rate: [f64; 6],
    /// `b, c, s, f` corrections to the mean anomaly (degrees, f in degrees per century).
    extra: Option<[f64; 4]>,
}

#[rustfmt::skip]
const MERCURY: MeanElements = MeanElements {
    base: [0.38709843, 0.20563661, 7.00559432, 252.25166724, 77.45771895, 48.33961819],
    rate: [0.00000000, 0.00002123, -0.00590158, 149472.67486623, 0.15940013, -0.12214182],
    extra: None,
};

#[rustfmt::skip]
const VENUS: MeanElements = MeanElements {
    base: [0.72332102, 0.00676399, 3.39777545, 181.97970850, 131.76755713, 76.67261496],
    rate: [-0.00000026, -0.00005107, 0.00043494, 58517.81560260, 0.05679648, -0.27274174],
    extra: None,
};

#[rustfmt::skip]
const EM_BARYCENTER: MeanElements = MeanElements {
    base: [1.00000018, 0.01673163, -0.00054346, 100.46691572, 102.93005885, -5.11260389],
    rate: [-0.00000003, -0.00003661, -0.01337178, 35999.37306329, 0.31795260, -0.24123856],
    extra: None,
};

#[rustfmt::skip]
const MARS: MeanElements = MeanElements {
    base: [1.52371243, 0.09336511, 1.85181869, -4.56813164, -23.91744784, 49.71320984],
    rate: [0.00000097, 0.00009149, -0.00724757, 19140.29934243, 0.45223625, -0.26852431],
    extra: None,
};

#[rustfmt::skip]
const JUPITER: MeanElements = MeanElements {
    base: [5.20248019, 0.04853590, 1.29861416, 34.33479152, 14.27495244, 100.29282654],
    rate: [-0.00002864, 0.00018026, -0.00322699, 3034.90371757, 0.18199196, 0.13024619],
    extra: Some([-0.00012452, 0.06064060, -0.35635438, 38.35125000]),
};

#[rustfmt::skip]
const SATURN: MeanElements = MeanElements {
    base: [9.54149883, 0.05550825, 2.49424102, 50.07571329, 92.86136063, 113.63998702],
    rate: [-0.00003065, -0.00032044, 0.00451969, 1222.11494724, 0.54179478, -0.25015002],
    extra: Some([0.00025899, -0.13434469, 0.87320147, 38.35125000]),
};

#[rustfmt::skip]
const URANUS: MeanElements = MeanElements {
    base: [19.18797948, 0.04685740, 0.77298127, 314.20276625, 172.43404441, 73.96250215],
    rate: [-0.00020455, -0.00001550, -0.00180155, 428.49512595, 0.09266985, 0.05739699],
    extra: Some([0.00058331, -0.97731848, 0.17689245, 7.67025000]),
};

#[rustfmt::skip]
const NEPTUNE: MeanElements = MeanElements {
    base: [30.06952752, 0.00895439, 1.77005520, 304.22289287, 46.68158724, 131.78635853],
    rate: [0.00006447, 0.00000818, 0.00022400, 218.46515314, 0.01009938, -0.00606302],
    extra: Some([-0.00041348, 0.68346318, -0.10162547, 7.67025000]),
};

#[rustfmt::skip]
const PLUTO: MeanElements = MeanElements {
    base: [39.48686035, 0.24885238, 17.14104260, 238.96535011, 224.09702598, 110.30167986],
    rate: [0.00449751, 0.00006016, 0.00000501, 145.18042903, -0.00968827, -0.00809981],
    extra: Some([-0.01262724, 0.0, 0.0, 0.0]),
};

/// Analytic ephemeris from mean Keplerian elements; heliocentric positions.
#[derive(Debug, Clone)]
pub struct KeplerianEphemeris {
    coverage: (CalendarDate, CalendarDate),
    kepler_eps: f64,
}

impl Default for KeplerianEphemeris {
    fn default() -> Self {
        KeplerianEphemeris {
            coverage: (FIT_FIRST_DAY.into(), FIT_LAST_DAY.into()),
            kepler_eps: 1e-12,
        }
    }
}

impl KeplerianEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the reported coverage, e.g. to mimic a shorter ephemeris file.
    pub fn with_coverage(mut self, first: CalendarDate, last: CalendarDate) -> Self {
        self.coverage = (first, last);
        self
    }

    /// Solve Kepler's equation `M = E − e·sin E` for the eccentric anomaly (radians).
    fn solve_kepler_equation(&self, mean_anomaly: f64, eccentricity: f64) -> Result<f64, SkyPathError> {
        let f = |e_anom: f64| e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let df = |e_anom: f64| 1.0 - eccentricity * e_anom.cos();

        let x0 = mean_anomaly + eccentricity * mean_anomaly.sin();
        let mut tol = SimpleConvergency {
            eps: self.kepler_eps,
            max_iter: 30,
        };
        Ok(find_root_newton_raphson(x0, &f, &df, &mut tol)?)
    }

    /// Heliocentric position in the J2000 ecliptic frame, AU.
    fn heliocentric_ecliptic(&self, elements: &MeanElements, jd_tdb: JulianDay) -> Result<Vector3<f64>, SkyPathError> {
        let t = (jd_tdb - J2000) / DAYS_PER_CENTURY;
        let el: [f64; 6] = std::array::from_fn(|i| elements.base[i] + elements.rate[i] * t);
        let [a, e, incl, mean_lon, peri_lon, node] = el;

        let mut mean_anomaly = mean_lon - peri_lon;
        if let Some([b, c, s, f]) = elements.extra {
            mean_anomaly += b * t * t + c * (f * t * RADEG).cos() + s * (f * t * RADEG).sin();
        }
        let mean_anomaly = ((mean_anomaly + 180.0).rem_euclid(360.0) - 180.0) * RADEG;

        let ecc_anomaly = self.solve_kepler_equation(mean_anomaly, e)?;
        let xp = a * (ecc_anomaly.cos() - e);
        let yp = a * (1.0 - e * e).sqrt() * ecc_anomaly.sin();

        let omega = (peri_lon - node) * RADEG;
        let (so, co) = omega.sin_cos();
        let (sn, cn) = (node * RADEG).sin_cos();
        let (si, ci) = (incl * RADEG).sin_cos();

        Ok(Vector3::new(
            (co * cn - so * sn * ci) * xp + (-so * cn - co * sn * ci) * yp,
            (co * sn + so * cn * ci) * xp + (-so * sn + co * cn * ci) * yp,
            (so * si) * xp + (co * si) * yp,
        ))
    }

    /// Geocentric Moon in the J2000 ecliptic frame, AU (Astronomical Almanac low-precision
    /// series, about 0.3° in longitude).
    fn geocentric_moon(jd_tdb: JulianDay) -> Vector3<f64> {
        let t = (jd_tdb - J2000) / DAYS_PER_CENTURY;
        let s = |a: f64, b: f64| ((a + b * t) * RADEG).sin();
        let c = |a: f64, b: f64| ((a + b * t) * RADEG).cos();

        let lon = 218.32 + 481267.881 * t + 6.29 * s(135.0, 477198.87)
            - 1.27 * s(259.3, -413335.36)
            + 0.66 * s(235.7, 890534.22)
            + 0.21 * s(269.9, 954397.74)
            - 0.19 * s(357.5, 35999.05)
            - 0.11 * s(186.5, 966404.03);
        let lat = 5.13 * s(93.3, 483202.02) + 0.28 * s(228.2, 960400.89)
            - 0.28 * s(318.3, 6003.15)
            - 0.17 * s(217.6, -407332.21);
        let parallax = 0.9508
            + 0.0518 * c(135.0, 477198.87)
            + 0.0095 * c(259.3, -413335.36)
            + 0.0078 * c(235.7, 890534.22)
            + 0.0028 * c(269.9, 954397.74);

        // longitude of date back to the J2000 equinox
        let lon_j2000 = lon - horner(t, &[0.0, 1.396971, 0.0003086]);
        let distance = EARTH_RADIUS_AU / (parallax * RADEG).sin();
        radec_to_unit(lon_j2000 * RADEG, lat * RADEG) * distance
    }

    fn earth_ecliptic(&self, jd_tdb: JulianDay) -> Result<Vector3<f64>, SkyPathError> {
        let emb = self.heliocentric_ecliptic(&EM_BARYCENTER, jd_tdb)?;
        Ok(emb - Self::geocentric_moon(jd_tdb) / (1.0 + EARTH_MOON_MASS_RATIO))
    }
}

impl EphemerisProvider for KeplerianEphemeris {
    fn position(&self, body: Body, jd_tdb: JulianDay) -> Result<Vector3<f64>, SkyPathError> {
        let ecliptic = match body {
            Body::Sun => return Ok(Vector3::zeros()),
            Body::Earth => self.earth_ecliptic(jd_tdb)?,
            Body::Mercury => self.heliocentric_ecliptic(&MERCURY, jd_tdb)?,
            Body::Venus => self.heliocentric_ecliptic(&VENUS, jd_tdb)?,
            Body::Mars => self.heliocentric_ecliptic(&MARS, jd_tdb)?,
            Body::JupiterBarycenter => self.heliocentric_ecliptic(&JUPITER, jd_tdb)?,
            Body::SaturnBarycenter => self.heliocentric_ecliptic(&SATURN, jd_tdb)?,
            Body::UranusBarycenter => self.heliocentric_ecliptic(&URANUS, jd_tdb)?,
            Body::NeptuneBarycenter => self.heliocentric_ecliptic(&NEPTUNE, jd_tdb)?,
            Body::PlutoBarycenter => self.heliocentric_ecliptic(&PLUTO, jd_tdb)?,
        };
        Ok(ecliptic_to_equatorial(obleq(J2000)) * ecliptic)
    }

    fn coverage(&self) -> (CalendarDate, CalendarDate) {
        self.coverage
    }
}

#[cfg(test)]
mod keplerian_test {
    use super::*;
    use crate::ref_system::cartesian_to_radec;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_kepler_equation() {
        let eph = KeplerianEphemeris::new();
        for (m, e) in [(0.3, 0.0), (1.0, 0.2), (-2.5, 0.25), (3.1, 0.0935)] {
            let ecc = eph.solve_kepler_equation(m, e).unwrap();
            assert_abs_diff_eq!(ecc - e * ecc.sin(), m, epsilon = 1e-11);
        }
    }

    #[test]
    fn test_earth_distance() {
        let eph = KeplerianEphemeris::new();
        // perihelion early January, aphelion early July
        let jan = eph.position(Body::Earth, 2_451_547.5).unwrap().norm();
        let jul = eph.position(Body::Earth, 2_451_730.5).unwrap().norm();
        assert_abs_diff_eq!(jan, 0.98333, epsilon = 2e-4);
        assert_abs_diff_eq!(jul, 1.01670, epsilon = 2e-4);
    }

    #[test]
    fn test_sun_longitude_j2000() {
        // geometric Sun at J2000.0: λ ≈ 280.37°
        let eph = KeplerianEphemeris::new();
        let earth = eph.position(Body::Earth, J2000).unwrap();
        let ecl = crate::ref_system::equatorial_to_ecliptic(obleq(J2000)) * (-earth);
        let (lon, lat, _) = cartesian_to_radec(ecl);
        assert_abs_diff_eq!(lon.to_degrees(), 280.37, epsilon = 0.02);
        assert_abs_diff_eq!(lat.to_degrees(), 0.0, epsilon = 0.001);
    }

    #[test]
    fn test_moon_distance() {
        let d = KeplerianEphemeris::geocentric_moon(2_460_000.5).norm() * crate::constants::AU;
        assert!((356_000.0..407_000.0).contains(&d), "{d} km");
    }

    #[test]
    fn test_outer_planet_distances() {
        let eph = KeplerianEphemeris::new();
        for (body, a) in [
            (Body::Mercury, 0.387),
            (Body::Mars, 1.524),
            (Body::JupiterBarycenter, 5.20),
            (Body::NeptuneBarycenter, 30.07),
            (Body::PlutoBarycenter, 39.5),
        ] {
            let r = eph.position(body, 2_460_000.5).unwrap().norm();
            assert!((r / a - 1.0).abs() < 0.26, "{body}: {r}");
        }
    }

    #[test]
    fn test_coverage() {
        let eph = KeplerianEphemeris::new();
        let (first, last) = eph.coverage();
        assert_eq!(first.to_string(), "-2999-01-01");
        assert_eq!(last.to_string(), "+3000-01-01");
    }
}
