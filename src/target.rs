//! # Celestial target selection
//!
//! A [`CelestialTarget`] names what the star-path diagram follows: a planet from a fixed
//! allow-list, a Hipparcos catalogue entry, or an arbitrary fixed RA/Dec pair. Resolution
//! against a [`StarCatalog`] yields the [`SkyObject`] the ephemeris facade works with.
//!
//! Selectors parse from strings:
//!
//! ```text
//! mars                  planet
//! hip:91262, HIP 91262  Hipparcos number
//! radec:18.6156,38.78   RA in hours, Dec in degrees
//! ```
use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    catalog::StarCatalog,
    constants::{Degree, Hour, HIP_MAX, HIP_MIN},
    ephemeris::{Body, FixedStar, SkyObject},
    skypath_errors::SkyPathError,
};

static HIP_SELECTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)hip\s*[:\s]\s*(\d+)$").expect("static selector regex")
});

static RADEC_SELECTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)radec\s*:\s*([+-]?\d+(?:\.\d*)?)\s*,\s*([+-]?\d+(?:\.\d*)?)$")
        .expect("static selector regex")
});

/// What to follow across the sky.
#[derive(Debug, Clone, PartialEq)]
pub enum CelestialTarget {
    /// Lower-case planet name from the allow-list.
    Planet(String),
    /// Hipparcos catalogue number.
    Catalog(u32),
    /// Fixed ICRS position, right ascension in hours.
    FixedRaDec { ra_hours: Hour, dec: Degree },
}

/// Ephemeris body for an allowed planet name.
///
/// Mercury, Venus and Mars are tabulated directly; the outer planets and Pluto through
/// their system barycenters.
pub fn planet_body(name: &str) -> Result<Body, SkyPathError> {
    match name {
        "mercury" => Ok(Body::Mercury),
        "venus" => Ok(Body::Venus),
        "mars" => Ok(Body::Mars),
        "jupiter" => Ok(Body::JupiterBarycenter),
        "saturn" => Ok(Body::SaturnBarycenter),
        "uranus" => Ok(Body::UranusBarycenter),
        "neptune" => Ok(Body::NeptuneBarycenter),
        "pluto" => Ok(Body::PlutoBarycenter),
        _ => Err(SkyPathError::InvalidPlanetName(name.to_string())),
    }
}

impl CelestialTarget {
    /// A planet target, validated against the allow-list.
    pub fn planet(name: &str) -> Result<Self, SkyPathError> {
        planet_body(name)?;
        Ok(CelestialTarget::Planet(name.to_string()))
    }

    /// Build a target from the three optional selectors of a request.
    ///
    /// Arguments
    /// ---------
    /// * `name`: planet name.
    /// * `hip`: Hipparcos number.
    /// * `radec`: `(ra_hours, dec_degrees)`.
    ///
    /// Return
    /// ------
    /// * `Err(InvalidCelestialObject)` unless exactly one selector is given.
    /// * `Err(InvalidPlanetName)` for a name outside the allow-list.
    pub fn from_selector(
        name: Option<&str>,
        hip: Option<u32>,
        radec: Option<(Hour, Degree)>,
    ) -> Result<Self, SkyPathError> {
        match (name, hip, radec) {
            (Some(name), None, None) => Self::planet(name),
            (None, Some(hip), None) => Ok(CelestialTarget::Catalog(hip)),
            (None, None, Some((ra_hours, dec))) => Ok(CelestialTarget::FixedRaDec { ra_hours, dec }),
            _ => Err(SkyPathError::InvalidCelestialObject),
        }
    }

    /// Resolve to a body or a star position.
    pub fn resolve(&self, catalog: &StarCatalog) -> Result<SkyObject, SkyPathError> {
        match self {
            CelestialTarget::Planet(name) => Ok(SkyObject::Body(planet_body(name)?)),
            CelestialTarget::Catalog(hip) => Ok(SkyObject::Star(catalog.lookup(*hip)?)),
            CelestialTarget::FixedRaDec { ra_hours, dec } => {
                if !ra_hours.is_finite() || !dec.is_finite() || !(-90.0..=90.0).contains(dec) {
                    return Err(SkyPathError::InvalidCelestialObject);
                }
                Ok(SkyObject::Star(FixedStar::from_hours(*ra_hours, *dec)))
            }
        }
    }
}

impl FromStr for CelestialTarget {
    type Err = SkyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(caps) = HIP_SELECTOR.captures(s) {
            let hip = caps[1]
                .parse::<u32>()
                .map_err(|_| SkyPathError::CatalogNumberOutOfRange {
                    min: HIP_MIN,
                    max: HIP_MAX,
                })?;
            return Ok(CelestialTarget::Catalog(hip));
        }
        if let Some(caps) = RADEC_SELECTOR.captures(s) {
            let parse = |m: &str| m.parse::<f64>().map_err(|_| SkyPathError::InvalidCelestialObject);
            return Ok(CelestialTarget::FixedRaDec {
                ra_hours: parse(&caps[1])?,
                dec: parse(&caps[2])?,
            });
        }
        if s.is_empty() {
            return Err(SkyPathError::InvalidCelestialObject);
        }
        Self::planet(&s.to_lowercase())
    }
}

impl fmt::Display for CelestialTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CelestialTarget::Planet(name) => write!(f, "{name}"),
            CelestialTarget::Catalog(hip) => write!(f, "HIP {hip}"),
            CelestialTarget::FixedRaDec { ra_hours, dec } => {
                write!(f, "RA/Dec: {ra_hours:.3}/{dec:.3}")
            }
        }
    }
}
