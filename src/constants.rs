//! # Constants and type definitions for SkyPath
//!
//! This module centralizes the **physical constants**, **conversion factors**, **horizon and
//! twilight thresholds** and **common type aliases** used throughout the `skypath` library.
//!
//! ## Overview
//!
//! - Astronomical constants (speed of light, astronomical unit, J2000 epoch)
//! - Unit conversions (degrees ↔ radians, arcseconds, hours, days ↔ seconds)
//! - Altitude thresholds used by the rising/setting and twilight searches
//! - Validity bounds of the catalogue numbers and of the backing ephemeris
//!
//! These definitions are used by every numerical module: time conversion, reference frames,
//! the ephemeris facade and the event searches.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Julian Date of J2000.0 (2000-01-01 12:00:00 TT)
pub const J2000: f64 = 2_451_545.0;

/// Julian Date of the Hipparcos catalogue epoch J1991.25 (TT)
pub const J1991_25: f64 = 2_448_349.0625;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Hours → radians
pub const RADH: f64 = DPI / 24.0;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Speed of light in astronomical units per day
pub const VLIGHT_AU: f64 = VLIGHT / AU * SECONDS_PER_DAY;

/// Earth / Moon mass ratio (DE405)
pub const EARTH_MOON_MASS_RATIO: f64 = 81.300_56;

// -------------------------------------------------------------------------------------------------
// Horizon and twilight thresholds (degrees)
// -------------------------------------------------------------------------------------------------

/// Horizon depression used as the rising/setting threshold: 34' of standard refraction
/// plus a small angular radius allowance.
pub const HORIZON_DEPRESSION: Degree = -0.5666 - 0.008;

/// Altitude below which a point is considered hidden behind the horizon even after refraction.
pub const REFRACTION_LIMIT: Degree = -34.0 / 60.0;

/// Altitude of the Sun's centre at sunrise and sunset (refraction + solar semi-diameter).
pub const SUN_UP_ALTITUDE: Degree = -0.8333;

/// Lower bound of civil twilight.
pub const CIVIL_TWILIGHT: Degree = -6.0;

/// Lower bound of nautical twilight.
pub const NAUTICAL_TWILIGHT: Degree = -12.0;

/// Lower bound of astronomical twilight.
pub const ASTRONOMICAL_TWILIGHT: Degree = -18.0;

// -------------------------------------------------------------------------------------------------
// Validity ranges
// -------------------------------------------------------------------------------------------------

/// Smallest valid Hipparcos catalogue number
pub const HIP_MIN: u32 = 1;

/// Largest valid Hipparcos catalogue number
pub const HIP_MAX: u32 = 118_322;

/// First calendar day covered by the DE406 ephemeris (29 January 3001 BCE)
pub const EPH_DATE_MIN: (i32, u32, u32) = (-3000, 1, 29);

/// Last calendar day covered by the DE406 ephemeris (6 May 3000 CE)
pub const EPH_DATE_MAX: (i32, u32, u32) = (3000, 5, 6);

/// First full year covered by the DE406 ephemeris
pub const YEAR_MIN: i32 = -2999;

/// Last full year covered by the DE406 ephemeris
pub const YEAR_MAX: i32 = 2999;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Duration or angle in hours
pub type Hour = f64;
/// Julian Date (days)
pub type JulianDay = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
