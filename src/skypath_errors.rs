use thiserror::Error;

use crate::time::CalendarDate;

#[derive(Error, Debug)]
pub enum SkyPathError {
    #[error("Invalid planet name: {0}")]
    InvalidPlanetName(String),

    #[error("The Hipparchus Catalogue number must be in the range [{min}, {max}].")]
    CatalogNumberOutOfRange { min: u32, max: u32 },

    #[error("Invalid Hipparchus Catalogue number.")]
    CatalogEntryNotFound(u32),

    #[error("No RA/Dec data available for this star in the Hipparcos Catalogue.")]
    CatalogNoData(u32),

    #[error("Unknown star name: {0}")]
    UnknownStarName(String),

    #[error("Invalid celestial object.")]
    InvalidCelestialObject,

    #[error("This star never rises at this location on this date.")]
    NeverRises,

    #[error("Out of the ephemeris date range: {min}/{max}")]
    EphemerisRange {
        min: CalendarDate,
        max: CalendarDate,
    },

    #[error("Out of the year range: {min:+}/{max:+}")]
    YearOutOfRange { min: i32, max: i32 },

    #[error("Invalid date: [year, month, day] = [{0}, {1}, {2}]")]
    InvalidDate(i32, u32, u32),

    #[error("Invalid time: {0}:{1}:{2}")]
    InvalidTime(u32, u32, f64),

    #[error("Month index out of range.")]
    MonthOutOfRange,

    #[error("Invalid observer location: {0}")]
    InvalidLocation(String),

    #[error("Unknown timezone identifier: {0}")]
    UnknownTimezone(String),

    #[error("Invalid search parameter: {0}")]
    InvalidSearchParameter(String),

    #[error("ROOTS finding error: {0}")]
    RootFindingError(#[from] roots::SearchError),

    #[error("Solver did not converge: {0}")]
    SolverDidNotConverge(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid Hipparcos catalogue record: {0}")]
    CatalogParse(String),

    #[error("Star name table error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid JPL ephemeris file: {0}")]
    EphemerisFile(String),

    #[error("No ephemeris segment for NAIF body {target} at ET {et_seconds} s")]
    MissingEphemerisSegment { target: i32, et_seconds: f64 },
}

impl SkyPathError {
    /// Malformed input detected before any numerical search.
    pub fn is_validation(&self) -> bool {
        use SkyPathError::*;
        matches!(
            self,
            InvalidPlanetName(_)
                | CatalogNumberOutOfRange { .. }
                | InvalidCelestialObject
                | InvalidDate(..)
                | InvalidTime(..)
                | MonthOutOfRange
                | InvalidLocation(_)
                | UnknownTimezone(_)
                | InvalidSearchParameter(_)
                | UnknownStarName(_)
        )
    }

    /// Requested instant outside the span covered by the ephemeris.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            SkyPathError::EphemerisRange { .. } | SkyPathError::YearOutOfRange { .. }
        )
    }

    /// Legitimate astronomical outcome, not a malformed request.
    pub fn is_domain(&self) -> bool {
        matches!(self, SkyPathError::NeverRises)
    }

    /// Catalogue entry exists (or was expected) but cannot be used.
    pub fn is_catalog(&self) -> bool {
        matches!(
            self,
            SkyPathError::CatalogEntryNotFound(_) | SkyPathError::CatalogNoData(_)
        )
    }
}

impl PartialEq for SkyPathError {
    fn eq(&self, other: &Self) -> bool {
        use SkyPathError::*;
        match (self, other) {
            (InvalidPlanetName(a), InvalidPlanetName(b)) => a == b,
            (
                CatalogNumberOutOfRange { min: a, max: b },
                CatalogNumberOutOfRange { min: c, max: d },
            ) => a == c && b == d,
            (CatalogEntryNotFound(a), CatalogEntryNotFound(b)) => a == b,
            (CatalogNoData(a), CatalogNoData(b)) => a == b,
            (UnknownStarName(a), UnknownStarName(b)) => a == b,
            (EphemerisRange { min: a, max: b }, EphemerisRange { min: c, max: d }) => {
                a == c && b == d
            }
            (YearOutOfRange { min: a, max: b }, YearOutOfRange { min: c, max: d }) => {
                a == c && b == d
            }
            (InvalidDate(a, b, c), InvalidDate(d, e, f)) => a == d && b == e && c == f,
            (InvalidTime(a, b, c), InvalidTime(d, e, f)) => a == d && b == e && c == f,
            (InvalidLocation(a), InvalidLocation(b)) => a == b,
            (UnknownTimezone(a), UnknownTimezone(b)) => a == b,
            (InvalidSearchParameter(a), InvalidSearchParameter(b)) => a == b,
            (RootFindingError(a), RootFindingError(b)) => a == b,
            (SolverDidNotConverge(a), SolverDidNotConverge(b)) => a == b,
            (CatalogParse(a), CatalogParse(b)) => a == b,
            (EphemerisFile(a), EphemerisFile(b)) => a == b,
            (
                MissingEphemerisSegment {
                    target: a,
                    et_seconds: b,
                },
                MissingEphemerisSegment {
                    target: c,
                    et_seconds: d,
                },
            ) => a == c && b == d,

            // not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (InvalidCelestialObject, InvalidCelestialObject) => true,
            (NeverRises, NeverRises) => true,
            (MonthOutOfRange, MonthOutOfRange) => true,

            _ => false,
        }
    }
}
