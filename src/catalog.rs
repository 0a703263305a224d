//! # Hipparcos star catalogue
//!
//! Read-only lookup of catalogue stars by Hipparcos number or by proper name.
//!
//! ## Overview
//!
//! The catalogue is the Hipparcos main file (`hip_main.dat`, ESA 1997), a pipe-separated
//! record per star. Only the fields needed to place a star on the sky are kept:
//!
//! | field | index | content                                   |
//! |-------|-------|-------------------------------------------|
//! | HIP   | 1     | catalogue number                          |
//! | Vmag  | 5     | visual magnitude                          |
//! | RAdeg | 8     | right ascension, ICRS, epoch J1991.25     |
//! | DEdeg | 9     | declination, ICRS, epoch J1991.25         |
//! | Plx   | 11    | parallax, mas                             |
//! | pmRA  | 12    | μα·cos δ, mas/yr                          |
//! | pmDE  | 13    | μδ, mas/yr                                |
//!
//! Empty fields are kept as `None`: about 260 entries have no astrometric solution, and
//! looking one of them up yields [`SkyPathError::CatalogNoData`], which is distinct from
//! [`SkyPathError::CatalogEntryNotFound`].
//!
//! Proper names come from a separate two-column CSV (`hip,name`).
//!
//! ## See also
//! ------------
//! * [`crate::target::CelestialTarget`] – selector resolved against this catalogue.
//! * [`crate::ephemeris::FixedStar`] – what a lookup returns.
use std::collections::HashMap;
use std::io::Read;

use camino::Utf8Path;
use serde::Deserialize;

use crate::{
    constants::{Degree, HIP_MAX, HIP_MIN, J1991_25},
    ephemeris::FixedStar,
    skypath_errors::SkyPathError,
};

/// One Hipparcos record.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStar {
    pub hip: u32,
    pub vmag: Option<f64>,
    pub ra: Option<Degree>,
    pub dec: Option<Degree>,
    pub parallax_mas: Option<f64>,
    pub pm_ra_mas_per_year: Option<f64>,
    pub pm_dec_mas_per_year: Option<f64>,
}

impl CatalogStar {
    /// Star position at the catalogue epoch, with proper motion when the record has one.
    pub fn fixed_star(&self) -> Result<FixedStar, SkyPathError> {
        let (Some(ra), Some(dec)) = (self.ra, self.dec) else {
            return Err(SkyPathError::CatalogNoData(self.hip));
        };
        Ok(FixedStar::new(ra, dec).with_proper_motion(
            self.pm_ra_mas_per_year.unwrap_or(0.0),
            self.pm_dec_mas_per_year.unwrap_or(0.0),
            J1991_25,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct NameRecord {
    hip: u32,
    name: String,
}

/// In-memory Hipparcos catalogue with an optional proper-name table.
#[derive(Debug, Clone, Default)]
pub struct StarCatalog {
    stars: HashMap<u32, CatalogStar>,
    names: HashMap<u32, String>,
    numbers: HashMap<String, u32>,
}

fn optional_field(field: Option<&str>) -> Result<Option<f64>, SkyPathError> {
    match field.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|e| SkyPathError::CatalogParse(format!("'{s}': {e}"))),
    }
}

/// Parse a single `hip_main.dat` record.
///
/// Return
/// ------
/// * `Ok(None)` for blank lines, `Err(CatalogParse)` when the HIP number or a numeric
///   field is malformed.
fn parse_record(line: &str) -> Result<Option<CatalogStar>, SkyPathError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 14 {
        return Err(SkyPathError::CatalogParse(format!(
            "expected at least 14 fields, got {}",
            fields.len()
        )));
    }

    let hip = fields[1]
        .trim()
        .parse::<u32>()
        .map_err(|e| SkyPathError::CatalogParse(format!("HIP '{}': {e}", fields[1].trim())))?;

    Ok(Some(CatalogStar {
        hip,
        vmag: optional_field(fields.get(5).copied())?,
        ra: optional_field(fields.get(8).copied())?,
        dec: optional_field(fields.get(9).copied())?,
        parallax_mas: optional_field(fields.get(11).copied())?,
        pm_ra_mas_per_year: optional_field(fields.get(12).copied())?,
        pm_dec_mas_per_year: optional_field(fields.get(13).copied())?,
    }))
}

impl StarCatalog {
    /// Build a catalogue from the text of a `hip_main.dat` file.
    pub fn from_hipparcos_str(data: &str) -> Result<Self, SkyPathError> {
        let mut stars = HashMap::new();
        for line in data.lines() {
            if let Some(star) = parse_record(line)? {
                stars.insert(star.hip, star);
            }
        }
        tracing::debug!(entries = stars.len(), "Hipparcos catalogue loaded");
        Ok(StarCatalog {
            stars,
            ..Default::default()
        })
    }

    /// Read and parse a `hip_main.dat` file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, SkyPathError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_hipparcos_str(&data)
    }

    /// Attach a `hip,name` table read from any reader (header row required).
    pub fn with_names<R: Read>(mut self, reader: R) -> Result<Self, SkyPathError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        for record in csv_reader.deserialize::<NameRecord>() {
            let record = record?;
            let name = record.name.trim().to_string();
            self.numbers.insert(name.to_lowercase(), record.hip);
            self.names.insert(record.hip, name);
        }
        Ok(self)
    }

    /// Attach a `hip,name` table from a CSV file.
    pub fn with_names_file(self, path: &Utf8Path) -> Result<Self, SkyPathError> {
        let file = std::fs::File::open(path)?;
        self.with_names(file)
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Raw record for `hip`, if present.
    pub fn entry(&self, hip: u32) -> Option<&CatalogStar> {
        self.stars.get(&hip)
    }

    /// Resolve a Hipparcos number to a star position.
    ///
    /// Arguments
    /// ---------
    /// * `hip`: Hipparcos catalogue number.
    ///
    /// Return
    /// ------
    /// * `Err(CatalogNumberOutOfRange)` outside `[1, 118322]`.
    /// * `Err(CatalogEntryNotFound)` when the number has no record.
    /// * `Err(CatalogNoData)` when the record has no RA/Dec.
    pub fn lookup(&self, hip: u32) -> Result<FixedStar, SkyPathError> {
        if !(HIP_MIN..=HIP_MAX).contains(&hip) {
            return Err(SkyPathError::CatalogNumberOutOfRange {
                min: HIP_MIN,
                max: HIP_MAX,
            });
        }
        self.stars
            .get(&hip)
            .ok_or(SkyPathError::CatalogEntryNotFound(hip))?
            .fixed_star()
    }

    /// Proper name of a star, if the name table lists it.
    pub fn name_of(&self, hip: u32) -> Option<&str> {
        self.names.get(&hip).map(String::as_str)
    }

    /// Resolve a proper name (case-insensitive) to its Hipparcos number and position.
    pub fn by_name(&self, name: &str) -> Result<(u32, FixedStar), SkyPathError> {
        let hip = *self
            .numbers
            .get(&name.trim().to_lowercase())
            .ok_or_else(|| SkyPathError::UnknownStarName(name.to_string()))?;
        Ok((hip, self.lookup(hip)?))
    }
}

#[cfg(test)]
mod catalog_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SAMPLE: &str = "\
H|       91262| |18 36 56.19|+38 46 58.8| 0.03| |G|279.23410832|+38.78299311| |  128.93|  201.02|  286.46|
H|       32349| |06 45 09.25|-16 42 47.3|-1.44| |G|101.28854105|-16.71314306| |  379.21| -546.01|-1223.08|
H|      120000| |           |           |     | | |            |            | |        |        |        |
H|       53020| |10 50 52.00|+06 48 29.0|11.99| | |            |            | |        |        |        |
";

    const NAMES: &str = "hip,name\n91262,Vega\n32349,Sirius\n";

    #[test]
    fn test_parse_sample() {
        let catalog = StarCatalog::from_hipparcos_str(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 4);

        let vega = catalog.lookup(91262).unwrap();
        assert_abs_diff_eq!(vega.ra, 279.23410832, epsilon = 1e-12);
        assert_abs_diff_eq!(vega.dec, 38.78299311, epsilon = 1e-12);
        assert_abs_diff_eq!(vega.pm_dec_mas_per_year, 286.46, epsilon = 1e-12);
        assert_eq!(vega.epoch, J1991_25);

        let entry = catalog.entry(32349).unwrap();
        assert_eq!(entry.vmag, Some(-1.44));
        assert_eq!(entry.parallax_mas, Some(379.21));
    }

    #[test]
    fn test_lookup_errors() {
        let catalog = StarCatalog::from_hipparcos_str(SAMPLE).unwrap();
        let out_of_range = SkyPathError::CatalogNumberOutOfRange { min: 1, max: 118322 };
        assert_eq!(catalog.lookup(0).unwrap_err(), out_of_range);
        assert_eq!(catalog.lookup(118323).unwrap_err(), out_of_range);
        assert_eq!(
            catalog.lookup(2).unwrap_err(),
            SkyPathError::CatalogEntryNotFound(2)
        );
        assert_eq!(
            catalog.lookup(53020).unwrap_err(),
            SkyPathError::CatalogNoData(53020)
        );
    }

    #[test]
    fn test_names() {
        let catalog = StarCatalog::from_hipparcos_str(SAMPLE)
            .unwrap()
            .with_names(NAMES.as_bytes())
            .unwrap();
        assert_eq!(catalog.name_of(91262), Some("Vega"));
        assert_eq!(catalog.name_of(53020), None);

        let (hip, star) = catalog.by_name("sirius").unwrap();
        assert_eq!(hip, 32349);
        assert_abs_diff_eq!(star.dec, -16.71314306, epsilon = 1e-12);

        assert_eq!(
            catalog.by_name("Nemesis").unwrap_err(),
            SkyPathError::UnknownStarName("Nemesis".into())
        );
    }

    #[test]
    fn test_malformed_record() {
        let err = StarCatalog::from_hipparcos_str("H|abc| | | | | | | | | | | | |").unwrap_err();
        assert!(matches!(err, SkyPathError::CatalogParse(_)));

        let err = StarCatalog::from_hipparcos_str("H|12|short").unwrap_err();
        assert!(matches!(err, SkyPathError::CatalogParse(_)));
    }
}
