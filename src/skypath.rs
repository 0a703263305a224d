//! # SkyPath: the computation context
//!
//! [`SkyPath`] owns everything a request needs and nothing a request changes:
//!
//! 1. **Ephemeris** ([`Ephemeris`]) over an injected [`EphemerisProvider`], normally the
//!    DE406 kernel read by [`SpkEphemeris`].
//! 2. **Star catalogue** ([`StarCatalog`]), either injected or loaded from a Hipparcos file on
//!    first use and cached in a [`OnceCell`].
//! 3. **Timezones** behind a [`TimezoneProvider`], standard offsets only, from the IANA
//!    database by default.
//! 4. **Search configuration** ([`SearchParams`]).
//!
//! A context is built once by the process entry point and shared read-only; it is
//! `Send + Sync`.
//!
//! ## Typical usage
//!
//! ```rust,no_run
//! use skypath::skypath::SkyPath;
//! use skypath::target::CelestialTarget;
//!
//! # fn main() -> Result<(), skypath::skypath_errors::SkyPathError> {
//! let sky = SkyPath::de406()?.with_catalog_file("data/hip_main.dat", Some("data/hip_names.csv"));
//!
//! let seasons = sky.compute_seasons(2024)?;
//! let vega: CelestialTarget = "hip:91262".parse()?;
//! let diagram = sky.compute_star_path(&vega, 39.9, 116.4, 2024, 1, 1, "Asia/Shanghai")?;
//! # Ok(())
//! # }
//! ```
//!
//! Without a kernel, [`SkyPath::keplerian`] gives an approximate context (minutes on the
//! seasons) that needs no data file.
//!
//! ## See also
//! ------------
//! * [`crate::seasons::find_seasons`] – equinox and solstice search.
//! * [`crate::star_path::compute_diagram`] – the star-path pipeline.
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;

use crate::{
    catalog::StarCatalog,
    ephemeris::{
        apparent::Ephemeris,
        keplerian::KeplerianEphemeris,
        spk::{kernel_path, SpkEphemeris, DEFAULT_KERNEL},
        EphemerisProvider,
    },
    format::validate_datetime,
    observer::ObserverLocation,
    search::SearchParams,
    seasons::{find_seasons, SeasonSet},
    skypath_errors::SkyPathError,
    star_path::{compute_diagram, DiagramResult},
    target::CelestialTarget,
    time::{CalendarDate, CalendarTuple},
    timezone::{IanaTimezones, TimezoneProvider},
};

/// Where the star catalogue comes from.
#[derive(Debug, Clone)]
enum CatalogSource {
    Empty,
    Files {
        main: Utf8PathBuf,
        names: Option<Utf8PathBuf>,
    },
}

#[derive(Debug)]
pub struct SkyPath {
    ephemeris: Ephemeris,
    catalog_source: CatalogSource,
    catalog: OnceCell<StarCatalog>,
    timezones: Arc<dyn TimezoneProvider>,
    params: SearchParams,
}

impl SkyPath {
    /// Construct a context over `provider` with IANA timezones, default search parameters and
    /// an empty star catalogue.
    pub fn new(provider: Arc<dyn EphemerisProvider>) -> Self {
        SkyPath {
            ephemeris: Ephemeris::new(provider),
            catalog_source: CatalogSource::Empty,
            catalog: OnceCell::new(),
            timezones: Arc::new(IanaTimezones::new()),
            params: SearchParams::default(),
        }
    }

    /// Context over the DE406 kernel, from the user cache (downloaded there with the
    /// `jpl-download` feature).
    pub fn de406() -> Result<Self, SkyPathError> {
        Self::from_ephemeris_file(kernel_path(DEFAULT_KERNEL, None)?)
    }

    /// Context over the SPK kernel at `path`.
    pub fn from_ephemeris_file(path: impl AsRef<Utf8Path>) -> Result<Self, SkyPathError> {
        Ok(Self::new(Arc::new(SpkEphemeris::from_file(path)?)))
    }

    /// Context over the analytic [`KeplerianEphemeris`]: approximate, for use when no kernel
    /// is available.
    pub fn keplerian() -> Self {
        Self::new(Arc::new(KeplerianEphemeris::new()))
    }

    /// Use an already loaded catalogue.
    pub fn with_catalog(mut self, catalog: StarCatalog) -> Self {
        self.catalog_source = CatalogSource::Empty;
        self.catalog = OnceCell::with_value(catalog);
        self
    }

    /// Load the catalogue lazily from a Hipparcos main file and an optional `hip,name` table.
    ///
    /// Nothing is read until a catalogue target is first resolved.
    pub fn with_catalog_file(
        mut self,
        main: impl AsRef<Utf8Path>,
        names: Option<impl AsRef<Utf8Path>>,
    ) -> Self {
        self.catalog_source = CatalogSource::Files {
            main: main.as_ref().to_owned(),
            names: names.map(|p| p.as_ref().to_owned()),
        };
        self.catalog = OnceCell::new();
        self
    }

    pub fn with_timezones(mut self, timezones: Arc<dyn TimezoneProvider>) -> Self {
        self.timezones = timezones;
        self
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    pub fn ephemeris(&self) -> &Ephemeris {
        &self.ephemeris
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Get the star catalogue, loading it on first call.
    ///
    /// Return
    /// ----------
    /// * the cached catalogue, or the I/O or parse error of the first load. A failed load is
    ///   retried on the next call.
    pub fn catalog(&self) -> Result<&StarCatalog, SkyPathError> {
        self.catalog.get_or_try_init(|| match &self.catalog_source {
            CatalogSource::Empty => Ok(StarCatalog::default()),
            CatalogSource::Files { main, names } => {
                tracing::debug!(%main, "loading star catalogue");
                let catalog = StarCatalog::from_file(main)?;
                match names {
                    Some(names) => catalog.with_names_file(names),
                    None => Ok(catalog),
                }
            }
        })
    }

    /// Catalogue target for a proper star name, e.g. `"Vega"`.
    pub fn star_target(&self, name: &str) -> Result<CelestialTarget, SkyPathError> {
        let (hip, _) = self.catalog()?.by_name(name)?;
        Ok(CelestialTarget::Catalog(hip))
    }

    /// Equinoxes and solstices of `year`.
    ///
    /// Return
    /// ----------
    /// * `Err(EphemerisRange)` when the year is not fully inside the ephemeris coverage.
    pub fn compute_seasons(&self, year: i32) -> Result<SeasonSet, SkyPathError> {
        find_seasons(&self.ephemeris, year, &self.params)
    }

    /// One-day path of `target` seen from `(lat, lng)` on a local calendar day.
    ///
    /// Arguments
    /// -----------------
    /// * `target`: what to follow.
    /// * `lat`, `lng`: observer, degrees (longitude east positive).
    /// * `year`, `month`, `day`: local date, proleptic Gregorian.
    /// * `tz_id`: IANA zone whose standard offset defines local midnight.
    ///
    /// Return
    /// ----------
    /// * the diagram, or the first validation, range, lookup or search error. Inputs are all
    ///   checked before any search starts.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_star_path(
        &self,
        target: &CelestialTarget,
        lat: f64,
        lng: f64,
        year: i32,
        month: u32,
        day: u32,
        tz_id: &str,
    ) -> Result<DiagramResult, SkyPathError> {
        let object = target.resolve(self.catalog()?)?;
        let location = ObserverLocation::new(lat, lng)?;
        validate_datetime(
            &CalendarTuple::new(year, month, day, 0, 0, 0.0),
            self.ephemeris.coverage(),
        )?;
        let offset = self.timezones.standard_offset_minutes(tz_id)?;
        tracing::debug!(%target, lat, lng, year, month, day, tz_id, offset, "star path request");

        compute_diagram(
            &self.ephemeris,
            &object,
            &location,
            CalendarDate::new(year, month, day),
            offset,
            &self.params,
        )
    }
}

#[cfg(test)]
mod skypath_test {
    use super::*;

    const SAMPLE: &str = "H|       91262| |18 36 56.19|+38 46 58.8| 0.03| |G|279.23410832|+38.78299311| |  128.93|  201.02|  286.46|\n";

    fn sky() -> SkyPath {
        SkyPath::keplerian().with_catalog(
            StarCatalog::from_hipparcos_str(SAMPLE)
                .unwrap()
                .with_names("hip,name\n91262,Vega\n".as_bytes())
                .unwrap(),
        )
    }

    #[test]
    fn test_context_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SkyPath>();
    }

    #[test]
    fn test_empty_catalog() {
        let sky = SkyPath::keplerian();
        assert!(sky.catalog().unwrap().is_empty());
        assert_eq!(
            sky.star_target("Vega"),
            Err(SkyPathError::UnknownStarName("Vega".into()))
        );
    }

    #[test]
    fn test_missing_catalog_file() {
        let sky = SkyPath::keplerian().with_catalog_file("does/not/exist.dat", None::<&str>);
        assert!(matches!(sky.catalog(), Err(SkyPathError::IoError(_))));
    }

    #[test]
    fn test_star_target() {
        assert_eq!(sky().star_target("vega"), Ok(CelestialTarget::Catalog(91262)));
    }

    #[test]
    fn test_validation_before_search() {
        let sky = sky();
        let vega = CelestialTarget::Catalog(91262);

        assert_eq!(
            sky.compute_star_path(&vega, 95.0, 0.0, 2024, 1, 1, "UTC"),
            Err(SkyPathError::InvalidLocation("latitude 95 outside [-90, 90]".into()))
        );
        assert_eq!(
            sky.compute_star_path(&vega, 40.0, 0.0, 2023, 2, 29, "UTC"),
            Err(SkyPathError::InvalidDate(2023, 2, 29))
        );
        assert_eq!(
            sky.compute_star_path(&vega, 40.0, 0.0, 2024, 1, 1, "Mars/Olympus"),
            Err(SkyPathError::UnknownTimezone("Mars/Olympus".into()))
        );
        assert_eq!(
            sky.compute_star_path(&CelestialTarget::Catalog(0), 40.0, 0.0, 2024, 1, 1, "UTC"),
            Err(SkyPathError::CatalogNumberOutOfRange { min: 1, max: 118322 })
        );
        assert!(sky
            .compute_star_path(&vega, 40.0, 0.0, 3001, 1, 1, "UTC")
            .unwrap_err()
            .is_range());
    }

    #[test]
    fn test_compute_star_path() {
        let diagram = sky()
            .compute_star_path(
                &CelestialTarget::Catalog(91262),
                39.9,
                116.4,
                2024,
                1,
                1,
                "Asia/Shanghai",
            )
            .unwrap();
        assert_eq!(diagram.utc_offset_minutes, 480);
        assert_eq!(diagram.annotations.len(), 9);
        assert!(diagram.annotations[6..].iter().all(|a| a.is_displayed));
    }

    #[test]
    fn test_compute_seasons_range() {
        let sky = SkyPath::keplerian();
        assert!(sky.compute_seasons(2024).is_ok());
        assert!(sky.compute_seasons(3000).unwrap_err().is_range());
    }

    #[test]
    fn test_missing_kernel() {
        assert!(matches!(
            SkyPath::from_ephemeris_file("does/not/exist.bsp"),
            Err(SkyPathError::IoError(_))
        ));
    }

    #[test]
    fn test_iana_timezones_by_default() {
        let diagram = sky()
            .compute_star_path(&CelestialTarget::Catalog(91262), 30.0, -113.5, 2024, 1, 1, "America/Edmonton")
            .unwrap();
        assert_eq!(diagram.utc_offset_minutes, -420);
    }
}
