mod common;

use approx::assert_abs_diff_eq;
use camino::Utf8Path;
use common::{HIP_NAMES, HIP_SAMPLE};
use skypath::{catalog::StarCatalog, constants::J1991_25, skypath_errors::SkyPathError};

fn catalog() -> StarCatalog {
    StarCatalog::from_file(Utf8Path::new(HIP_SAMPLE))
        .unwrap()
        .with_names_file(Utf8Path::new(HIP_NAMES))
        .unwrap()
}

#[test]
fn test_fixture_loads() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 9);

    let vega = catalog.lookup(91262).unwrap();
    assert_abs_diff_eq!(vega.ra, 279.23, epsilon = 0.01);
    assert_abs_diff_eq!(vega.dec, 38.78, epsilon = 0.01);
    assert_eq!(vega.epoch, J1991_25);

    let barnard = catalog.entry(87937).unwrap();
    assert_eq!(barnard.pm_dec_mas_per_year, Some(10326.93));
    assert_eq!(barnard.vmag, Some(9.54));
}

#[test]
fn test_lookup_errors_are_distinct() {
    let catalog = catalog();
    assert_eq!(
        catalog.lookup(0),
        Err(SkyPathError::CatalogNumberOutOfRange { min: 1, max: 118322 })
    );
    assert!(catalog.lookup(118323).is_err());
    assert_eq!(catalog.lookup(1), Err(SkyPathError::CatalogEntryNotFound(1)));

    let no_data = catalog.lookup(53020).unwrap_err();
    assert_eq!(no_data, SkyPathError::CatalogNoData(53020));
    assert!(no_data.is_catalog());
    assert_eq!(
        no_data.to_string(),
        "No RA/Dec data available for this star in the Hipparcos Catalogue."
    );
}

#[test]
fn test_names() {
    let catalog = catalog();
    assert_eq!(catalog.name_of(70890), Some("Proxima Centauri"));
    assert_eq!(catalog.name_of(53020), None);

    let (hip, star) = catalog.by_name("  rigil kentaurus ").unwrap();
    assert_eq!(hip, 71683);
    assert!(star.dec < -60.0);
    assert_eq!(
        catalog.by_name("Vulcan"),
        Err(SkyPathError::UnknownStarName("Vulcan".into()))
    );
}

#[test]
fn test_proper_motion_applied() {
    // Barnard's Star moves about 10.3" per year in declination
    let star = catalog().lookup(87937).unwrap();
    let drift = (star.unit_vector(2_460_000.5) - star.unit_vector(J1991_25)).norm();
    let years = (2_460_000.5 - J1991_25) / 365.25;
    assert_abs_diff_eq!(drift.to_degrees() * 3600.0, 10.36 * years, epsilon = 0.1 * years);
}
