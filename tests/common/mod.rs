#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use camino::Utf8Path;
use skypath::{skypath::SkyPath, time::Instant};

pub const HIP_SAMPLE: &str = "tests/data/hip_main_sample.dat";
pub const HIP_NAMES: &str = "tests/data/hip_names.csv";

/// Context over the approximate analytic ephemeris and the fixture catalogue.
pub fn sky() -> SkyPath {
    SkyPath::keplerian().with_catalog_file(Utf8Path::new(HIP_SAMPLE), Some(Utf8Path::new(HIP_NAMES)))
}

/// Context over the DE406 kernel (cached or downloaded) and the fixture catalogue.
#[cfg(feature = "jpl-download")]
pub fn de406_sky() -> SkyPath {
    SkyPath::de406()
        .unwrap()
        .with_catalog_file(Utf8Path::new(HIP_SAMPLE), Some(Utf8Path::new(HIP_NAMES)))
}

/// `actual` within `minutes` of the Gregorian UT1 instant `expected`.
pub fn assert_instant_close(actual: &Instant, expected: (i32, u32, u32, u32, u32, f64), minutes: f64) {
    let (y, m, d, h, mi, s) = expected;
    let expected = Instant::from_calendar(y, m, d, h, mi, s);
    assert_abs_diff_eq!(actual.ut1(), expected.ut1(), epsilon = minutes / 1440.0);
}

/// `actual` within `seconds` of the Gregorian UT1 instant `expected`.
pub fn assert_instant_within_seconds(actual: &Instant, expected: (i32, u32, u32, u32, u32, f64), seconds: f64) {
    let (y, m, d, h, mi, s) = expected;
    let expected = Instant::from_calendar(y, m, d, h, mi, s);
    let off = actual.days_since(&expected) * 86_400.0;
    assert!(off.abs() <= seconds, "{actual:?} is {off:.3} s from {expected:?}");
}
