//! # Diagram annotations
//!
//! The named points of a star-path diagram: twilight transitions (`D1..D3`, `N1..N3`),
//! rising (`R`), meridian transit (`T`) and setting (`S`). [`annotate`] turns the raw
//! `(name, instant, alt, az)` points found by the orchestrator into the canonical record of
//! nine entries, always in the order `D1, D2, D3, N1, N2, N3, R, T, S`.
//!
//! Every displayed entry carries six whole-second time representations: UT1, standard
//! (zone) time and local mean time, each in the proleptic Gregorian and Julian calendars.
//! Entries without a point stay present with `is_displayed = false` and null fields.
//!
//! ## Stabilization
//!
//! Offset arithmetic on a Julian Date can decompose `12:00:00` as `11:59:59.9999`. Before
//! truncating to whole seconds each tuple is rebuilt with its seconds rounded (ties to even)
//! plus 0.1 s, see [`CalendarTuple::stabilized`].
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::Degree,
    time::{ut1_to_local_mean, ut1_to_standard, CalendarTuple, Instant, TimeFields},
};

/// Name of an annotated point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointName {
    D1,
    D2,
    D3,
    N1,
    N2,
    N3,
    R,
    T,
    S,
}

impl PointName {
    /// Canonical output order.
    pub const ALL: [PointName; 9] = [
        PointName::D1,
        PointName::D2,
        PointName::D3,
        PointName::N1,
        PointName::N2,
        PointName::N3,
        PointName::R,
        PointName::T,
        PointName::S,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PointName::D1 => "D1",
            PointName::D2 => "D2",
            PointName::D3 => "D3",
            PointName::N1 => "N1",
            PointName::N2 => "N2",
            PointName::N3 => "N3",
            PointName::R => "R",
            PointName::T => "T",
            PointName::S => "S",
        }
    }

    /// Twilight transition label (`"N1"`, …) to name.
    pub fn from_transition(label: &str) -> Option<Self> {
        match label {
            "D1" => Some(PointName::D1),
            "D2" => Some(PointName::D2),
            "D3" => Some(PointName::D3),
            "N1" => Some(PointName::N1),
            "N2" => Some(PointName::N2),
            "N3" => Some(PointName::N3),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point found by the searches, before formatting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPoint {
    pub name: PointName,
    pub instant: Instant,
    pub alt: Degree,
    pub az: Degree,
}

/// One entry of the canonical annotation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAnnotation {
    pub name: PointName,
    pub is_displayed: bool,
    pub alt: Option<Degree>,
    pub az: Option<Degree>,
    pub time_ut1: Option<TimeFields>,
    pub time_ut1_julian: Option<TimeFields>,
    pub time_standard: Option<TimeFields>,
    pub time_standard_julian: Option<TimeFields>,
    pub time_local_mean: Option<TimeFields>,
    pub time_local_mean_julian: Option<TimeFields>,
    /// Standard-time offset, hours east of UTC.
    pub time_zone: Option<f64>,
}

impl EventAnnotation {
    /// Undisplayed placeholder.
    pub fn hidden(name: PointName) -> Self {
        EventAnnotation {
            name,
            is_displayed: false,
            alt: None,
            az: None,
            time_ut1: None,
            time_ut1_julian: None,
            time_standard: None,
            time_standard_julian: None,
            time_local_mean: None,
            time_local_mean_julian: None,
            time_zone: None,
        }
    }
}

/// Whole-second Gregorian and Julian renderings of a stabilized tuple.
fn render(t: &CalendarTuple) -> (TimeFields, TimeFields) {
    let stable = t.stabilized();
    (
        stable.to_calendar().whole(),
        stable.to_julian_calendar().whole(),
    )
}

/// Build the canonical annotation record.
///
/// Arguments
/// ---------
/// * `raw_points`: points found for the diagram, in any order; a later point with the same
///   name replaces an earlier one.
/// * `offset_minutes`: standard-time offset east of UTC.
/// * `longitude`: observer longitude, degrees east, for local mean time.
///
/// Return
/// ------
/// * nine entries, ordered `D1, D2, D3, N1, N2, N3, R, T, S`.
pub fn annotate(raw_points: &[RawPoint], offset_minutes: f64, longitude: Degree) -> Vec<EventAnnotation> {
    let mut annotations: Vec<EventAnnotation> =
        PointName::ALL.iter().map(|n| EventAnnotation::hidden(*n)).collect();

    for point in raw_points {
        let ut1 = point.instant.to_calendar();
        let (time_ut1, time_ut1_julian) = render(&ut1);
        let (time_standard, time_standard_julian) = render(&ut1_to_standard(&ut1, offset_minutes));
        let (time_local_mean, time_local_mean_julian) = render(&ut1_to_local_mean(&ut1, longitude));

        annotations[point.name.index()] = EventAnnotation {
            name: point.name,
            is_displayed: true,
            alt: Some(point.alt),
            az: Some(point.az),
            time_ut1: Some(time_ut1),
            time_ut1_julian: Some(time_ut1_julian),
            time_standard: Some(time_standard),
            time_standard_julian: Some(time_standard_julian),
            time_local_mean: Some(time_local_mean),
            time_local_mean_julian: Some(time_local_mean_julian),
            time_zone: Some(offset_minutes / 60.0),
        };
    }

    annotations
}
