//! # Star-path diagram
//!
//! [`compute_diagram`] follows a target across the local sky for one day and returns what a
//! polar sky chart needs: the sampled path split by twilight phase, the canonical
//! [`EventAnnotation`] record and the visible celestial pole.
//!
//! ## Pipeline
//!
//! 1. The rising is searched over `[local standard midnight, +3 d]`.
//! 2. If the target rises, the setting is searched over `[rising, +3 d]` (first setting later
//!    than the rising by more than the tie-break) and the meridian transit over
//!    `[rising, +2 d]`. The path spans rising → setting.
//! 3. If the target does not rise, it is either below the refraction limit at midnight
//!    ([`SkyPathError::NeverRises`]) or circumpolar: the path spans one day from midnight
//!    and only the transit is annotated. A rising without any setting in the window is
//!    treated the same way, from the rising.
//! 4. Twilight phases are searched over the path; each constant-phase interval is sampled at
//!    100 points per day (at least 10) and tagged with its phase.
//! 5. Twilight transitions strictly inside the path are kept when the target stands above
//!    the refraction limit at that instant.
//!
//! ## See also
//! ------------
//! * [`crate::search::events`] – the searches.
//! * [`crate::annotation::annotate`] – formatting of the named points.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    annotation::{annotate, EventAnnotation, PointName, RawPoint},
    constants::{Degree, RADEG},
    ephemeris::{Ephemeris, SkyObject},
    observer::{CelestialPole, ObserverLocation},
    search::{
        events::{
            find_meridian_transit, find_rising, find_setting, find_twilight_phase_changes,
            TwilightPhase,
        },
        SearchParams, SearchWindow,
    },
    skypath_errors::SkyPathError,
    time::{Calendar, CalendarDate, Instant},
};

/// Target position at one instant, unrefracted, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkySample {
    pub instant: Instant,
    pub alt: Degree,
    pub az: Degree,
}

impl SkySample {
    /// Polar chart coordinates: `(θ, r)` with θ the azimuth in radians and `r = 90 − alt`.
    pub fn polar(&self) -> (f64, f64) {
        (self.az * RADEG, 90.0 - self.alt)
    }
}

/// Part of the path during which the twilight phase does not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySegment {
    pub phase: TwilightPhase,
    pub samples: Vec<SkySample>,
}

/// Everything needed to draw the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramResult {
    pub trajectory: Vec<TrajectorySegment>,
    pub annotations: Vec<EventAnnotation>,
    pub utc_offset_minutes: i32,
    pub celestial_pole: Option<CelestialPole>,
}

/// Which kind of day the target has.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PathSpan {
    RiseSet {
        rising: Instant,
        transit: Instant,
        setting: Instant,
    },
    TransitOnly {
        window: SearchWindow,
        transit: Instant,
    },
}

fn sample(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    t: Instant,
) -> Result<SkySample, SkyPathError> {
    let hz = ephemeris.apparent_altaz(target, &t, location)?;
    Ok(SkySample {
        instant: t,
        alt: hz.alt,
        az: hz.az,
    })
}

/// Sample `[t0, t1]` evenly, both ends included.
fn sample_interval(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    t0: Instant,
    t1: Instant,
    params: &SearchParams,
) -> Result<Vec<SkySample>, SkyPathError> {
    let span = t1.days_since(&t0);
    let n = ((span * params.trajectory_points_per_day) as usize).max(params.trajectory_min_points);
    (0..n)
        .map(|i| {
            let t = t0.add_days(span * i as f64 / (n - 1) as f64);
            sample(ephemeris, target, location, t)
        })
        .collect()
}

fn transit_from(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    start: Instant,
    params: &SearchParams,
) -> Result<Instant, SkyPathError> {
    let window = SearchWindow::from_start(start, params.transit_window_days);
    find_meridian_transit(ephemeris, target, location, &window, params)?.ok_or_else(|| {
        SkyPathError::SolverDidNotConverge(format!("no meridian transit after {start}"))
    })
}

fn path_span(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    midnight: Instant,
    params: &SearchParams,
) -> Result<PathSpan, SkyPathError> {
    let rising_window = SearchWindow::from_start(midnight, params.rise_set_window_days);

    match find_rising(ephemeris, target, location, &rising_window, params)? {
        Some(rising) => {
            let setting_window = SearchWindow::from_start(rising, params.rise_set_window_days);
            let setting = find_setting(ephemeris, target, location, &setting_window, &rising, params)?;
            let transit = transit_from(ephemeris, target, location, rising, params)?;
            match setting {
                Some(setting) => Ok(PathSpan::RiseSet {
                    rising,
                    transit,
                    setting,
                }),
                None => {
                    tracing::debug!(%rising, "no setting after rising, following one day");
                    Ok(PathSpan::TransitOnly {
                        window: SearchWindow::from_start(rising, 1.0),
                        transit,
                    })
                }
            }
        }
        None => {
            let alt = ephemeris.apparent_altaz(target, &midnight, location)?.alt;
            if alt < params.refraction_limit {
                return Err(SkyPathError::NeverRises);
            }
            tracing::debug!(%midnight, alt, "circumpolar target");
            Ok(PathSpan::TransitOnly {
                window: SearchWindow::from_start(midnight, 1.0),
                transit: transit_from(ephemeris, target, location, midnight, params)?,
            })
        }
    }
}

/// Compute the one-day path of `target` and its annotations.
///
/// Arguments
/// ---------
/// * `ephemeris`: position facade.
/// * `target`: resolved body or star.
/// * `location`: observer.
/// * `date`: local calendar day (proleptic Gregorian).
/// * `offset_minutes`: standard-time offset of the observer's zone, minutes east of UTC.
/// * `params`: search configuration.
///
/// Return
/// ------
/// * a [`DiagramResult`]; any search or ephemeris error aborts the whole computation.
/// * `Err(NeverRises)` when the target stays below the horizon.
pub fn compute_diagram(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    date: CalendarDate,
    offset_minutes: i32,
    params: &SearchParams,
) -> Result<DiagramResult, SkyPathError> {
    let midnight = Instant::from_fields(
        date.year,
        date.month as i64,
        date.day as i64,
        0.0,
        -(offset_minutes as f64),
        0.0,
        Calendar::Gregorian,
    );
    tracing::debug!(%midnight, offset_minutes, "local standard midnight");

    let span = path_span(ephemeris, target, location, midnight, params)?;
    let (window, events) = match span {
        PathSpan::RiseSet {
            rising,
            transit,
            setting,
        } => (
            SearchWindow::new(rising, setting),
            vec![
                (PointName::R, rising),
                (PointName::T, transit),
                (PointName::S, setting),
            ],
        ),
        PathSpan::TransitOnly { window, transit } => (window, vec![(PointName::T, transit)]),
    };

    let phases = find_twilight_phase_changes(ephemeris, location, &window, params)?;

    let trajectory = phases
        .iter()
        .tuple_windows()
        .map(|((t0, phase), (t1, _))| {
            Ok(TrajectorySegment {
                phase: *phase,
                samples: sample_interval(ephemeris, target, location, *t0, *t1, params)?,
            })
        })
        .collect::<Result<Vec<_>, SkyPathError>>()?;

    // interior changes only: the padded endpoints are not transitions
    let mut raw_points = Vec::new();
    for ((_, before), (t, after)) in phases[..phases.len() - 1].iter().tuple_windows() {
        let Some(name) =
            TwilightPhase::transition_name(*before, *after).and_then(PointName::from_transition)
        else {
            continue;
        };
        let s = sample(ephemeris, target, location, *t)?;
        if s.alt > params.refraction_limit {
            raw_points.push(RawPoint {
                name,
                instant: *t,
                alt: s.alt,
                az: s.az,
            });
        }
    }

    for (name, t) in events {
        let s = sample(ephemeris, target, location, t)?;
        raw_points.push(RawPoint {
            name,
            instant: t,
            alt: s.alt,
            az: s.az,
        });
    }

    Ok(DiagramResult {
        trajectory,
        annotations: annotate(&raw_points, offset_minutes as f64, location.longitude()),
        utc_offset_minutes: offset_minutes,
        celestial_pole: location.celestial_pole(),
    })
}

#[cfg(test)]
mod star_path_test {
    use super::*;
    use crate::{
        ephemeris::{Body, FixedStar},
        unit_test_global::EPHEMERIS_TEST,
    };
    use approx::assert_abs_diff_eq;

    fn ephemeris() -> &'static Ephemeris {
        &EPHEMERIS_TEST
    }

    fn displayed(result: &DiagramResult) -> Vec<&'static str> {
        result
            .annotations
            .iter()
            .filter(|a| a.is_displayed)
            .map(|a| a.name.as_str())
            .collect()
    }

    #[test]
    fn test_polar_projection() {
        let s = SkySample {
            instant: Instant::from_ut1_jd(2_451_545.0),
            alt: 30.0,
            az: 90.0,
        };
        let (theta, r) = s.polar();
        assert_abs_diff_eq!(theta, std::f64::consts::FRAC_PI_2, epsilon = 1e-15);
        assert_eq!(r, 60.0);
    }

    #[test]
    fn test_vega_from_beijing() {
        let eph = ephemeris();
        let vega = SkyObject::Star(FixedStar::new(279.23410832, 38.78299311));
        let loc = ObserverLocation::new(39.9, 116.4).unwrap();
        let result = compute_diagram(
            eph,
            &vega,
            &loc,
            CalendarDate::new(2024, 1, 1),
            480,
            &SearchParams::default(),
        )
        .unwrap();

        let shown = displayed(&result);
        assert!(shown.contains(&"R") && shown.contains(&"T") && shown.contains(&"S"));
        assert_eq!(result.annotations.len(), 9);
        assert_eq!(result.utc_offset_minutes, 480);
        assert_eq!(result.celestial_pole.unwrap().alt, 39.9);

        // samples are contiguous and chronological across segments
        let samples: Vec<_> = result.trajectory.iter().flat_map(|s| s.samples.iter()).collect();
        assert!(samples.windows(2).all(|w| w[0].instant <= w[1].instant));
        assert!(result.trajectory.iter().all(|s| s.samples.len() >= 10));

        let rising = &result.annotations[6];
        assert_abs_diff_eq!(rising.alt.unwrap(), -0.5746, epsilon = 1e-3);
        let transit = &result.annotations[7];
        assert_abs_diff_eq!(transit.alt.unwrap(), 90.0 - (39.9 - 38.8), epsilon = 0.1);
    }

    #[test]
    fn test_circumpolar_only_transit() {
        let eph = ephemeris();
        let polaris = SkyObject::Star(FixedStar::new(37.94614689, 89.26413805));
        let loc = ObserverLocation::new(45.0, 7.0).unwrap();
        let result = compute_diagram(
            eph,
            &polaris,
            &loc,
            CalendarDate::new(2024, 6, 1),
            60,
            &SearchParams::default(),
        )
        .unwrap();

        assert_eq!(displayed(&result).iter().filter(|n| n.len() == 1).count(), 1);
        assert!(result.annotations[7].is_displayed);
        assert!(!result.annotations[6].is_displayed && !result.annotations[8].is_displayed);

        let span = result.trajectory.last().unwrap().samples.last().unwrap().instant.days_since(
            &result.trajectory[0].samples[0].instant,
        );
        assert_abs_diff_eq!(span, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_never_rises() {
        let eph = ephemeris();
        let sigma_oct = SkyObject::Star(FixedStar::new(317.19, -88.95));
        let loc = ObserverLocation::new(40.0, -75.0).unwrap();
        let err = compute_diagram(
            eph,
            &sigma_oct,
            &loc,
            CalendarDate::new(2024, 6, 1),
            -300,
            &SearchParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, SkyPathError::NeverRises);
        assert!(err.is_domain());
    }

    #[test]
    fn test_planet_twilight_points_above_horizon() {
        let eph = ephemeris();
        let mars = SkyObject::Body(Body::Mars);
        let loc = ObserverLocation::new(51.5, 0.0).unwrap();
        let params = SearchParams::default();
        let result =
            compute_diagram(eph, &mars, &loc, CalendarDate::new(2024, 3, 1), 0, &params).unwrap();

        for a in result.annotations.iter().filter(|a| a.is_displayed) {
            if !["R", "S"].contains(&a.name.as_str()) {
                assert!(a.alt.unwrap() > params.refraction_limit, "{a:?}");
            }
            assert_eq!(a.time_zone, Some(0.0));
        }
    }
}
