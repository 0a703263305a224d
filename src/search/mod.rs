//! # Discrete event search
//!
//! Every event the engine reports (a rising, a setting, a meridian transit, a twilight
//! boundary, an equinox) is the instant where some *step function of time* changes value:
//! "is the target above the horizon", "is the hour angle in [0°, 180°)", "which twilight
//! phase is the Sun in", "which quadrant of ecliptic longitude is the Sun in".
//!
//! ## Overview
//!
//! [`find_discrete`] samples such a function on a regular grid across a [`SearchWindow`],
//! and refines each change between consecutive samples by interval bisection until the
//! bracket is narrower than [`SearchParams::epsilon_days`] (1 ms by default). It returns the
//! instant at the end of the bracket together with the *new* value.
//!
//! The grid step bounds what can be found: two changes closer together than one step may be
//! merged or missed. The default steps in [`SearchParams`] are chosen per event kind so that
//! this cannot happen for the events the engine looks for.
//!
//! ## Tuning
//!
//! [`SearchParams`] centralizes the horizon thresholds, windows, steps and tolerances; build
//! it with [`SearchParams::builder`]:
//!
//! ```rust,no_run
//! use skypath::search::SearchParams;
//!
//! let params = SearchParams::builder()
//!     .rise_set_step_days(0.01)
//!     .trajectory_points_per_day(200.0)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## See also
//! ------------
//! * [`events`] – rising, setting, transit and twilight searches built on [`find_discrete`].
//! * [`crate::seasons`] – equinox and solstice search.
use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use crate::{
    constants::{Degree, HORIZON_DEPRESSION, REFRACTION_LIMIT, SECONDS_PER_DAY},
    skypath_errors::SkyPathError,
    time::Instant,
};

pub mod events;

/// Closed interval of time searched for events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWindow {
    pub start: Instant,
    pub end: Instant,
}

impl SearchWindow {
    pub fn new(start: Instant, end: Instant) -> Self {
        SearchWindow { start, end }
    }

    /// Window of `days` beginning at `start`.
    pub fn from_start(start: Instant, days: f64) -> Self {
        SearchWindow {
            start,
            end: start.add_days(days),
        }
    }

    pub fn length_days(&self) -> f64 {
        self.end.days_since(&self.start)
    }
}

/// Configuration of the event searches and of the trajectory sampling.
///
/// Fields
/// -----------------
/// **Thresholds**
/// * `horizon_depression` – altitude (degrees, unrefracted) at which a target rises or sets.
/// * `refraction_limit` – altitude below which a target counts as hidden: the never-rises
///   test and the twilight-transition filter use it.
///
/// **Windows**
/// * `rise_set_window_days` – length of the rising search from local midnight, and of the
///   setting search from the rising.
/// * `transit_window_days` – length of the meridian-transit search.
/// * `setting_tie_break_days` – a setting must follow the rising by more than this.
///
/// **Sampling**
/// * `rise_set_step_days`, `transit_step_days`, `twilight_step_days`, `season_step_days` –
///   coarse grid step for each event kind.
/// * `epsilon_days` – bisection stops when the bracket is narrower than this.
/// * `max_bisections` – hard bound on bisection steps per event.
/// * `trajectory_points_per_day`, `trajectory_min_points` – density of the sampled path.
///
/// Defaults
/// -----------------
/// * `horizon_depression`: −0.5666° − 0.008°
/// * `refraction_limit`: −34′
/// * `rise_set_window_days`: 3.0, `transit_window_days`: 2.0
/// * `setting_tie_break_days`: 1e-6
/// * `rise_set_step_days`: 0.02, `transit_step_days`: 0.05, `twilight_step_days`: 0.025,
///   `season_step_days`: 30.0
/// * `epsilon_days`: 1 ms, `max_bisections`: 64
/// * `trajectory_points_per_day`: 100, `trajectory_min_points`: 10
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub horizon_depression: Degree,
    pub refraction_limit: Degree,

    pub rise_set_window_days: f64,
    pub transit_window_days: f64,
    pub setting_tie_break_days: f64,

    pub rise_set_step_days: f64,
    pub transit_step_days: f64,
    pub twilight_step_days: f64,
    pub season_step_days: f64,
    pub epsilon_days: f64,
    pub max_bisections: u32,

    pub trajectory_points_per_day: f64,
    pub trajectory_min_points: usize,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SearchParamsBuilder {
        SearchParamsBuilder::new()
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            horizon_depression: HORIZON_DEPRESSION,
            refraction_limit: REFRACTION_LIMIT,

            rise_set_window_days: 3.0,
            transit_window_days: 2.0,
            setting_tie_break_days: 1e-6,

            rise_set_step_days: 0.02,
            transit_step_days: 0.05,
            twilight_step_days: 0.025,
            season_step_days: 30.0,
            epsilon_days: 0.001 / SECONDS_PER_DAY,
            max_bisections: 64,

            trajectory_points_per_day: 100.0,
            trajectory_min_points: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchParamsBuilder {
    params: SearchParams,
}

impl Default for SearchParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: SearchParams::default(),
        }
    }

    // --- Thresholds ---
    pub fn horizon_depression(mut self, v: Degree) -> Self {
        self.params.horizon_depression = v;
        self
    }
    pub fn refraction_limit(mut self, v: Degree) -> Self {
        self.params.refraction_limit = v;
        self
    }

    // --- Windows ---
    pub fn rise_set_window_days(mut self, v: f64) -> Self {
        self.params.rise_set_window_days = v;
        self
    }
    pub fn transit_window_days(mut self, v: f64) -> Self {
        self.params.transit_window_days = v;
        self
    }
    pub fn setting_tie_break_days(mut self, v: f64) -> Self {
        self.params.setting_tie_break_days = v;
        self
    }

    // --- Sampling ---
    pub fn rise_set_step_days(mut self, v: f64) -> Self {
        self.params.rise_set_step_days = v;
        self
    }
    pub fn transit_step_days(mut self, v: f64) -> Self {
        self.params.transit_step_days = v;
        self
    }
    pub fn twilight_step_days(mut self, v: f64) -> Self {
        self.params.twilight_step_days = v;
        self
    }
    pub fn season_step_days(mut self, v: f64) -> Self {
        self.params.season_step_days = v;
        self
    }
    pub fn epsilon_days(mut self, v: f64) -> Self {
        self.params.epsilon_days = v;
        self
    }
    pub fn max_bisections(mut self, v: u32) -> Self {
        self.params.max_bisections = v;
        self
    }
    pub fn trajectory_points_per_day(mut self, v: f64) -> Self {
        self.params.trajectory_points_per_day = v;
        self
    }
    pub fn trajectory_min_points(mut self, v: usize) -> Self {
        self.params.trajectory_min_points = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ------
    /// * `Err(SkyPathError::InvalidSearchParameter)` when a window, step or tolerance is not
    ///   strictly positive, a threshold is not finite, a step exceeds its window, or the
    ///   trajectory asks for fewer than two points.
    pub fn build(self) -> Result<SearchParams, SkyPathError> {
        let p = &self.params;

        if !p.horizon_depression.is_finite() || !p.refraction_limit.is_finite() {
            return Err(SkyPathError::InvalidSearchParameter(
                "horizon thresholds must be finite".into(),
            ));
        }
        if !Self::gt0(p.rise_set_window_days) || !Self::gt0(p.transit_window_days) {
            return Err(SkyPathError::InvalidSearchParameter(
                "search windows must be > 0".into(),
            ));
        }
        if !Self::ge0(p.setting_tie_break_days) {
            return Err(SkyPathError::InvalidSearchParameter(
                "setting_tie_break_days must be >= 0".into(),
            ));
        }
        if !Self::gt0(p.rise_set_step_days)
            || !Self::gt0(p.transit_step_days)
            || !Self::gt0(p.twilight_step_days)
            || !Self::gt0(p.season_step_days)
        {
            return Err(SkyPathError::InvalidSearchParameter(
                "sampling steps must be > 0".into(),
            ));
        }
        if p.rise_set_step_days > p.rise_set_window_days
            || p.transit_step_days > p.transit_window_days
        {
            return Err(SkyPathError::InvalidSearchParameter(
                "sampling steps must not exceed their search window".into(),
            ));
        }
        if !Self::gt0(p.epsilon_days) {
            return Err(SkyPathError::InvalidSearchParameter(
                "epsilon_days must be > 0".into(),
            ));
        }
        if p.max_bisections == 0 {
            return Err(SkyPathError::InvalidSearchParameter(
                "max_bisections must be >= 1".into(),
            ));
        }
        if !Self::gt0(p.trajectory_points_per_day) || p.trajectory_min_points < 2 {
            return Err(SkyPathError::InvalidSearchParameter(
                "trajectory needs a positive density and at least 2 points".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search Parameters")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "  horizon_depression     = {:.4}°", self.horizon_depression)?;
        writeln!(f, "  refraction_limit       = {:.4}°", self.refraction_limit)?;
        writeln!(f, "  rise_set_window_days   = {:.3} d", self.rise_set_window_days)?;
        writeln!(f, "  transit_window_days    = {:.3} d", self.transit_window_days)?;
        writeln!(f, "  setting_tie_break_days = {:e} d", self.setting_tie_break_days)?;
        writeln!(
            f,
            "  steps (rise/set, transit, twilight, season) = {:.3}/{:.3}/{:.3}/{:.1} d",
            self.rise_set_step_days,
            self.transit_step_days,
            self.twilight_step_days,
            self.season_step_days
        )?;
        writeln!(
            f,
            "  epsilon                = {:.3} ms ({} bisections max)",
            self.epsilon_days * SECONDS_PER_DAY * 1e3,
            self.max_bisections
        )?;
        write!(
            f,
            "  trajectory             = {} pts/day, min {}",
            self.trajectory_points_per_day, self.trajectory_min_points
        )
    }
}

/// Locate every change of a step function of time across a window.
///
/// Arguments
/// ---------
/// * `window`: interval searched.
/// * `step_days`: coarse sampling step.
/// * `params`: provides the bisection tolerance and bound.
/// * `f`: step function; its value must be piecewise constant in time.
///
/// Return
/// ------
/// * `(instant, new_value)` for each change, in chronological order. The instant is the
///   right end of the final bisection bracket, so `f(instant) == new_value`.
///
/// Remarks
/// -------
/// * The grid always includes both window endpoints.
/// * Evaluation errors abort the search.
pub fn find_discrete<T, F>(
    window: &SearchWindow,
    step_days: f64,
    params: &SearchParams,
    mut f: F,
) -> Result<Vec<(Instant, T)>, SkyPathError>
where
    T: PartialEq + Copy + fmt::Debug,
    F: FnMut(&Instant) -> Result<T, SkyPathError>,
{
    let span = window.length_days();
    if span <= 0.0 {
        return Ok(Vec::new());
    }
    let intervals = (span / step_days).ceil().max(1.0) as usize;

    let mut events = Vec::new();
    let mut t_prev = window.start;
    let mut v_prev = f(&t_prev)?;

    for i in 1..=intervals {
        let t_next = if i == intervals {
            window.end
        } else {
            window.start.add_days(span * i as f64 / intervals as f64)
        };
        let v_next = f(&t_next)?;

        // several changes may share one grid interval: refine the earliest, then resume the
        // search from it until the value at the right end is reached
        let (mut t_base, mut v_base) = (t_prev, v_prev);
        while v_base != v_next && t_base < t_next {
            let (mut lo, mut hi, mut v_hi) = (t_base, t_next, v_next);
            for _ in 0..params.max_bisections {
                if hi.days_since(&lo) <= params.epsilon_days {
                    break;
                }
                let mid = Instant::from_ut1_jd(0.5 * (lo.ut1() + hi.ut1()));
                let v_mid = f(&mid)?;
                if v_mid == v_base {
                    lo = mid;
                } else {
                    hi = mid;
                    v_hi = v_mid;
                }
            }
            tracing::trace!(at = %hi, value = ?v_hi, "discrete change refined");
            events.push((hi, v_hi));
            t_base = hi;
            v_base = v_hi;
        }

        t_prev = t_next;
        v_prev = v_next;
    }

    tracing::debug!(
        start = %window.start,
        end = %window.end,
        step_days,
        found = events.len(),
        "discrete search done"
    );
    Ok(events)
}
