//! Rising, setting, meridian-transit and twilight searches.
//!
//! Each search is [`find_discrete`] over a boolean or ordinal function of the target's
//! topocentric position:
//!
//! | event    | function                                         | kept changes   |
//! |----------|--------------------------------------------------|----------------|
//! | rising   | unrefracted altitude ≥ horizon depression        | false → true   |
//! | setting  | same                                             | true → false   |
//! | transit  | local hour angle in [0°, 180°)                   | false → true   |
//! | twilight | [`TwilightPhase`] of the Sun's altitude          | every change   |
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, ASTRONOMICAL_TWILIGHT, CIVIL_TWILIGHT, NAUTICAL_TWILIGHT, SUN_UP_ALTITUDE},
    ephemeris::{Body, Ephemeris, SkyObject},
    observer::ObserverLocation,
    search::{find_discrete, SearchParams, SearchWindow},
    skypath_errors::SkyPathError,
    time::Instant,
};

/// Sky brightness class set by the Sun's altitude, ordered from darkest to brightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TwilightPhase {
    DarkOfNight = 0,
    Astronomical = 1,
    Nautical = 2,
    Civil = 3,
    SunUp = 4,
}

impl TwilightPhase {
    /// Phase for an unrefracted Sun altitude in degrees.
    pub fn from_sun_altitude(alt: Degree) -> Self {
        if alt >= SUN_UP_ALTITUDE {
            TwilightPhase::SunUp
        } else if alt >= CIVIL_TWILIGHT {
            TwilightPhase::Civil
        } else if alt >= NAUTICAL_TWILIGHT {
            TwilightPhase::Nautical
        } else if alt >= ASTRONOMICAL_TWILIGHT {
            TwilightPhase::Astronomical
        } else {
            TwilightPhase::DarkOfNight
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Name of the boundary crossed when the phase goes from `from` to `to`.
    ///
    /// Only adjacent steps between sun-up and astronomical twilight are named: `N1..N3` on
    /// the way into darkness, `D1..D3` on the way back.
    pub fn transition_name(from: TwilightPhase, to: TwilightPhase) -> Option<&'static str> {
        use TwilightPhase::*;
        match (from, to) {
            (SunUp, Civil) => Some("N1"),
            (Civil, Nautical) => Some("N2"),
            (Nautical, Astronomical) => Some("N3"),
            (Astronomical, Nautical) => Some("D1"),
            (Nautical, Civil) => Some("D2"),
            (Civil, SunUp) => Some("D3"),
            _ => None,
        }
    }
}

impl From<TwilightPhase> for u8 {
    fn from(phase: TwilightPhase) -> Self {
        phase as u8
    }
}

impl TryFrom<u8> for TwilightPhase {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(TwilightPhase::DarkOfNight),
            1 => Ok(TwilightPhase::Astronomical),
            2 => Ok(TwilightPhase::Nautical),
            3 => Ok(TwilightPhase::Civil),
            4 => Ok(TwilightPhase::SunUp),
            _ => Err(format!("twilight phase out of range: {v}")),
        }
    }
}

fn above_horizon(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    threshold: Degree,
    t: &Instant,
) -> Result<bool, SkyPathError> {
    Ok(ephemeris.apparent_altaz(target, t, location)?.alt >= threshold)
}

/// Every rising of `target` within `window`.
pub fn find_risings(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    window: &SearchWindow,
    params: &SearchParams,
) -> Result<Vec<Instant>, SkyPathError> {
    let changes = find_discrete(window, params.rise_set_step_days, params, |t| {
        above_horizon(ephemeris, target, location, params.horizon_depression, t)
    })?;
    Ok(changes
        .into_iter()
        .filter_map(|(t, up)| up.then_some(t))
        .collect())
}

/// Every setting of `target` within `window`.
pub fn find_settings(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    window: &SearchWindow,
    params: &SearchParams,
) -> Result<Vec<Instant>, SkyPathError> {
    let changes = find_discrete(window, params.rise_set_step_days, params, |t| {
        above_horizon(ephemeris, target, location, params.horizon_depression, t)
    })?;
    Ok(changes
        .into_iter()
        .filter_map(|(t, up)| (!up).then_some(t))
        .collect())
}

/// Every upper meridian transit of `target` within `window`.
pub fn find_meridian_transits(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    window: &SearchWindow,
    params: &SearchParams,
) -> Result<Vec<Instant>, SkyPathError> {
    let changes = find_discrete(window, params.transit_step_days, params, |t| {
        Ok(ephemeris.hour_angle(target, t, location)? >= 0.0)
    })?;
    Ok(changes
        .into_iter()
        .filter_map(|(t, west)| west.then_some(t))
        .collect())
}

/// First rising in `window`, if any.
pub fn find_rising(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    window: &SearchWindow,
    params: &SearchParams,
) -> Result<Option<Instant>, SkyPathError> {
    Ok(find_risings(ephemeris, target, location, window, params)?
        .into_iter()
        .next())
}

/// First setting in `window` that follows `rising` by more than the tie-break.
///
/// A candidate coincident with the rising (the bracket of a grazing crossing) is skipped.
pub fn find_setting(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    window: &SearchWindow,
    rising: &Instant,
    params: &SearchParams,
) -> Result<Option<Instant>, SkyPathError> {
    Ok(find_settings(ephemeris, target, location, window, params)?
        .into_iter()
        .find(|t| t.days_since(rising) > params.setting_tie_break_days))
}

/// First upper meridian transit in `window`, if any.
pub fn find_meridian_transit(
    ephemeris: &Ephemeris,
    target: &SkyObject,
    location: &ObserverLocation,
    window: &SearchWindow,
    params: &SearchParams,
) -> Result<Option<Instant>, SkyPathError> {
    Ok(find_meridian_transits(ephemeris, target, location, window, params)?
        .into_iter()
        .next())
}

/// Twilight phase at one instant.
pub fn twilight_phase(
    ephemeris: &Ephemeris,
    location: &ObserverLocation,
    t: &Instant,
) -> Result<TwilightPhase, SkyPathError> {
    let sun = ephemeris.apparent_altaz(&SkyObject::Body(Body::Sun), t, location)?;
    Ok(TwilightPhase::from_sun_altitude(sun.alt))
}

/// Twilight phase changes within `window`, padded with the window endpoints.
///
/// Return
/// ------
/// * `[(start, phase(start)), (t1, p1), …, (end, phase(end))]`. With no change inside the
///   window only the two endpoints are returned, so consecutive pairs always delimit
///   intervals of constant phase.
pub fn find_twilight_phase_changes(
    ephemeris: &Ephemeris,
    location: &ObserverLocation,
    window: &SearchWindow,
    params: &SearchParams,
) -> Result<Vec<(Instant, TwilightPhase)>, SkyPathError> {
    let changes = find_discrete(window, params.twilight_step_days, params, |t| {
        twilight_phase(ephemeris, location, t)
    })?;

    let mut padded = Vec::with_capacity(changes.len() + 2);
    padded.push((window.start, twilight_phase(ephemeris, location, &window.start)?));
    padded.extend(changes);
    padded.push((window.end, twilight_phase(ephemeris, location, &window.end)?));
    Ok(padded)
}

#[cfg(test)]
mod events_test {
    use std::sync::Arc;

    use super::*;
    use crate::ephemeris::{keplerian::KeplerianEphemeris, FixedStar};
    use approx::assert_abs_diff_eq;

    fn ephemeris() -> Ephemeris {
        Ephemeris::new(Arc::new(KeplerianEphemeris::new()))
    }

    #[test]
    fn test_phase_thresholds() {
        use TwilightPhase::*;
        assert_eq!(TwilightPhase::from_sun_altitude(10.0), SunUp);
        assert_eq!(TwilightPhase::from_sun_altitude(-0.8333), SunUp);
        assert_eq!(TwilightPhase::from_sun_altitude(-1.0), Civil);
        assert_eq!(TwilightPhase::from_sun_altitude(-6.0), Civil);
        assert_eq!(TwilightPhase::from_sun_altitude(-6.1), Nautical);
        assert_eq!(TwilightPhase::from_sun_altitude(-12.5), Astronomical);
        assert_eq!(TwilightPhase::from_sun_altitude(-18.5), DarkOfNight);
        assert!(DarkOfNight < SunUp);
        assert_eq!(Civil.ordinal(), 3);
    }

    #[test]
    fn test_transition_names() {
        use TwilightPhase::*;
        assert_eq!(TwilightPhase::transition_name(SunUp, Civil), Some("N1"));
        assert_eq!(TwilightPhase::transition_name(Nautical, Astronomical), Some("N3"));
        assert_eq!(TwilightPhase::transition_name(Astronomical, Nautical), Some("D1"));
        assert_eq!(TwilightPhase::transition_name(Civil, SunUp), Some("D3"));
        assert_eq!(TwilightPhase::transition_name(Astronomical, DarkOfNight), None);
        assert_eq!(TwilightPhase::transition_name(SunUp, Nautical), None);
    }

    #[test]
    fn test_rise_transit_set_order() {
        let eph = ephemeris();
        let params = SearchParams::default();
        let star = SkyObject::Star(FixedStar::new(101.28854105, -16.71314306));
        let loc = ObserverLocation::new(35.0, 139.7).unwrap();
        let start = Instant::from_calendar(2024, 1, 15, 0, 0, 0.0).add_days(-9.0 / 24.0);

        let window = SearchWindow::from_start(start, params.rise_set_window_days);
        let rising = find_rising(&eph, &star, &loc, &window, &params).unwrap().unwrap();
        let setting = find_setting(
            &eph,
            &star,
            &loc,
            &SearchWindow::from_start(rising, params.rise_set_window_days),
            &rising,
            &params,
        )
        .unwrap()
        .unwrap();
        let transit = find_meridian_transit(
            &eph,
            &star,
            &loc,
            &SearchWindow::from_start(rising, params.transit_window_days),
            &params,
        )
        .unwrap()
        .unwrap();

        assert!(rising < transit && transit < setting);
        // a star is above the horizon for less than a sidereal day
        assert!(setting.days_since(&rising) < 1.0);

        let alt = |t: &Instant| eph.apparent_altaz(&star, t, &loc).unwrap().alt;
        assert_abs_diff_eq!(alt(&rising), params.horizon_depression, epsilon = 1e-4);
        assert_abs_diff_eq!(alt(&setting), params.horizon_depression, epsilon = 1e-4);
        // culmination: 90 − 35 − 16.7
        assert_abs_diff_eq!(alt(&transit), 90.0 - 35.0 - 16.7, epsilon = 0.2);
        assert!(alt(&transit) > alt(&rising));
    }

    #[test]
    fn test_circumpolar_has_no_rising() {
        let eph = ephemeris();
        let params = SearchParams::default();
        let polaris = SkyObject::Star(FixedStar::new(37.94614689, 89.26413805));
        let loc = ObserverLocation::new(50.0, 0.0).unwrap();
        let window =
            SearchWindow::from_start(Instant::from_calendar(2024, 3, 1, 0, 0, 0.0), 3.0);
        assert!(find_rising(&eph, &polaris, &loc, &window, &params)
            .unwrap()
            .is_none());
        assert_eq!(
            find_meridian_transits(&eph, &polaris, &loc, &window, &params)
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn test_twilight_sequence() {
        let eph = ephemeris();
        let params = SearchParams::default();
        let loc = ObserverLocation::new(48.85, 2.35).unwrap();
        // local noon to next local noon at an equinox: every boundary crossed twice
        let start = Instant::from_calendar(2024, 3, 21, 12, 0, 0.0);
        let window = SearchWindow::from_start(start, 1.0);
        let phases = find_twilight_phase_changes(&eph, &loc, &window, &params).unwrap();

        assert_eq!(phases.first().unwrap().1, TwilightPhase::SunUp);
        assert_eq!(phases.last().unwrap().1, TwilightPhase::SunUp);
        assert_eq!(phases.len(), 8 + 2);

        let names: Vec<_> = phases
            .windows(2)
            .filter_map(|w| TwilightPhase::transition_name(w[0].1, w[1].1))
            .collect();
        assert_eq!(names, vec!["N1", "N2", "N3", "D1", "D2", "D3"]);
        assert!(phases.windows(2).all(|w| w[0].0 <= w[1].0));
    }
}
