//! # Display helpers
//!
//! Human-readable renderings of calendar tuples and UTC offsets, plus the input checks run
//! before any search.
//!
//! * [`format_datetime`] – `"1 Jan 2000 CE"`, `"Jan 1, 2000 CE"`, `"44 BCE"` and
//!   `"12:00:00"` / `"12:00:07.250"`.
//! * [`format_datetime_iso`] – `"+2000-01-01"` and the same time string.
//! * [`validate_datetime`], [`validate_year`] – calendar and coverage checks.
//! * [`decimal_to_hms`], [`format_timezone`] – `8.5 → "+08:30"`.
//!
//! Years use astronomical numbering: year `0` is printed `1 BCE`.
use crate::{
    constants::{YEAR_MAX, YEAR_MIN},
    skypath_errors::SkyPathError,
    time::{days_in_month, CalendarDate, CalendarTuple},
};

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTH_NAME: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Layout switches for [`format_datetime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateStyle {
    /// `"Jan 1, 2000 CE"` instead of `"1 Jan 2000 CE"`.
    pub month_first: bool,
    /// `"January"` instead of `"Jan"`.
    pub full_month: bool,
    /// Only the era-qualified year.
    pub year_only: bool,
}

/// Output of [`format_datetime`]; `time` is `None` for year-only output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedDateTime {
    pub date: String,
    pub time: Option<String>,
}

fn era_year(year: i32) -> String {
    if year > 0 {
        format!("{year} CE")
    } else {
        format!("{} BCE", 1 - year as i64)
    }
}

fn time_string(t: &CalendarTuple) -> String {
    let sec = if t.second.fract() == 0.0 {
        format!("{:02}", t.second as u32)
    } else {
        format!("{:06.3}", t.second)
    };
    format!("{:02}:{:02}:{sec}", t.hour, t.minute)
}

/// Render a calendar tuple as a readable date and time.
///
/// Arguments
/// ---------
/// * `t`: the tuple to render; it is not validated beyond the month index.
/// * `style`: layout switches.
///
/// Return
/// ------
/// * the date (or year) string and, unless `year_only`, the `HH:MM:SS[.sss]` time string.
/// * `Err(MonthOutOfRange)` when `t.month` is not in `1..=12`.
pub fn format_datetime(t: &CalendarTuple, style: DateStyle) -> Result<FormattedDateTime, SkyPathError> {
    let year = era_year(t.year);
    if style.year_only {
        return Ok(FormattedDateTime {
            date: year,
            time: None,
        });
    }

    let index = (t.month as usize)
        .checked_sub(1)
        .filter(|i| *i < 12)
        .ok_or(SkyPathError::MonthOutOfRange)?;
    let month = if style.full_month {
        MONTH_NAME[index]
    } else {
        MONTH_ABBR[index]
    };

    let date = if style.month_first {
        format!("{month} {}, {year}", t.day)
    } else {
        format!("{} {month} {year}", t.day)
    };
    Ok(FormattedDateTime {
        date,
        time: Some(time_string(t)),
    })
}

/// ISO 8601 expanded date (`+2000-01-01`, `-3000-01-29`) and `HH:MM:SS[.sss]` time.
pub fn format_datetime_iso(t: &CalendarTuple) -> (String, String) {
    (t.date().to_string(), time_string(t))
}

/// Check a proleptic Gregorian date and time of day, then the ephemeris coverage.
///
/// Arguments
/// ---------
/// * `t`: the tuple to check.
/// * `coverage`: first and last covered days, inclusive.
///
/// Return
/// ------
/// * `Err(InvalidDate)`, `Err(InvalidTime)` or `Err(EphemerisRange)`, in that order of checks.
pub fn validate_datetime(
    t: &CalendarTuple,
    coverage: (CalendarDate, CalendarDate),
) -> Result<(), SkyPathError> {
    if !(1..=12).contains(&t.month) || t.day < 1 || t.day > days_in_month(t.year, t.month) {
        return Err(SkyPathError::InvalidDate(t.year, t.month, t.day));
    }
    if t.hour >= 24 || t.minute >= 60 || !(0.0..60.0).contains(&t.second) {
        return Err(SkyPathError::InvalidTime(t.hour, t.minute, t.second));
    }

    let (min, max) = coverage;
    let date = t.date();
    if date < min || date > max {
        return Err(SkyPathError::EphemerisRange { min, max });
    }
    Ok(())
}

/// Years accepted for season searches: both coverage boundary years are excluded.
pub fn validate_year(year: i32) -> Result<(), SkyPathError> {
    if (YEAR_MIN..=YEAR_MAX).contains(&year) {
        Ok(())
    } else {
        Err(SkyPathError::YearOutOfRange {
            min: YEAR_MIN,
            max: YEAR_MAX,
        })
    }
}

/// Signed hours split into whole hours, minutes and rounded seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hms {
    /// `-1` or `1`.
    pub sign: i8,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

/// Split decimal hours; seconds are rounded half to even with carry into minutes and hours.
pub fn decimal_to_hms(decimal_hours: f64) -> Hms {
    let sign = if decimal_hours < 0.0 { -1 } else { 1 };
    let abs = decimal_hours.abs();
    let mut hours = abs.trunc() as u32;
    let decimal_minutes = (abs - abs.trunc()) * 60.0;
    let mut minutes = decimal_minutes.trunc() as u32;
    let mut seconds = ((decimal_minutes - decimal_minutes.trunc()) * 60.0).round_ties_even() as u32;

    if seconds == 60 {
        seconds = 0;
        minutes += 1;
    }
    if minutes == 60 {
        minutes = 0;
        hours += 1;
    }
    Hms {
        sign,
        hours,
        minutes,
        seconds,
    }
}

/// UTC offset in hours as `±HH:MM`.
pub fn format_timezone(hours: f64) -> String {
    let hms = decimal_to_hms(hours);
    let sign = if hours < 0.0 { '-' } else { '+' };
    format!("{sign}{:02}:{:02}", hms.hours, hms.minutes)
}
