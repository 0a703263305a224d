//! # Standard-time offsets
//!
//! Timezone resolution is a collaborator of the engine: the star-path orchestrator only
//! needs the *standard* (winter, non-DST) UTC offset of an IANA zone, in minutes east of
//! Greenwich. [`TimezoneProvider`] is that contract; [`IanaTimezones`] answers it from the
//! IANA time zone database compiled into `chrono-tz`.
//!
//! The standard offset is the zone's base offset at a reference instant, the current time
//! unless pinned with [`IanaTimezones::at`]. Daylight saving never contributes, so
//! `Europe/Paris` is `+60` in July as well as in January.
//!
//! ## See also
//! ------------
//! * [`crate::star_path::compute_diagram`] – where the offset defines local midnight.
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

use crate::skypath_errors::SkyPathError;

/// Standard UTC offset lookup.
pub trait TimezoneProvider: std::fmt::Debug + Send + Sync {
    /// Standard offset of `tz_id`, minutes east of UTC (`Asia/Shanghai` → `480`).
    fn standard_offset_minutes(&self, tz_id: &str) -> Result<i32, SkyPathError>;
}

/// IANA database lookup through `chrono-tz`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IanaTimezones {
    reference: Option<DateTime<Utc>>,
}

impl IanaTimezones {
    /// Offsets under the rules in force now.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offsets under the rules in force at `reference`.
    pub fn at(reference: DateTime<Utc>) -> Self {
        IanaTimezones {
            reference: Some(reference),
        }
    }

    /// Parse an IANA identifier (`"America/Edmonton"`, `"UTC"`).
    pub fn zone(tz_id: &str) -> Result<Tz, SkyPathError> {
        tz_id
            .parse::<Tz>()
            .map_err(|_| SkyPathError::UnknownTimezone(tz_id.to_string()))
    }
}

impl TimezoneProvider for IanaTimezones {
    fn standard_offset_minutes(&self, tz_id: &str) -> Result<i32, SkyPathError> {
        let tz = Self::zone(tz_id)?;
        let reference = self.reference.unwrap_or_else(Utc::now);
        let offset = tz.offset_from_utc_datetime(&reference.naive_utc());
        let minutes = offset.base_utc_offset().num_minutes() as i32;
        tracing::trace!(tz_id, minutes, "standard offset");
        Ok(minutes)
    }
}
