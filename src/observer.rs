//! Observer location on the Earth's surface.
use serde::{Deserialize, Serialize};

use crate::{constants::Degree, skypath_errors::SkyPathError, time::local_mean_offset_minutes};

/// Geodetic latitude and longitude (east positive), decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    latitude: Degree,
    longitude: Degree,
}

/// Which celestial pole is above the observer's horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoleName {
    #[serde(rename = "NCP")]
    North,
    #[serde(rename = "SCP")]
    South,
}

/// Horizontal position of the visible celestial pole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CelestialPole {
    pub name: PoleName,
    pub alt: Degree,
    pub az: Degree,
}

impl ObserverLocation {
    /// Validate and build a location.
    ///
    /// Return
    /// ------
    /// * `Err(SkyPathError::InvalidLocation)` when a coordinate is not finite or outside
    ///   [−90°, 90°] × [−180°, 180°].
    pub fn new(latitude: Degree, longitude: Degree) -> Result<Self, SkyPathError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SkyPathError::InvalidLocation(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SkyPathError::InvalidLocation(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(ObserverLocation {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> Degree {
        self.latitude
    }

    pub fn longitude(&self) -> Degree {
        self.longitude
    }

    /// Offset of local mean time from UT1, minutes.
    pub fn local_mean_offset_minutes(&self) -> f64 {
        local_mean_offset_minutes(self.longitude)
    }

    /// The celestial pole above the horizon; none for an observer on the equator.
    pub fn celestial_pole(&self) -> Option<CelestialPole> {
        if self.latitude > 0.0 {
            Some(CelestialPole {
                name: PoleName::North,
                alt: self.latitude,
                az: 0.0,
            })
        } else if self.latitude < 0.0 {
            Some(CelestialPole {
                name: PoleName::South,
                alt: -self.latitude,
                az: 180.0,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod observer_test {
    use super::*;

    #[test]
    fn test_location_validation() {
        assert!(ObserverLocation::new(45.0, -120.0).is_ok());
        assert!(ObserverLocation::new(90.0, 180.0).is_ok());
        assert!(matches!(
            ObserverLocation::new(91.0, 0.0),
            Err(SkyPathError::InvalidLocation(_))
        ));
        assert!(ObserverLocation::new(0.0, f64::NAN).is_err());
        assert!(ObserverLocation::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_celestial_pole() {
        let north = ObserverLocation::new(39.9, 116.4).unwrap();
        let pole = north.celestial_pole().unwrap();
        assert_eq!(pole.name, PoleName::North);
        assert_eq!((pole.alt, pole.az), (39.9, 0.0));

        let south = ObserverLocation::new(-33.9, 151.2).unwrap();
        let pole = south.celestial_pole().unwrap();
        assert_eq!(pole.name, PoleName::South);
        assert_eq!((pole.alt, pole.az), (33.9, 180.0));

        assert!(ObserverLocation::new(0.0, 10.0).unwrap().celestial_pole().is_none());
    }

    #[test]
    fn test_local_mean_offset() {
        let loc = ObserverLocation::new(0.0, -112.5).unwrap();
        assert_eq!(loc.local_mean_offset_minutes(), -450.0);
    }
}
