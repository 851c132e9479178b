use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LocationError;

/// Text used in place of an IP address that could not be fetched.
pub const IP_UNAVAILABLE: &str = "Unable to fetch";

/// Text used in place of a battery reading that could not be taken.
pub const BATTERY_UNAVAILABLE: &str = "Status not available";

/// A position fix. Accuracy is the radius of uncertainty in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

impl Location {
    /// Accuracy rounded to whole meters.
    pub fn accuracy_meters(&self) -> i64 {
        self.accuracy.round() as i64
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat: {:.6}, Lon: {:.6} (Accuracy: {}m)",
            self.latitude,
            self.longitude,
            self.accuracy_meters()
        )
    }
}

/// Charge level and charger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus {
    /// Charge level in percent, 0 to 100.
    pub percent: u8,
    pub charging: bool,
}

impl BatteryStatus {
    /// Build from a fractional level in `0.0..=1.0`.
    pub fn from_level(level: f64, charging: bool) -> Self {
        let percent = (level * 100.0).round().clamp(0.0, 100.0) as u8;
        Self { percent, charging }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.charging {
            "Charging"
        } else {
            "Not charging"
        };
        write!(f, "{}% ({})", self.percent, state)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IpReading {
    Address(String),
    #[default]
    Unavailable,
}

impl fmt::Display for IpReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(ip) => f.write_str(ip),
            Self::Unavailable => f.write_str(IP_UNAVAILABLE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatteryReading {
    Level(BatteryStatus),
    #[default]
    Unavailable,
}

impl fmt::Display for BatteryReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(status) => write!(f, "{}", status),
            Self::Unavailable => f.write_str(BATTERY_UNAVAILABLE),
        }
    }
}

/// Latest device readings. Each field is written by its own probe and may be
/// stale or missing independently of the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub location: Option<Location>,
    pub ip: IpReading,
    pub battery: BatteryReading,
}

/// What the location line of the widget currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationStatus {
    #[default]
    Pending,
    Located(Location),
    Failed(LocationError),
}

impl fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("Getting your location..."),
            Self::Located(location) => write!(f, "{}", location),
            Self::Failed(err) => write!(f, "{}", err),
        }
    }
}
