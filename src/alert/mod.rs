//! Alert composition and outbound hand-off.
//!
//! [`compose`] turns a [`DeviceSnapshot`] into the emergency message,
//! [`channel_uri`] renders a contact and message into a `tel:`, `sms:` or
//! `wa.me` URI, and a [`UriDispatcher`] hands that URI to the platform.
//! Whether the downstream app actually sends anything is never observable
//! here.

mod dispatch;
mod policy;
mod uri;

pub use dispatch::*;
pub use policy::*;
pub use uri::*;

use chrono::{DateTime, FixedOffset};

use crate::clock::format_timestamp;
use crate::models::{AlertMessage, DeviceSnapshot};

/// Base of the map link appended when a position is known.
pub const MAP_BASE_URL: &str = "https://maps.google.com/?q=";

/// Build the emergency message from the current readings.
///
/// Identical inputs always produce identical text.
pub fn compose(snapshot: &DeviceSnapshot, now: &DateTime<FixedOffset>) -> AlertMessage {
    let (location_info, map_link) = match &snapshot.location {
        Some(loc) => (
            format!(
                "Latitude: {}\nLongitude: {}\nAccuracy: {}m",
                loc.latitude,
                loc.longitude,
                loc.accuracy_meters()
            ),
            format!(
                "\n\nMap: {}{},{}",
                MAP_BASE_URL, loc.latitude, loc.longitude
            ),
        ),
        None => ("Location: Unable to determine".to_string(), String::new()),
    };

    AlertMessage::new(format!(
        "EMERGENCY SOS ALERT!\n\n\
         I need help! This is an emergency alert.\n\n\
         My Location:\n{}{}\n\n\
         Time: {}\n\
         Battery: {}\n\
         IP: {}",
        location_info,
        map_link,
        format_timestamp(now),
        snapshot.battery,
        snapshot.ip,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ist;
    use crate::models::{BatteryReading, BatteryStatus, IpReading, Location};
    use chrono::TimeZone;

    fn now() -> DateTime<FixedOffset> {
        ist().with_ymd_and_hms(2026, 10, 18, 9, 15, 0).unwrap()
    }

    #[test]
    fn test_compose_without_location() {
        let message = compose(&DeviceSnapshot::default(), &now());
        let expected = "EMERGENCY SOS ALERT!\n\n\
                        I need help! This is an emergency alert.\n\n\
                        My Location:\n\
                        Location: Unable to determine\n\n\
                        Time: 18/10/2026, 9:15:00 am\n\
                        Battery: Status not available\n\
                        IP: Unable to fetch";
        assert_eq!(message.as_str(), expected);
        assert!(!message.as_str().contains("Map:"));
    }

    #[test]
    fn test_compose_with_full_snapshot() {
        let snapshot = DeviceSnapshot {
            location: Some(Location {
                latitude: 12.9716,
                longitude: 77.5946,
                accuracy: 15.4,
            }),
            ip: IpReading::Address("203.0.113.7".to_string()),
            battery: BatteryReading::Level(BatteryStatus {
                percent: 42,
                charging: false,
            }),
        };

        let message = compose(&snapshot, &now());
        let text = message.as_str();
        assert!(text.contains("Latitude: 12.9716\n"));
        assert!(text.contains("Longitude: 77.5946\n"));
        assert!(text.contains("Accuracy: 15m"));
        assert!(text.contains("Map: https://maps.google.com/?q=12.9716,77.5946"));
        assert!(text.contains("Battery: 42% (Not charging)"));
        assert!(text.ends_with("IP: 203.0.113.7"));
        assert!(!text.contains("Unable to determine"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let snapshot = DeviceSnapshot::default();
        assert_eq!(compose(&snapshot, &now()), compose(&snapshot, &now()));
    }

    #[test]
    fn test_accuracy_rounds_to_whole_meters() {
        let snapshot = DeviceSnapshot {
            location: Some(Location {
                latitude: 1.5,
                longitude: -2.25,
                accuracy: 7.5,
            }),
            ..Default::default()
        };
        let message = compose(&snapshot, &now());
        assert!(message.as_str().contains("Accuracy: 8m"));
        assert!(message.as_str().contains("?q=1.5,-2.25"));
    }
}
