//! Widget command handling, end to end against an in-memory database and a
//! recording dispatcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeZone;

use sos_beacon::alert::RecordingDispatcher;
use sos_beacon::clock::{ist, FixedClock};
use sos_beacon::config::AppConfig;
use sos_beacon::db::Database;
use sos_beacon::device::{
    BatteryProvider, BatteryError, DeviceProbes, IpLookupError, IpProvider, LocationProvider,
};
use sos_beacon::models::{
    BatteryStatus, Channel, Contact, Location, LocationStatus, SendPolicy,
};
use sos_beacon::widget::{Command, StatusKind, Widget};
use sos_beacon::LocationError;

struct DelayedLocation {
    delay: Duration,
    result: Result<Location, LocationError>,
}

#[async_trait]
impl LocationProvider for DelayedLocation {
    async fn current_position(&self) -> Result<Location, LocationError> {
        tokio::time::sleep(self.delay).await;
        self.result
    }
}

struct FixedIp(Option<&'static str>);

#[async_trait]
impl IpProvider for FixedIp {
    async fn public_ip(&self) -> Result<String, IpLookupError> {
        self.0
            .map(str::to_string)
            .ok_or(IpLookupError::EmptyAddress)
    }
}

struct FixedBattery(Option<BatteryStatus>);

#[async_trait]
impl BatteryProvider for FixedBattery {
    async fn battery_status(&self) -> Result<BatteryStatus, BatteryError> {
        self.0.ok_or(BatteryError::Unsupported)
    }
}

fn bangalore() -> Location {
    Location {
        latitude: 12.9716,
        longitude: 77.5946,
        accuracy: 15.4,
    }
}

fn probes(location_delay: Duration) -> DeviceProbes {
    DeviceProbes::new(
        Arc::new(DelayedLocation {
            delay: location_delay,
            result: Ok(bangalore()),
        }),
        Arc::new(FixedIp(Some("203.0.113.7"))),
        Arc::new(FixedBattery(Some(BatteryStatus {
            percent: 64,
            charging: true,
        }))),
    )
}

fn setup_with(config: AppConfig, probes: DeviceProbes) -> (Widget, RecordingDispatcher) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let dispatcher = RecordingDispatcher::new();
    let clock = FixedClock(ist().with_ymd_and_hms(2026, 10, 18, 21, 45, 3).unwrap());
    let widget = Widget::mount(
        config,
        db,
        probes,
        Arc::new(dispatcher.clone()),
        Arc::new(clock),
    );
    (widget, dispatcher)
}

fn setup() -> (Widget, RecordingDispatcher) {
    setup_with(AppConfig::default(), probes(Duration::from_millis(100)))
}

async fn add_contacts(widget: &mut Widget, numbers: &[&str]) {
    for n in numbers {
        let status = widget.handle(Command::AddContact(n.to_string())).await;
        assert_eq!(status.kind, StatusKind::Success, "{}", status.text);
    }
}

mod contacts {
    use super::*;

    #[tokio::test]
    async fn add_reports_success() {
        let (mut widget, _) = setup();
        let status = widget
            .handle(Command::AddContact("98765 43210".to_string()))
            .await;

        assert_eq!(status.kind, StatusKind::Success);
        assert_eq!(status.text, "Emergency contact added successfully");
        assert_eq!(widget.contacts().len(), 1);
    }

    #[tokio::test]
    async fn invalid_number_reports_error_and_keeps_list() {
        let (mut widget, _) = setup();
        let status = widget.handle(Command::AddContact("12345".to_string())).await;

        assert!(status.is_error());
        assert_eq!(status.text, "Please enter a valid phone number");
        assert!(widget.contacts().is_empty());
    }

    #[tokio::test]
    async fn remove_out_of_range_is_an_error() {
        let (mut widget, _) = setup();
        add_contacts(&mut widget, &["9999999999"]).await;

        let status = widget.handle(Command::RemoveContact(3)).await;
        assert!(status.is_error());

        let status = widget.handle(Command::RemoveContact(0)).await;
        assert_eq!(status.text, "Emergency contact removed");
        assert!(widget.contacts().is_empty());
    }
}

mod sos {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn without_contacts_nothing_is_dispatched() {
        let (mut widget, dispatcher) = setup();
        let status = widget.handle(Command::SendSos(Channel::Sms)).await;

        assert!(status.is_error());
        assert_eq!(
            status.text,
            "No emergency contacts added. Please add contacts first."
        );
        assert!(dispatcher.uris().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn broadcast_first_sends_only_to_first_contact() {
        let (mut widget, dispatcher) = setup();
        add_contacts(&mut widget, &["9999999999", "8888888888"]).await;

        let status = widget.handle(Command::SendSos(Channel::Sms)).await;

        assert_eq!(status.kind, StatusKind::Success);
        assert_eq!(
            status.text,
            "SMS app opened with emergency alert for 2 contacts. Please forward to other contacts if needed."
        );
        let uris = dispatcher.uris();
        assert_eq!(uris.len(), 1);
        assert!(uris[0].starts_with("sms:+919999999999?body=EMERGENCY%20SOS%20ALERT%21"));
        assert!(widget.pending_send().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn location_that_settles_within_grace_period_is_included() {
        let (mut widget, dispatcher) = setup();
        add_contacts(&mut widget, &["9999999999"]).await;

        widget.handle(Command::SendSos(Channel::WhatsApp)).await;

        let uris = dispatcher.uris();
        let uri = &uris[0];
        assert!(uri.starts_with("https://wa.me/919999999999?text="));
        assert!(uri.contains("Latitude%3A%2012.9716"));
        assert!(uri.contains("12.9716%2C77.5946"));
        assert_eq!(widget.location_status(), LocationStatus::Located(bangalore()));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_location_is_abandoned_after_grace_period() {
        let (mut widget, dispatcher) =
            setup_with(AppConfig::default(), probes(Duration::from_secs(30)));
        add_contacts(&mut widget, &["9999999999"]).await;

        let started = tokio::time::Instant::now();
        widget.handle(Command::SendSos(Channel::Sms)).await;

        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(2) && waited < Duration::from_secs(3));
        let uris = dispatcher.uris();
        let uri = &uris[0];
        assert!(uri.contains("Location%3A%20Unable%20to%20determine"));
        assert!(!uri.contains("Map%3A"));
        assert_eq!(
            widget.location_status(),
            LocationStatus::Failed(LocationError::Timeout)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn known_location_skips_the_grace_period() {
        let (mut widget, dispatcher) =
            setup_with(AppConfig::default(), probes(Duration::from_millis(10)));
        add_contacts(&mut widget, &["9999999999"]).await;
        widget.refresh_device().await;

        let started = tokio::time::Instant::now();
        widget.handle(Command::SendSos(Channel::Sms)).await;

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(dispatcher.uris().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_policy_sends_one_contact_per_step() {
        let mut config = AppConfig::default();
        config.policies.sms = SendPolicy::Sequential;
        let (mut widget, dispatcher) = setup_with(config, probes(Duration::from_millis(10)));
        add_contacts(&mut widget, &["9999999999", "8888888888", "7777777777"]).await;

        let status = widget.handle(Command::SendSos(Channel::Sms)).await;
        assert_eq!(status.text, "SMS app opened for contact 1 of 3 (+91 99999 99999)");
        assert_eq!(dispatcher.uris().len(), 1);
        assert_eq!(widget.pending_send().map(|s| s.remaining()), Some(2));

        widget.handle(Command::ContinueSend).await;
        let status = widget.handle(Command::ContinueSend).await;
        assert_eq!(status.text, "SMS app opened for contact 3 of 3 (+91 77777 77777)");
        assert!(widget.pending_send().is_none());

        let numbers: Vec<String> = dispatcher
            .uris()
            .iter()
            .map(|u| u.split('?').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            numbers,
            vec!["sms:+919999999999", "sms:+918888888888", "sms:+917777777777"]
        );

        let status = widget.handle(Command::ContinueSend).await;
        assert!(status.is_error());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_a_sequential_send_stops_it() {
        let (mut widget, dispatcher) = setup();
        add_contacts(&mut widget, &["9999999999", "8888888888"]).await;

        widget.handle(Command::SendSos(Channel::Call)).await;
        let status = widget.handle(Command::CancelSend).await;

        assert_eq!(status.kind, StatusKind::Info);
        assert!(widget.pending_send().is_none());
        assert_eq!(dispatcher.uris(), vec!["tel:+919999999999"]);
    }
}

mod sharing {
    use super::*;

    #[tokio::test]
    async fn share_with_one_contact_uses_whatsapp() {
        let (mut widget, dispatcher) = setup();
        add_contacts(&mut widget, &["9999999999", "09888888888"]).await;

        let status = widget.handle(Command::ShareWithContact(1)).await;

        assert_eq!(status.text, "WhatsApp opened with emergency alert");
        let uris = dispatcher.uris();
        let uri = &uris[0];
        assert!(uri.starts_with("https://wa.me/919888888888?text="));
        assert!(uri.contains("Time%3A%2018%2F10%2F2026%2C%209%3A45%3A03%20pm"));
    }

    #[tokio::test]
    async fn share_with_all_needs_contacts() {
        let (mut widget, dispatcher) = setup();
        let status = widget.handle(Command::ShareWithAll).await;

        assert!(status.is_error());
        assert_eq!(status.text, "No emergency contacts available");
        assert!(dispatcher.uris().is_empty());
    }

    #[tokio::test]
    async fn calls_use_tel_uris() {
        let (mut widget, dispatcher) = setup();
        add_contacts(&mut widget, &["919999999999"]).await;

        widget.handle(Command::CallContact(0)).await;
        widget.handle(Command::CallEmergency("112".to_string())).await;
        let status = widget.handle(Command::CallContact(5)).await;

        assert!(status.is_error());
        assert_eq!(dispatcher.uris(), vec!["tel:+919999999999", "tel:112"]);
    }

    #[tokio::test]
    async fn unsaved_numbers_can_be_called_directly() {
        let (mut widget, dispatcher) = setup();
        let number = Contact::parse("98765 43210").expect("valid number");

        let status = widget.handle(Command::CallNumber(number)).await;

        assert!(!status.is_error());
        assert_eq!(status.text, "Calling +91 98765 43210");
        assert_eq!(dispatcher.uris(), vec!["tel:+919876543210"]);
        assert!(widget.contacts().is_empty());
    }
}

mod device {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn refresh_fills_the_snapshot() {
        let (mut widget, _) = setup();
        let status = widget.handle(Command::RefreshDevice).await;

        assert_eq!(status.kind, StatusKind::Success);
        let message = widget.compose_now();
        assert!(message.as_str().contains("Battery: 64% (Charging)"));
        assert!(message.as_str().contains("IP: 203.0.113.7"));
        assert!(message.as_str().contains("Time: 18/10/2026, 9:45:03 pm"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_probes_leave_sentinels() {
        let probes = DeviceProbes::new(
            Arc::new(DelayedLocation {
                delay: Duration::ZERO,
                result: Err(LocationError::PermissionDenied),
            }),
            Arc::new(FixedIp(None)),
            Arc::new(FixedBattery(None)),
        );
        let (mut widget, _) = setup_with(AppConfig::default(), probes);

        let status = widget.handle(Command::RefreshDevice).await;

        assert_eq!(status.kind, StatusKind::Info);
        assert!(status.text.contains("User denied the request for Geolocation."));
        let message = widget.compose_now();
        assert!(message.as_str().contains("Location: Unable to determine"));
        assert!(message.as_str().contains("Battery: Status not available"));
        assert!(message.as_str().ends_with("IP: Unable to fetch"));
    }

    #[tokio::test(start_paused = true)]
    async fn status_message_auto_dismisses() {
        let (mut widget, _) = setup();
        widget.handle(Command::ToggleSound).await;
        assert_eq!(widget.status().map(|s| s.text.as_str()), Some("Sound OFF"));
        assert!(!widget.sound_enabled());

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(widget.status().is_none());
    }
}
