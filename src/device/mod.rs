//! Best-effort device readings.
//!
//! Location, public IP and battery come from independent providers. Each
//! call settles into its own field of the [`DeviceSnapshot`]; a failure in
//! one never blocks or clears the others.

mod battery;
mod ip;
mod location;

pub use battery::*;
pub use ip::*;
pub use location::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AlertError, LocationError};
use crate::models::{
    BatteryReading, BatteryStatus, DeviceSnapshot, IpReading, Location, LocationStatus,
};

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Location, LocationError>;
}

#[async_trait]
pub trait IpProvider: Send + Sync {
    async fn public_ip(&self) -> Result<String, IpLookupError>;
}

#[async_trait]
pub trait BatteryProvider: Send + Sync {
    async fn battery_status(&self) -> Result<BatteryStatus, BatteryError>;
}

/// The three providers the widget samples.
#[derive(Clone)]
pub struct DeviceProbes {
    location: Arc<dyn LocationProvider>,
    ip: Arc<dyn IpProvider>,
    battery: Arc<dyn BatteryProvider>,
}

impl DeviceProbes {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        ip: Arc<dyn IpProvider>,
        battery: Arc<dyn BatteryProvider>,
    ) -> Self {
        Self {
            location,
            ip,
            battery,
        }
    }

    pub async fn locate(&self) -> Result<Location, LocationError> {
        self.location.current_position().await
    }

    /// Ask for a position but give up after `grace`.
    ///
    /// An expired grace period is reported as [`LocationError::Timeout`].
    pub async fn locate_within(&self, grace: Duration) -> Result<Location, LocationError> {
        match tokio::time::timeout(grace, self.locate()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(?grace, "location did not settle within grace period");
                Err(LocationError::Timeout)
            }
        }
    }

    pub async fn public_ip(&self) -> Result<String, IpLookupError> {
        self.ip.public_ip().await
    }

    pub async fn battery(&self) -> Result<BatteryStatus, BatteryError> {
        self.battery.battery_status().await
    }

    /// Run all three probes concurrently and apply every result.
    ///
    /// Returns the errors, one per failed probe; the snapshot holds the
    /// matching sentinels.
    pub async fn refresh(
        &self,
        snapshot: &mut DeviceSnapshot,
        location_status: &mut LocationStatus,
    ) -> Vec<AlertError> {
        let (location, ip, battery) = tokio::join!(self.locate(), self.public_ip(), self.battery());

        let mut errors = Vec::new();
        if let Err(e) = apply_location(snapshot, location_status, location) {
            errors.push(e);
        }
        if let Err(e) = apply_ip(snapshot, ip) {
            errors.push(e);
        }
        if let Err(e) = apply_battery(snapshot, battery) {
            errors.push(e);
        }
        errors
    }
}

/// Record a location outcome.
///
/// A failure keeps the last known position in the snapshot; only the
/// displayed status changes.
pub fn apply_location(
    snapshot: &mut DeviceSnapshot,
    status: &mut LocationStatus,
    result: Result<Location, LocationError>,
) -> Result<(), AlertError> {
    match result {
        Ok(location) => {
            tracing::debug!(
                latitude = location.latitude,
                longitude = location.longitude,
                accuracy = location.accuracy,
                "location updated"
            );
            snapshot.location = Some(location);
            *status = LocationStatus::Located(location);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Location unavailable: {}", e);
            *status = LocationStatus::Failed(e);
            Err(e.into())
        }
    }
}

pub fn apply_ip(
    snapshot: &mut DeviceSnapshot,
    result: Result<String, IpLookupError>,
) -> Result<(), AlertError> {
    match result {
        Ok(ip) => {
            tracing::debug!(%ip, "public IP updated");
            snapshot.ip = IpReading::Address(ip);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Public IP lookup failed: {}", e);
            snapshot.ip = IpReading::Unavailable;
            Err(e.into())
        }
    }
}

pub fn apply_battery(
    snapshot: &mut DeviceSnapshot,
    result: Result<BatteryStatus, BatteryError>,
) -> Result<(), AlertError> {
    match result {
        Ok(status) => {
            tracing::debug!(percent = status.percent, charging = status.charging, "battery updated");
            snapshot.battery = BatteryReading::Level(status);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Battery status unavailable: {}", e);
            snapshot.battery = BatteryReading::Unavailable;
            Err(e.into())
        }
    }
}
