//! Battery readings from the Linux power-supply class.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use super::BatteryProvider;
use crate::models::BatteryStatus;

pub const SYSFS_POWER_SUPPLY: &str = "/sys/class/power_supply";

#[derive(Debug, Error)]
pub enum BatteryError {
    #[error("battery status is not supported on this device")]
    Unsupported,

    #[error("could not read battery status: {0}")]
    Unreadable(String),
}

/// Reads `capacity` and `status` of the first `BAT*` supply.
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    root: PathBuf,
}

impl SysfsBattery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn find_battery(&self) -> Result<PathBuf, BatteryError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|_| BatteryError::Unsupported)?;

        let mut batteries = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_name().to_string_lossy().starts_with("BAT") {
                batteries.push(entry.path());
            }
        }
        batteries.sort();
        batteries.into_iter().next().ok_or(BatteryError::Unsupported)
    }
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::new(SYSFS_POWER_SUPPLY)
    }
}

async fn read_attr(dir: &Path, name: &str) -> Result<String, BatteryError> {
    tokio::fs::read_to_string(dir.join(name))
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| BatteryError::Unreadable(format!("{}: {}", name, e)))
}

#[async_trait]
impl BatteryProvider for SysfsBattery {
    async fn battery_status(&self) -> Result<BatteryStatus, BatteryError> {
        let dir = self.find_battery().await?;

        let capacity = read_attr(&dir, "capacity").await?;
        let percent: u8 = capacity
            .parse()
            .map_err(|_| BatteryError::Unreadable(format!("capacity {:?}", capacity)))?;

        // "Full" means the charger is still connected.
        let status = read_attr(&dir, "status").await?;
        let charging = matches!(status.as_str(), "Charging" | "Full");

        Ok(BatteryStatus {
            percent: percent.min(100),
            charging,
        })
    }
}

/// Stand-in for devices without a battery API.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBattery;

#[async_trait]
impl BatteryProvider for NoBattery {
    async fn battery_status(&self) -> Result<BatteryStatus, BatteryError> {
        Err(BatteryError::Unsupported)
    }
}
