//! User configuration.
//!
//! Read from `<config dir>/sos-beacon/config.json`, then overridden by
//! environment variables:
//! - `SOS_BEACON_DB` - database file
//! - `SOS_BEACON_IP_URL` - public IP endpoint
//! - `SOS_BEACON_LAT`, `SOS_BEACON_LON`, `SOS_BEACON_ACCURACY` - fixed position

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::clock::{offset_from_minutes, IST_OFFSET_SECS};
use crate::device::DEFAULT_IP_URL;
use crate::models::{Channel, Location, SendPolicy};

const APP_NAME: &str = "sos-beacon";
const CONFIG_FILE: &str = "config.json";

/// Send policy per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPolicies {
    pub call: SendPolicy,
    pub sms: SendPolicy,
    pub whatsapp: SendPolicy,
}

impl ChannelPolicies {
    pub fn for_channel(&self, channel: Channel) -> SendPolicy {
        match channel {
            Channel::Call => self.call,
            Channel::Sms => self.sms,
            Channel::WhatsApp => self.whatsapp,
        }
    }

    pub fn set(&mut self, channel: Channel, policy: SendPolicy) {
        match channel {
            Channel::Call => self.call = policy,
            Channel::Sms => self.sms = policy,
            Channel::WhatsApp => self.whatsapp = policy,
        }
    }
}

impl Default for ChannelPolicies {
    fn default() -> Self {
        Self {
            call: SendPolicy::Sequential,
            sms: SendPolicy::BroadcastFirst,
            whatsapp: SendPolicy::BroadcastFirst,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding the contact list. Defaults to the platform data
    /// directory.
    pub database_path: Option<PathBuf>,
    /// JSON endpoint answering with `{"ip": "..."}`.
    pub ip_url: String,
    pub ip_timeout_secs: u64,
    /// How long an alert waits for a position before composing without one.
    pub grace_period_ms: u64,
    /// How long a status message stays visible.
    pub status_ttl_ms: u64,
    /// Display zone, in minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// Fixed position used in place of a location service.
    pub location: Option<Location>,
    /// Directory scanned for `BAT*` power supplies.
    pub power_supply_dir: PathBuf,
    pub sound_enabled: bool,
    pub policies: ChannelPolicies,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            ip_url: DEFAULT_IP_URL.to_string(),
            ip_timeout_secs: 10,
            grace_period_ms: 2000,
            status_ttl_ms: 3000,
            utc_offset_minutes: IST_OFFSET_SECS / 60,
            location: None,
            power_supply_dir: PathBuf::from(crate::device::SYSFS_POWER_SUPPLY),
            sound_enabled: true,
            policies: ChannelPolicies::default(),
        }
    }
}

impl AppConfig {
    /// Load `path` and apply environment overrides. Falls back to defaults
    /// if the file is missing or broken.
    pub fn load(path: &Path) -> Self {
        let mut config = match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a config file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Change `sound_enabled` in the file at `path`, leaving every other
    /// stored setting as it is on disk. Environment overrides never reach
    /// the file, and a file that cannot be parsed is left untouched.
    pub fn store_sound_enabled(path: &Path, enabled: bool) -> Result<()> {
        let mut stored = Self::load_from(path)?;
        stored.sound_enabled = enabled;
        stored.save_to(path)
    }

    /// Apply `SOS_BEACON_*` overrides read through `var`.
    ///
    /// A position override needs both latitude and longitude; values that do
    /// not parse are ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("SOS_BEACON_DB") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(url) = var("SOS_BEACON_IP_URL") {
            self.ip_url = url;
        }

        let parse = |key: &str| var(key).and_then(|v| v.trim().parse::<f64>().ok());
        if let (Some(latitude), Some(longitude)) = (parse("SOS_BEACON_LAT"), parse("SOS_BEACON_LON")) {
            let accuracy = parse("SOS_BEACON_ACCURACY").unwrap_or(0.0);
            self.location = Some(Location {
                latitude,
                longitude,
                accuracy,
            });
        }
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_millis(self.status_ttl_ms)
    }

    pub fn ip_timeout(&self) -> Duration {
        Duration::from_secs(self.ip_timeout_secs)
    }

    pub fn utc_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
