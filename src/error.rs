//! Error taxonomy for contact management, device probes and dispatch.
//!
//! Every variant's `Display` text is the short message shown to the user in
//! the status bar, so none of these are meant to be fatal.

use thiserror::Error;

use crate::device::{BatteryError, IpLookupError};

/// Errors surfaced by the widget and its components.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Please enter a contact number")]
    EmptyInput,

    #[error("Please enter a valid phone number")]
    InvalidInput { digits: usize },

    #[error("This contact already exists")]
    DuplicateContact(String),

    #[error("No emergency contact at position {index}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0}")]
    LocationUnavailable(#[from] LocationError),

    #[error("IP Address: Unable to fetch")]
    NetworkUnavailable(#[from] IpLookupError),

    #[error("Battery: Status not available")]
    CapabilityUnsupported(#[from] BatteryError),

    #[error("No emergency contacts available")]
    NoContacts,

    #[error("No emergency alert is waiting to be sent")]
    NothingPending,

    #[error("Could not save emergency contacts: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Why a position fix could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("User denied the request for Geolocation.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    PositionUnavailable,

    #[error("The request to get user location timed out.")]
    Timeout,

    #[error("An unknown error occurred.")]
    Unknown,

    #[error("Geolocation is not supported by this device.")]
    Unsupported,
}
