//! Emergency SOS alerts.
//!
//! The crate keeps a persisted list of emergency contacts, samples a
//! best-effort [`models::DeviceSnapshot`] (location, public IP, battery),
//! composes an alert message from it and hands the message to the
//! platform's `tel:`, `sms:` or WhatsApp URI handlers.
//!
//! [`widget::Widget`] ties the pieces together behind a typed
//! [`widget::Command`] enumeration.

pub mod alert;
pub mod clock;
pub mod config;
pub mod contacts;
pub mod db;
pub mod device;
pub mod error;
pub mod models;
pub mod widget;

pub use error::{AlertError, LocationError};
