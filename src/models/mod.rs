//! Domain models.
//!
//! - [`Contact`]: a stored, digit-only emergency phone number.
//! - [`DeviceSnapshot`]: best-effort bundle of the latest location, public IP
//!   and battery readings. Never persisted.
//! - [`AlertMessage`]: the text sent to contacts, derived per send action.
//! - [`Channel`] and [`SendPolicy`]: how an alert leaves the device.

mod channel;
mod contact;
mod message;
mod snapshot;

pub use channel::*;
pub use contact::*;
pub use message::*;
pub use snapshot::*;
