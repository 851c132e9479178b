use serde::{Deserialize, Serialize};

/// An outbound dispatch mechanism, reached through a URI scheme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Call,
    Sms,
    #[serde(rename = "whatsapp")]
    WhatsApp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
        }
    }

    /// Name of the app the channel opens, as used in status messages.
    pub fn app_name(&self) -> &'static str {
        match self {
            Self::Call => "Dialer",
            Self::Sms => "SMS app",
            Self::WhatsApp => "WhatsApp",
        }
    }
}

/// How one alert is fanned out over the stored contacts.
///
/// - `BroadcastFirst`: a single hand-off to the first contact; the user is
///   asked to forward the alert to everyone else.
/// - `Sequential`: one hand-off per contact in list order, each started only
///   after the user has dealt with the previous one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SendPolicy {
    BroadcastFirst,
    Sequential,
}

impl SendPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BroadcastFirst => "broadcast-first",
            Self::Sequential => "sequential",
        }
    }
}
