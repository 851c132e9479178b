use crate::alert::is_emergency_code;
use crate::error::AlertError;
use crate::models::{Channel, Contact};

/// Every user action the widget understands.
///
/// Contact positions are zero-based indices into the stored list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddContact(String),
    RemoveContact(usize),
    /// Dial one stored contact.
    CallContact(usize),
    /// Dial a short national emergency code such as `112`.
    CallEmergency(String),
    /// Dial a number that is not in the stored list.
    CallNumber(Contact),
    /// Compose an alert and open WhatsApp for one stored contact.
    ShareWithContact(usize),
    /// Compose an alert and open WhatsApp for the first contact, asking the
    /// user to forward it to the rest.
    ShareWithAll,
    /// The SOS button: compose an alert and send it over `Channel` using the
    /// channel's configured policy.
    SendSos(Channel),
    /// Hand the pending sequential alert to the next contact.
    ContinueSend,
    CancelSend,
    RefreshDevice,
    ToggleSound,
}

impl Command {
    /// Read a call target typed by the user: a short emergency code, a phone
    /// number of at least [`Contact::MIN_DIGITS`] digits, or a one-based
    /// list position.
    pub fn call(target: &str) -> Result<Self, AlertError> {
        let target = target.trim();
        if is_emergency_code(target) {
            return Ok(Self::CallEmergency(target.to_string()));
        }

        let digits = target.chars().filter(|c| c.is_ascii_digit()).count();
        if digits >= Contact::MIN_DIGITS {
            return Contact::parse(target).map(Self::CallNumber);
        }

        target
            .parse::<usize>()
            .ok()
            .and_then(|position| position.checked_sub(1))
            .map(Self::CallContact)
            .ok_or(AlertError::InvalidInput { digits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_emergency_code() {
        assert_eq!(
            Command::call("112").unwrap(),
            Command::CallEmergency("112".to_string())
        );
    }

    #[test]
    fn test_call_phone_number_is_not_a_position() {
        let command = Command::call("9999999999").unwrap();
        assert_eq!(
            command,
            Command::CallNumber(Contact::parse("9999999999").unwrap())
        );

        let command = Command::call("+91 98765-43210").unwrap();
        assert_eq!(
            command,
            Command::CallNumber(Contact::parse("919876543210").unwrap())
        );
    }

    #[test]
    fn test_call_list_position() {
        assert_eq!(Command::call("1").unwrap(), Command::CallContact(0));
        assert_eq!(Command::call(" 3 ").unwrap(), Command::CallContact(2));
    }

    #[test]
    fn test_call_rejects_other_input() {
        for target in ["0", "abc", "12-34", ""] {
            assert!(
                matches!(Command::call(target), Err(AlertError::InvalidInput { .. })),
                "{target}"
            );
        }
    }
}
