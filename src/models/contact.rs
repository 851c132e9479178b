use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AlertError;

/// An emergency contact: a phone number reduced to its digits.
///
/// Contacts are compared by exact string, so `"919999999999"` and
/// `"9999999999"` are different contacts even though they dial the same
/// number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Contact(String);

impl Contact {
    /// Minimum number of digits a contact must carry.
    pub const MIN_DIGITS: usize = 10;

    /// Clean raw user input into a contact.
    ///
    /// All non-digit characters are dropped. Fails with
    /// [`AlertError::EmptyInput`] for blank input and
    /// [`AlertError::InvalidInput`] when fewer than [`Self::MIN_DIGITS`]
    /// digits remain.
    pub fn parse(raw: &str) -> Result<Self, AlertError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AlertError::EmptyInput);
        }

        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() < Self::MIN_DIGITS {
            return Err(AlertError::InvalidInput {
                digits: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Stored contacts must already be in their cleaned form: digits only, at
/// least [`Contact::MIN_DIGITS`] of them.
impl TryFrom<String> for Contact {
    type Error = AlertError;

    fn try_from(stored: String) -> Result<Self, Self::Error> {
        let contact = Self::parse(&stored)?;
        if contact.0 != stored {
            return Err(AlertError::InvalidInput {
                digits: contact.0.len(),
            });
        }
        Ok(contact)
    }
}

impl From<Contact> for String {
    fn from(contact: Contact) -> Self {
        contact.0
    }
}

impl AsRef<str> for Contact {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_formatting() {
        let contact = Contact::parse("+91 (99999) 99999").unwrap();
        assert_eq!(contact.as_str(), "919999999999");
    }

    #[test]
    fn test_parse_rejects_short_numbers() {
        let err = Contact::parse("999-999-999").unwrap_err();
        assert!(matches!(err, AlertError::InvalidInput { digits: 9 }));
    }

    #[test]
    fn test_parse_rejects_blank_input() {
        assert!(matches!(Contact::parse("   "), Err(AlertError::EmptyInput)));
    }

    #[test]
    fn test_letters_only_is_invalid_not_empty() {
        assert!(matches!(
            Contact::parse("call mom"),
            Err(AlertError::InvalidInput { digits: 0 })
        ));
    }

    #[test]
    fn test_deserialize_accepts_clean_digits() {
        let contact: Contact = serde_json::from_str("\"919999999999\"").unwrap();
        assert_eq!(contact.as_str(), "919999999999");
    }

    #[test]
    fn test_deserialize_rejects_uncleaned_values() {
        for raw in ["\"12\"", "\"abc<script>\"", "\"+91 99999 99999\"", "\" 9999999999\""] {
            assert!(serde_json::from_str::<Contact>(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let contact = Contact::parse("9999999999").unwrap();
        assert_eq!(serde_json::to_string(&contact).unwrap(), "\"9999999999\"");
    }
}
