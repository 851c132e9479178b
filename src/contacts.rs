//! Persisted list of emergency contacts.
//!
//! The list lives under a single key as a JSON array of digit strings and is
//! rewritten in full after every successful mutation. A stored list holding
//! an invalid or repeated number is ignored as a whole.

use std::collections::HashSet;

use crate::db::Database;
use crate::error::AlertError;
use crate::models::Contact;

/// Storage key holding the JSON array of contacts.
pub const CONTACTS_KEY: &str = "familyContacts";

/// Ordered, duplicate-free list of emergency contacts.
pub struct ContactStore {
    db: Database,
    contacts: Vec<Contact>,
}

impl ContactStore {
    /// Open the store, reading whatever list is already persisted.
    pub fn open(db: Database) -> Self {
        let contacts = read_contacts(&db);
        tracing::debug!(count = contacts.len(), "loaded emergency contacts");
        Self { db, contacts }
    }

    /// Read the persisted list.
    ///
    /// A missing entry, an unreadable database or a payload that is not a
    /// JSON array of strings all yield an empty list.
    pub fn load(&self) -> Vec<Contact> {
        read_contacts(&self.db)
    }

    /// The list as currently held in memory, in insertion order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contact> {
        self.contacts.get(index)
    }

    /// Clean `raw_input`, append it and persist the list.
    ///
    /// On any error the list is left as it was.
    pub fn add(&mut self, raw_input: &str) -> Result<Contact, AlertError> {
        let contact = Contact::parse(raw_input)?;
        if self.contacts.contains(&contact) {
            return Err(AlertError::DuplicateContact(contact.into_string()));
        }

        self.contacts.push(contact.clone());
        if let Err(e) = self.persist() {
            self.contacts.pop();
            return Err(e);
        }

        tracing::info!(contact = %contact, "added emergency contact");
        Ok(contact)
    }

    /// Delete the contact at `index`. Later contacts shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<(), AlertError> {
        if index >= self.contacts.len() {
            return Err(AlertError::IndexOutOfRange {
                index,
                len: self.contacts.len(),
            });
        }

        let removed = self.contacts.remove(index);
        if let Err(e) = self.persist() {
            self.contacts.insert(index, removed);
            return Err(e);
        }

        tracing::info!(contact = %removed, index, "removed emergency contact");
        Ok(())
    }

    fn persist(&self) -> Result<(), AlertError> {
        let payload = serde_json::to_string(&self.contacts).map_err(anyhow::Error::from)?;
        self.db.set(CONTACTS_KEY, &payload)?;
        Ok(())
    }
}

fn read_contacts(db: &Database) -> Vec<Contact> {
    let payload = match db.get(CONTACTS_KEY) {
        Ok(Some(payload)) => payload,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read emergency contacts: {}", e);
            return Vec::new();
        }
    };

    let contacts: Vec<Contact> = match serde_json::from_str(&payload) {
        Ok(contacts) => contacts,
        Err(e) => {
            tracing::warn!("Ignoring corrupt emergency contact list: {}", e);
            return Vec::new();
        }
    };

    let duplicate = {
        let mut seen = HashSet::new();
        contacts.iter().find(|c| !seen.insert(c.as_str())).cloned()
    };
    if let Some(duplicate) = duplicate {
        tracing::warn!(
            contact = %duplicate,
            "Ignoring emergency contact list with duplicate entries"
        );
        return Vec::new();
    }
    contacts
}

/// Render a contact for display, e.g. `+91 99999 99999`.
///
/// Ten-digit numbers are treated as national numbers. Longer numbers
/// starting with `91` or with a trunk `0` are reduced to their national part
/// first. Anything else is returned unchanged.
pub fn format_for_display(number: &str) -> String {
    let national = if number.len() == 10 {
        Some(number)
    } else if number.len() > 10 && number.starts_with("91") {
        number.get(2..)
    } else if number.len() > 10 && number.starts_with('0') {
        number.get(1..)
    } else {
        None
    };

    match national.and_then(|n| Some((n.get(..5)?, n.get(5..)?))) {
        Some((head, tail)) => format!("+91 {} {}", head, tail),
        None => number.to_string(),
    }
}
