use crate::contacts::format_for_display;
use crate::error::AlertError;
use crate::models::{AlertMessage, Channel, Contact};

use super::{channel_uri, UriDispatcher};

/// What a broadcast-first send did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub channel: Channel,
    pub contact: Contact,
    pub uri: String,
    pub total_contacts: usize,
}

impl BroadcastReport {
    /// Status text; asks the user to forward the alert when more than one
    /// contact is stored.
    pub fn status_text(&self) -> String {
        if self.total_contacts > 1 {
            format!(
                "{} opened with emergency alert for {} contacts. Please forward to other contacts if needed.",
                self.channel.app_name(),
                self.total_contacts
            )
        } else {
            format!("{} opened with emergency alert", self.channel.app_name())
        }
    }
}

/// Dispatch `message` over `channel` to the first contact only.
pub fn broadcast_first(
    channel: Channel,
    contacts: &[Contact],
    message: &AlertMessage,
    dispatcher: &dyn UriDispatcher,
) -> Result<BroadcastReport, AlertError> {
    let first = contacts.first().ok_or(AlertError::NoContacts)?;
    let uri = channel_uri(channel, first.as_str(), Some(message));
    dispatcher.dispatch(&uri);

    tracing::info!(
        channel = channel.as_str(),
        contact = %first,
        total = contacts.len(),
        "dispatched alert to first contact"
    );

    Ok(BroadcastReport {
        channel,
        contact: first.clone(),
        uri,
        total_contacts: contacts.len(),
    })
}

/// A per-contact send in list order.
///
/// Each [`advance`](Self::advance) dispatches to exactly one contact. The
/// caller waits for the user to finish with the opened app (or to cancel)
/// before advancing again, since the platform gives no completion signal.
#[derive(Debug, Clone)]
pub struct SequentialSend {
    channel: Channel,
    message: AlertMessage,
    contacts: Vec<Contact>,
    next: usize,
    cancelled: bool,
}

impl SequentialSend {
    pub fn new(
        channel: Channel,
        contacts: &[Contact],
        message: AlertMessage,
    ) -> Result<Self, AlertError> {
        if contacts.is_empty() {
            return Err(AlertError::NoContacts);
        }
        Ok(Self {
            channel,
            message,
            contacts: contacts.to_vec(),
            next: 0,
            cancelled: false,
        })
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn message(&self) -> &AlertMessage {
        &self.message
    }

    pub fn total(&self) -> usize {
        self.contacts.len()
    }

    /// Number of contacts already handed off.
    pub fn sent(&self) -> usize {
        self.next
    }

    /// Contact the next `advance` will dispatch to.
    pub fn peek(&self) -> Option<&Contact> {
        if self.cancelled {
            return None;
        }
        self.contacts.get(self.next)
    }

    pub fn remaining(&self) -> usize {
        if self.cancelled {
            0
        } else {
            self.contacts.len() - self.next
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Dispatch to the next contact and return it. `None` once finished or
    /// cancelled.
    pub fn advance(&mut self, dispatcher: &dyn UriDispatcher) -> Option<Contact> {
        let contact = self.peek()?.clone();
        let uri = channel_uri(self.channel, contact.as_str(), Some(&self.message));
        dispatcher.dispatch(&uri);
        self.next += 1;

        tracing::info!(
            channel = self.channel.as_str(),
            contact = %contact,
            position = self.next,
            total = self.contacts.len(),
            "dispatched alert to contact"
        );
        Some(contact)
    }

    pub fn cancel(&mut self) {
        if !self.cancelled {
            tracing::info!(
                sent = self.next,
                total = self.contacts.len(),
                "sequential send cancelled"
            );
        }
        self.cancelled = true;
    }

    /// Status line describing the contact just handed off.
    pub fn progress_text(&self, contact: &Contact) -> String {
        format!(
            "{} opened for contact {} of {} ({})",
            self.channel.app_name(),
            self.next,
            self.contacts.len(),
            format_for_display(contact.as_str())
        )
    }
}
