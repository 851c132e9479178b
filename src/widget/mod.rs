//! The SOS widget controller.
//!
//! [`Widget`] is the context object that lives from mount to drop. It owns
//! the contact store, the device snapshot and the status bar, and routes
//! every [`Command`] through [`Widget::handle`].

mod command;
mod status;

pub use command::*;
pub use status::*;

use std::sync::Arc;

use crate::alert::{
    broadcast_first, channel_uri, compose, is_emergency_code, SequentialSend, UriDispatcher,
};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::contacts::{format_for_display, ContactStore};
use crate::db::Database;
use crate::device::{apply_location, DeviceProbes};
use crate::error::AlertError;
use crate::models::{
    AlertMessage, Channel, Contact, DeviceSnapshot, LocationStatus, SendPolicy,
};

pub struct Widget {
    config: AppConfig,
    store: ContactStore,
    snapshot: DeviceSnapshot,
    location_status: LocationStatus,
    probes: DeviceProbes,
    dispatcher: Arc<dyn UriDispatcher>,
    clock: Arc<dyn Clock>,
    status: StatusBar,
    sound_enabled: bool,
    pending: Option<SequentialSend>,
}

impl Widget {
    pub fn mount(
        config: AppConfig,
        db: Database,
        probes: DeviceProbes,
        dispatcher: Arc<dyn UriDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = ContactStore::open(db);
        let status = StatusBar::new(config.status_ttl());
        let sound_enabled = config.sound_enabled;
        Self {
            config,
            store,
            snapshot: DeviceSnapshot::default(),
            location_status: LocationStatus::Pending,
            probes,
            dispatcher,
            clock,
            status,
            sound_enabled,
            pending: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn contacts(&self) -> &[Contact] {
        self.store.contacts()
    }

    pub fn snapshot(&self) -> &DeviceSnapshot {
        &self.snapshot
    }

    pub fn location_status(&self) -> LocationStatus {
        self.location_status
    }

    /// The status message, while it is still visible.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.visible()
    }

    pub fn pending_send(&self) -> Option<&SequentialSend> {
        self.pending.as_ref()
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// The alert as it would be sent right now.
    pub fn compose_now(&self) -> AlertMessage {
        compose(&self.snapshot, &self.clock.now())
    }

    /// Re-sample location, IP and battery.
    pub async fn refresh_device(&mut self) -> Vec<AlertError> {
        self.probes
            .refresh(&mut self.snapshot, &mut self.location_status)
            .await
    }

    pub async fn handle(&mut self, command: Command) -> StatusMessage {
        tracing::debug!(?command, "handling command");

        let result = match command {
            Command::AddContact(raw) => self
                .store
                .add(&raw)
                .map(|_| "Emergency contact added successfully".to_string()),
            Command::RemoveContact(index) => self
                .store
                .remove(index)
                .map(|_| "Emergency contact removed".to_string()),
            Command::CallContact(index) => self.call_contact(index),
            Command::CallEmergency(code) => Ok(self.call_number(&code)),
            Command::CallNumber(contact) => Ok(self.call_number(contact.as_str())),
            Command::ShareWithContact(index) => self.share_with_contact(index),
            Command::ShareWithAll => self.share_with_all(),
            Command::SendSos(channel) => match self.send_sos(channel).await {
                Ok(text) => Ok(text),
                Err(AlertError::NoContacts) => {
                    return self
                        .status
                        .error("No emergency contacts added. Please add contacts first.")
                }
                Err(e) => Err(e),
            },
            Command::ContinueSend => self.continue_send(),
            Command::CancelSend => {
                if let Some(mut send) = self.pending.take() {
                    send.cancel();
                }
                return self.status.info("Emergency alert cancelled");
            }
            Command::RefreshDevice => {
                let errors = self.refresh_device().await;
                if errors.is_empty() {
                    Ok("Location, IP and battery updated".to_string())
                } else {
                    let text = errors
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join(" ");
                    return self.status.info(text);
                }
            }
            Command::ToggleSound => {
                self.sound_enabled = !self.sound_enabled;
                Ok(if self.sound_enabled {
                    "Sound ON".to_string()
                } else {
                    "Sound OFF".to_string()
                })
            }
        };

        match result {
            Ok(text) => self.status.success(text),
            Err(e) => self.status.error(e.to_string()),
        }
    }

    fn contact_at(&self, index: usize) -> Result<Contact, AlertError> {
        self.store
            .get(index)
            .cloned()
            .ok_or(AlertError::IndexOutOfRange {
                index,
                len: self.store.len(),
            })
    }

    fn call_contact(&self, index: usize) -> Result<String, AlertError> {
        let contact = self.contact_at(index)?;
        Ok(self.call_number(contact.as_str()))
    }

    fn call_number(&self, number: &str) -> String {
        let uri = channel_uri(Channel::Call, number, None);
        self.dispatcher.dispatch(&uri);

        if is_emergency_code(number) {
            format!("Calling {}", number)
        } else {
            format!("Calling {}", format_for_display(number))
        }
    }

    fn share_with_contact(&self, index: usize) -> Result<String, AlertError> {
        let contact = self.contact_at(index)?;
        let message = self.compose_now();
        let uri = channel_uri(Channel::WhatsApp, contact.as_str(), Some(&message));
        self.dispatcher.dispatch(&uri);
        Ok("WhatsApp opened with emergency alert".to_string())
    }

    fn share_with_all(&self) -> Result<String, AlertError> {
        let message = self.compose_now();
        let report = broadcast_first(
            Channel::WhatsApp,
            self.store.contacts(),
            &message,
            self.dispatcher.as_ref(),
        )?;
        Ok(report.status_text())
    }

    /// The SOS button.
    ///
    /// Without a known position the location is requested again and given
    /// at most the grace period to settle; the alert is then composed with
    /// whatever is available.
    async fn send_sos(&mut self, channel: Channel) -> Result<String, AlertError> {
        if self.store.is_empty() {
            return Err(AlertError::NoContacts);
        }

        if self.sound_enabled {
            tracing::info!("SOS tone requested");
        }

        if self.snapshot.location.is_none() {
            self.status.info("Getting your location for the alert...");
            let result = self.probes.locate_within(self.config.grace_period()).await;
            // A missing position is not fatal here; the message says so.
            let _ = apply_location(&mut self.snapshot, &mut self.location_status, result);
        }

        let message = self.compose_now();
        if let Some(mut previous) = self.pending.take() {
            previous.cancel();
        }

        let policy = self.config.policies.for_channel(channel);
        tracing::info!(
            channel = channel.as_str(),
            policy = policy.as_str(),
            contacts = self.store.len(),
            "sending SOS"
        );

        match policy {
            SendPolicy::BroadcastFirst => {
                let report = broadcast_first(
                    channel,
                    self.store.contacts(),
                    &message,
                    self.dispatcher.as_ref(),
                )?;
                Ok(report.status_text())
            }
            SendPolicy::Sequential => {
                self.pending = Some(SequentialSend::new(
                    channel,
                    self.store.contacts(),
                    message,
                )?);
                self.continue_send()
            }
        }
    }

    fn continue_send(&mut self) -> Result<String, AlertError> {
        let Some(send) = self.pending.as_mut() else {
            return Err(AlertError::NothingPending);
        };

        let text = match send.advance(self.dispatcher.as_ref()) {
            Some(contact) => send.progress_text(&contact),
            None => {
                self.pending = None;
                return Err(AlertError::NothingPending);
            }
        };

        if send.is_finished() {
            self.pending = None;
        }
        Ok(text)
    }
}
