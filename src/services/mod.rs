// Service exports
pub mod digest;
pub mod email;
pub mod ledger;
pub mod notifier;
pub mod source;
pub mod whatsapp;

pub use email::EmailNotifier;
pub use ledger::{Ledger, LedgerError};
pub use notifier::{DispatchResult, Dispatcher, Notifier, NotifyError};
pub use source::{build_search_queries, HttpListingSource, ListingSource, SourceError};
pub use whatsapp::WhatsAppNotifier;

use crate::config::NotificationSettings;

/// Build the dispatcher for every enabled channel
///
/// A channel that is enabled but missing credentials is skipped with a
/// warning instead of failing startup.
pub fn build_dispatcher(settings: &NotificationSettings) -> Dispatcher {
    let mut dispatcher = Dispatcher::empty();

    if settings.email.enabled {
        match EmailNotifier::from_settings(&settings.email) {
            Ok(notifier) => dispatcher.add_channel(Box::new(notifier)),
            Err(e) => tracing::warn!("Skipping email notifications: {}", e),
        }
    }

    if settings.whatsapp.enabled {
        match WhatsAppNotifier::from_settings(&settings.whatsapp) {
            Ok(notifier) => dispatcher.add_channel(Box::new(notifier)),
            Err(e) => tracing::warn!("Skipping WhatsApp notifications: {}", e),
        }
    }

    dispatcher
}
