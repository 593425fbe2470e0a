use crate::notify::{NoticeSender, StdoutNotifier};
use anyhow::Result;
use pickup_config::{AppConfig, NotificationBackend};
use pickup_service::{CollectionNotifier, NoopNotifier, SchedulingService};
use pickup_store::Store;
use serde::Serialize;
use std::io::{self, Write};

pub mod availability;
pub mod bookings;
pub mod collect;
pub mod completions;
pub mod fees;
pub mod payments;
pub mod residents;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
}

impl Context<'_> {
    /// Notices go through the configured backend. JSON output stays clean, so
    /// stdout notices are dropped in `--json` mode.
    pub fn notifier(&self) -> Result<Box<dyn CollectionNotifier>> {
        let notifications = &self.config.notifications;
        if !notifications.enabled {
            return Ok(Box::new(NoopNotifier));
        }
        match notifications.backend {
            NotificationBackend::Stdout if self.json => Ok(Box::new(NoopNotifier)),
            NotificationBackend::Stdout => Ok(Box::new(NoticeSender::new(StdoutNotifier))),
            NotificationBackend::Email => email_notifier(self.config),
        }
    }

    pub fn service<'a>(&'a self, notifier: &'a dyn CollectionNotifier) -> SchedulingService<'a> {
        SchedulingService::new(
            self.store,
            self.store,
            notifier,
            self.config.scheduling,
            self.config.fees.clone(),
        )
    }
}

#[cfg(feature = "email-notify")]
fn email_notifier(config: &AppConfig) -> Result<Box<dyn CollectionNotifier>> {
    use crate::error::invalid_input;
    use crate::notify::EmailNotifier;

    let email = config
        .notifications
        .email
        .as_ref()
        .ok_or_else(|| invalid_input("notifications.email is required for the email backend"))?;
    Ok(Box::new(NoticeSender::new(EmailNotifier::new(email)?)))
}

#[cfg(not(feature = "email-notify"))]
fn email_notifier(_config: &AppConfig) -> Result<Box<dyn CollectionNotifier>> {
    Err(crate::error::invalid_input(
        "email notifications require the email-notify feature",
    ))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
