use anyhow::Result;
use chrono::NaiveDate;
use pickup_core::rules::slot_window;
use pickup_core::{CollectionId, PaymentMethod, TimeSlot};
use pickup_service::{CollectionNotifier, NotifyError};

pub trait Notifier {
    fn send(&self, recipient: &str, title: &str, body: &str) -> Result<()>;
}

pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn send(&self, recipient: &str, title: &str, body: &str) -> Result<()> {
        println!("[{recipient}] {title}: {body}");
        Ok(())
    }
}

/// Renders collection events as short text notices for a `Notifier`.
pub struct NoticeSender<N> {
    notifier: N,
}

impl<N: Notifier> NoticeSender<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }

    fn deliver(&self, recipient: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        self.notifier
            .send(recipient, title, body)
            .map_err(NotifyError::from)
    }
}

impl<N: Notifier> CollectionNotifier for NoticeSender<N> {
    fn send_confirmation(
        &self,
        email: &str,
        id: CollectionId,
        date: NaiveDate,
        slot: TimeSlot,
        fee: i64,
        location: &str,
    ) -> Result<(), NotifyError> {
        let body = format!(
            "Pickup {id} is booked for {date} {slot} ({window}) at {location}. Fee: {fee}.",
            window = slot_window(date, slot),
        );
        self.deliver(email, "pickup booked", &body)
    }

    fn send_payment_notice(
        &self,
        email: &str,
        id: CollectionId,
        fee: i64,
        method: Option<PaymentMethod>,
        success: bool,
    ) -> Result<(), NotifyError> {
        let (title, body) = if success {
            let via = method
                .map(|method| format!(" via {method}"))
                .unwrap_or_default();
            (
                "payment recorded",
                format!("Payment of {fee} for pickup {id} recorded{via}."),
            )
        } else {
            (
                "payment outstanding",
                format!("Pickup {id} is marked unpaid. Amount due: {fee}."),
            )
        };
        self.deliver(email, title, &body)
    }

    fn send_completion_notice(
        &self,
        email: &str,
        id: CollectionId,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> Result<(), NotifyError> {
        let body = format!("Pickup {id} scheduled for {date} {slot} has been collected.");
        self.deliver(email, "pickup completed", &body)
    }
}

#[cfg(feature = "email-notify")]
pub struct EmailNotifier {
    from: lettre::message::Mailbox,
    subject_prefix: String,
    transport: lettre::SmtpTransport,
}

#[cfg(feature = "email-notify")]
impl EmailNotifier {
    pub fn new(config: &pickup_config::NotificationsEmailConfig) -> Result<Self> {
        use crate::error::invalid_input;
        use lettre::transport::smtp::authentication::Credentials;
        use std::env;
        use std::time::Duration;

        let from = config
            .from
            .parse()
            .map_err(|_| invalid_input("notifications.email.from must be a valid email address"))?;

        let mut builder = match config.tls {
            pickup_config::EmailTls::Tls => lettre::SmtpTransport::relay(&config.smtp_host)
                .map_err(|_| invalid_input("invalid notifications.email.smtp_host"))?,
            pickup_config::EmailTls::StartTls => {
                lettre::SmtpTransport::starttls_relay(&config.smtp_host)
                    .map_err(|_| invalid_input("invalid notifications.email.smtp_host"))?
            }
            pickup_config::EmailTls::None => {
                lettre::SmtpTransport::builder_dangerous(&config.smtp_host)
            }
        };

        if let Some(port) = config.smtp_port {
            builder = builder.port(port);
        }

        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Some(Duration::from_secs(seconds)));
        }

        if let (Some(username), Some(password_env)) =
            (config.username.as_deref(), config.password_env.as_deref())
        {
            let password = env::var(password_env)
                .map_err(|_| invalid_input(format!("missing env var {password_env}")))?;
            let password = password.trim();
            if password.is_empty() {
                return Err(invalid_input(format!("env var {password_env} is empty")));
            }
            let credentials = Credentials::new(username.to_string(), password.to_string());
            builder = builder.credentials(credentials);
        }

        Ok(Self {
            from,
            subject_prefix: config.subject_prefix.clone(),
            transport: builder.build(),
        })
    }
}

#[cfg(feature = "email-notify")]
impl Notifier for EmailNotifier {
    fn send(&self, recipient: &str, title: &str, body: &str) -> Result<()> {
        use lettre::message::header::ContentType;
        use lettre::message::Mailbox;
        use lettre::Message;
        use lettre::Transport as _;

        let to: Mailbox = recipient.parse()?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("{}: {title}", self.subject_prefix))
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.transport.send(&message)?;
        Ok(())
    }
}
