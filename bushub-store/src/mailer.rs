use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::app_config::SmtpConfig;
use bushub_domain::notify::{BookingConfirmation, Notifier, NotifyError};

/// SMTP-backed confirmation sink.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| NotifyError::Delivery(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| NotifyError::Delivery(format!("invalid sender address: {e}")))?;

        Ok(Self { transport, from })
    }
}

fn confirmation_body(c: &BookingConfirmation) -> String {
    format!(
        "Hello {customer},\n\n\
         Your bus ticket has been confirmed with the following details:\n\n\
         Booking ID: {id}\n\
         Route: {route}\n\
         Date: {date}\n\
         Time: {time}\n\
         Seats: {seats}\n\
         Total: {amount}\n\n\
         View your ticket: {link}\n\n\
         Need help? Contact support at {phone} or {email}.\n\n\
         Thank you,\n\
         {company}\n\
         {address}\n",
        customer = c.customer_name,
        id = c.booking_id,
        route = c.route,
        date = c.travel_date,
        time = c.travel_time,
        seats = c.seat_numbers,
        amount = c.amount,
        link = c.booking_link,
        phone = c.company.support_phone,
        email = c.company.support_email,
        company = c.company.name,
        address = c.company.address,
    )
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn booking_confirmed(
        &self,
        to: &str,
        confirmation: &BookingConfirmation,
    ) -> Result<(), NotifyError> {
        let recipient: Mailbox = to
            .parse()
            .map_err(|e| NotifyError::Delivery(format!("invalid recipient '{to}': {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject("Your Bus Booking Confirmation")
            .header(ContentType::TEXT_PLAIN)
            .body(confirmation_body(confirmation))
            .map_err(|e| NotifyError::Delivery(format!("failed to build message: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        info!("Confirmation email sent to {}", to);
        Ok(())
    }
}
