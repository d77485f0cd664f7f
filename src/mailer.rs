use lettre::address::Envelope;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::error::AppError;
use crate::models::BugReport;

/// `[<product>][<category>] <action>`
pub fn subject(report: &BugReport) -> String {
    format!("[{}][{}] {}", report.product, report.category, report.action)
}

pub fn body(report: &BugReport) -> String {
    format!(
        "\nContext: {}\n\nDescription: {}\n",
        report.context, report.description
    )
}

pub fn parse_recipient(address: &str) -> Result<Mailbox, AppError> {
    address
        .parse()
        .map_err(|e| AppError::Config(format!("invalid recipient '{}': {}", address, e)))
}

/// Build the outgoing message for a report.
///
/// The sender is whatever the submitter typed. lettre's address parser
/// refuses anything that is not a single mailbox, so a malformed address
/// fails here rather than at the relay. An empty address is allowed: the
/// message goes out with a null reverse-path and the recipient in `From`.
pub fn compose(report: &BugReport, recipient: &Mailbox) -> Result<Message, AppError> {
    let builder = if report.email.trim().is_empty() {
        let envelope = Envelope::new(None, vec![recipient.email.clone()])
            .map_err(|e| AppError::Compose(format!("bad envelope: {}", e)))?;
        Message::builder().from(recipient.clone()).envelope(envelope)
    } else {
        let from: Mailbox = report.email.parse().map_err(|e| {
            AppError::Compose(format!("invalid sender address '{}': {}", report.email, e))
        })?;
        Message::builder().from(from)
    };

    let builder = builder.to(recipient.clone()).subject(subject(report));
    let text = SinglePart::plain(body(report));

    let message = match &report.screenshot {
        Some(shot) => {
            let mime = mime_guess::from_path(&shot.filename).first_or_octet_stream();
            let content_type = ContentType::parse(mime.essence_str())
                .map_err(|e| AppError::Compose(format!("bad content type '{}': {}", mime, e)))?;
            let attachment =
                Attachment::new(shot.filename.clone()).body(shot.data.clone(), content_type);

            builder.multipart(MultiPart::mixed().singlepart(text).singlepart(attachment))
        }
        None => builder.singlepart(text),
    };

    message.map_err(|e| AppError::Compose(e.to_string()))
}

/// Plain, unauthenticated SMTP delivery to a single relay
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    recipient: Mailbox,
}

impl Mailer {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let recipient = parse_recipient(&config.recipient)?;
        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.relay_host.as_str())
                .port(config.relay_port)
                .timeout(Some(config.relay_timeout))
                .build();

        Ok(Self { transport, recipient })
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.recipient
    }

    /// One delivery attempt. No retry.
    pub async fn send(&self, report: &BugReport) -> Result<(), AppError> {
        let message = compose(report, &self.recipient)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))?;
        Ok(())
    }
}
