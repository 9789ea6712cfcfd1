use anyhow::{Context, Result, anyhow};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Outbound mail sender. Without SMTP config it runs log-only: every send is
/// logged and acknowledged, so the rest of the platform works in dev without
/// a relay.
pub struct Mailer {
    smtp: Option<SmtpConfig>,
    from_email: String,
    from_name: String,
}

impl Mailer {
    pub fn new(smtp: Option<SmtpConfig>, from_email: String, from_name: String) -> Self {
        Self { smtp, from_email, from_name }
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let Some(smtp) = &self.smtp else {
            info!("SMTP unconfigured; would send '{}' to {}", subject, to);
            return Ok(());
        };

        let email = Message::builder()
            .from(
                format!("{} <{}>", self.from_name, self.from_email)
                    .parse()
                    .map_err(|e| anyhow!("invalid from address: {}", e))?,
            )
            .to(to.parse().map_err(|e| anyhow!("invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .context("failed to build email")?;

        let mailer = SmtpTransport::relay(&smtp.server)
            .map_err(|e| anyhow!("SMTP relay error: {}", e))?
            .port(smtp.port)
            .credentials(Credentials::new(smtp.username.clone(), smtp.password.clone()))
            .build();

        tokio::task::spawn_blocking(move || {
            mailer.send(&email).map_err(|e| anyhow!("failed to send email: {}", e))
        })
        .await
        .map_err(|e| anyhow!("email task failed: {}", e))??;

        Ok(())
    }
}
