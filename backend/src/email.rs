//! Email - invio via SMTP e contenuto delle email applicative
//!
//! [`EmailSender`] incapsula il trasporto SMTP asincrono di `lettre`. Se
//! `SMTP_HOST` o `EMAILS_FROM_EMAIL` mancano l'invio è disabilitato e
//! [`EmailSender::send`] restituisce [`EmailError::Disabled`].

use crate::core::Config;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email sending is not configured")]
    Disabled,

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("email build error: {0}")]
    Build(#[from] lettre::error::Error),
}

/// Oggetto e corpo HTML di una email
#[derive(Debug, Clone, PartialEq)]
pub struct EmailData {
    pub subject: String,
    pub html_content: String,
}

#[derive(Debug, Clone)]
struct SmtpSettings {
    host: String,
    port: u16,
    tls: bool,
    ssl: bool,
    user: Option<String>,
    password: Option<String>,
    from_email: String,
    from_name: String,
}

pub struct EmailSender {
    smtp: Option<SmtpSettings>,
}

impl EmailSender {
    pub fn from_config(config: &Config) -> Self {
        let smtp = match (&config.smtp_host, &config.emails_from_email) {
            (Some(host), Some(from_email)) => Some(SmtpSettings {
                host: host.clone(),
                port: config.smtp_port,
                tls: config.smtp_tls,
                ssl: config.smtp_ssl,
                user: config.smtp_user.clone(),
                password: config.smtp_password.clone(),
                from_email: from_email.clone(),
                from_name: config
                    .emails_from_name
                    .clone()
                    .unwrap_or_else(|| config.project_name.clone()),
            }),
            _ => None,
        };
        Self { smtp }
    }

    pub fn is_enabled(&self) -> bool {
        self.smtp.is_some()
    }

    #[instrument(skip(self, email), fields(subject = %email.subject))]
    pub async fn send(&self, email_to: &str, email: EmailData) -> Result<(), EmailError> {
        let smtp = self.smtp.as_ref().ok_or(EmailError::Disabled)?;

        let message = Message::builder()
            .from(Mailbox::new(
                Some(smtp.from_name.clone()),
                smtp.from_email.parse()?,
            ))
            .to(email_to.parse()?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html_content)?;

        // SSL implicito, STARTTLS oppure connessione in chiaro
        let mut builder = if smtp.ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
        } else if smtp.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
        }
        .port(smtp.port);

        if let (Some(user), Some(password)) = (&smtp.user, &smtp.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        builder.build().send(message).await?;
        info!(to = email_to, "Email sent");
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(project_name: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family: Arial, sans-serif\">\
         <h2>{}</h2>{}</body></html>",
        escape_html(project_name),
        body
    )
}

pub fn generate_test_email(config: &Config, email_to: &str) -> EmailData {
    let project_name = &config.project_name;
    EmailData {
        subject: format!("{project_name} - Test email"),
        html_content: layout(
            project_name,
            &format!(
                "<p>Test email for: {}</p>",
                escape_html(email_to)
            ),
        ),
    }
}

pub fn generate_reset_password_email(config: &Config, email_to: &str, token: &str) -> EmailData {
    let project_name = &config.project_name;
    let link = format!(
        "{}/reset-password?token={}",
        config.frontend_host.trim_end_matches('/'),
        token
    );
    EmailData {
        subject: format!("{project_name} - Password recovery for user {email_to}"),
        html_content: layout(
            project_name,
            &format!(
                "<p>Hello {email}</p>\
                 <p>We've received a request to reset your password. \
                 You can do it by clicking the link below:</p>\
                 <p><a href=\"{link}\">Reset password</a></p>\
                 <p>This link will expire in {hours} hours.</p>\
                 <p>If you didn't request a password recovery you can disregard this email.</p>",
                email = escape_html(email_to),
                link = escape_html(&link),
                hours = config.email_reset_token_expire_hours,
            ),
        ),
    }
}

pub fn generate_new_account_email(config: &Config, username: &str, password: &str) -> EmailData {
    let project_name = &config.project_name;
    EmailData {
        subject: format!("{project_name} - New account for user {username}"),
        html_content: layout(
            project_name,
            &format!(
                "<p>Welcome to your new account!</p>\
                 <p>Here are your credentials:</p>\
                 <p>Username: {username}</p>\
                 <p>Password: {password}</p>\
                 <p><a href=\"{link}\">Go to Dashboard</a></p>",
                username = escape_html(username),
                password = escape_html(password),
                link = escape_html(&config.frontend_host),
            ),
        ),
    }
}
