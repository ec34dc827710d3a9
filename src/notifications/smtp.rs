//! SMTP-backed notification producer.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;

use crate::error::AppError;
use crate::notifications::{
    NotificationProducer, ResetPasswordEmail, VerificationEmail, WelcomeEmail,
};

pub struct SmtpNotificationProducer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotificationProducer {
    pub fn new() -> anyhow::Result<Self> {
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_address = env::var("SMTP_FROM_ADDRESS")
            .unwrap_or_else(|_| "noreply@identity.local".to_string());

        let mailer = if smtp_username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp_host)
                .port(smtp_port)
                .build()
        } else {
            let creds = Credentials::new(smtp_username, smtp_password);
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp_host)?
                .port(smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from_address,
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), AppError> {
        if env::var("SMTP_SKIP_SEND").unwrap_or_default() == "true" {
            return Ok(());
        }

        let email = Message::builder()
            .from(self.from_address.parse().map_err(map_mail_error)?)
            .to(to.parse().map_err(map_mail_error)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(map_mail_error)?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("smtp: {}", e)))?;
        Ok(())
    }
}

fn map_mail_error<E: std::fmt::Display>(err: E) -> AppError {
    AppError::UpstreamUnavailable(format!("mail build: {}", err))
}

#[async_trait]
impl NotificationProducer for SmtpNotificationProducer {
    async fn send_verification_email(&self, message: &VerificationEmail) -> Result<(), AppError> {
        tracing::info!(email = %message.email, "Sending verification email");
        let body = format!(
            "Hi {},\n\n\
             Your email verification passcode is: {}\n\n\
             The passcode expires in 15 minutes.\n",
            message.first_name, message.passcode
        );
        self.send(&message.email, "Verify your email address", body)
            .await
    }

    async fn send_welcome_email(&self, message: &WelcomeEmail) -> Result<(), AppError> {
        tracing::info!(email = %message.email, "Sending welcome email");
        let body = format!(
            "Hi {},\n\n\
             Your email address has been verified. Welcome aboard!\n",
            message.first_name
        );
        self.send(&message.email, "Welcome", body).await
    }

    async fn send_reset_password_email(
        &self,
        message: &ResetPasswordEmail,
    ) -> Result<(), AppError> {
        tracing::info!(email = %message.email, "Sending reset password email");
        let body = format!(
            "Hi {},\n\n\
             We received a request to reset your password.\n\
             Your reset token is: {}\n\n\
             The token expires in 15 minutes. If you did not request a reset,\n\
             you can ignore this message.\n",
            message.first_name, message.token
        );
        self.send(&message.email, "Password reset request", body)
            .await
    }
}
