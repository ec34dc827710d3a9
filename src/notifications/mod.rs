//! Outbound notification messages consumed by the platform mailer.
//!
//! Delivery is fire-and-forget from this service's perspective: success
//! means the message was handed to the transport, nothing more.

pub mod smtp;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationEmail {
    pub kind: &'static str,
    pub first_name: String,
    pub email: String,
    pub passcode: String,
}

impl VerificationEmail {
    pub fn new(first_name: String, email: String, passcode: String) -> Self {
        Self {
            kind: "verify",
            first_name,
            email,
            passcode,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeEmail {
    pub kind: &'static str,
    pub first_name: String,
    pub email: String,
}

impl WelcomeEmail {
    pub fn new(first_name: String, email: String) -> Self {
        Self {
            kind: "welcome",
            first_name,
            email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordEmail {
    pub kind: &'static str,
    pub first_name: String,
    pub email: String,
    pub token: String,
}

impl ResetPasswordEmail {
    pub fn new(first_name: String, email: String, token: String) -> Self {
        Self {
            kind: "reset",
            first_name,
            email,
            token,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationProducer: Send + Sync {
    async fn send_verification_email(&self, message: &VerificationEmail) -> Result<(), AppError>;

    async fn send_welcome_email(&self, message: &WelcomeEmail) -> Result<(), AppError>;

    async fn send_reset_password_email(&self, message: &ResetPasswordEmail)
        -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_kind_tag() {
        let verify = VerificationEmail::new("Ada".into(), "ada@example.com".into(), "AB23XY".into());
        let welcome = WelcomeEmail::new("Ada".into(), "ada@example.com".into());
        let reset =
            ResetPasswordEmail::new("Ada".into(), "ada@example.com".into(), "abc123".into());
        assert_eq!(verify.kind, "verify");
        assert_eq!(welcome.kind, "welcome");
        assert_eq!(reset.kind, "reset");
    }

    #[test]
    fn messages_serialize_camel_case_for_the_bus() {
        let verify =
            VerificationEmail::new("Ada".into(), "ada@example.com".into(), "AB23XY".into());
        let json = serde_json::to_value(&verify).expect("serialize");
        assert_eq!(json["kind"], "verify");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["passcode"], "AB23XY");
    }
}
