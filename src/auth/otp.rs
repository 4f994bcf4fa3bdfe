//! Two-screen OTP login
//!
//! The user enters an email, the backend sends a code, the user enters the
//! code. Code generation and checking happen on the backend; this side only
//! validates input and tracks the validity countdown and resend cooldown.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::time::Instant;

use super::error::AuthError;
use super::session::SimpleAuthSession;
use crate::client::{BackendClient, ClientError, OtpRequestResponse};
use crate::localization::Language;

/// Backend operations the login flow needs
#[async_trait]
pub trait OtpApi: Send + Sync {
    async fn request_otp(
        &self,
        email: &str,
        language: Language,
    ) -> Result<OtpRequestResponse, ClientError>;

    async fn verify_otp(&self, email: &str, code: &str) -> Result<SimpleAuthSession, ClientError>;
}

#[async_trait]
impl OtpApi for BackendClient {
    async fn request_otp(
        &self,
        email: &str,
        language: Language,
    ) -> Result<OtpRequestResponse, ClientError> {
        BackendClient::request_otp(self, email, language).await
    }

    async fn verify_otp(&self, email: &str, code: &str) -> Result<SimpleAuthSession, ClientError> {
        BackendClient::verify_otp(self, email, code).await
    }
}

/// Timing rules for the login flow
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// How long a sent code stays valid
    pub code_validity: Duration,
    /// Minimum gap between two code requests
    pub resend_cooldown: Duration,
    pub code_length: usize,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_validity: Duration::from_secs(600),
            resend_cooldown: Duration::from_secs(60),
            code_length: 6,
        }
    }
}

/// Where the user is in the login flow
#[derive(Debug, Clone)]
pub enum OtpStage {
    Email,
    Otp {
        email: String,
        sent_at: Instant,
        expires_at: Instant,
    },
    Authenticated(SimpleAuthSession),
}

static EMAIL_PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn email_regex() -> Result<&'static Regex, AuthError> {
    EMAIL_PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"))
        .as_ref()
        .map_err(|e| AuthError::Internal(format!("Regex error: {}", e)))
}

/// Check an email address and return it trimmed
pub fn validate_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim();

    if email_regex()?.is_match(email) {
        Ok(email.to_string())
    } else {
        Err(AuthError::InvalidEmail(email.to_string()))
    }
}

/// Check a code has exactly `length` digits and return it trimmed
pub fn validate_otp_code(code: &str, length: usize) -> Result<String, AuthError> {
    let code = code.trim();
    if code.len() == length && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(code.to_string())
    } else {
        Err(AuthError::InvalidCode(length))
    }
}

fn whole_seconds(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

/// OTP login state machine
pub struct OtpLogin {
    api: Arc<dyn OtpApi>,
    config: OtpConfig,
    language: Language,
    stage: OtpStage,
}

impl OtpLogin {
    pub fn new(api: Arc<dyn OtpApi>, config: OtpConfig, language: Language) -> Self {
        Self {
            api,
            config,
            language,
            stage: OtpStage::Email,
        }
    }

    pub fn stage(&self) -> &OtpStage {
        &self.stage
    }

    /// Email the code was sent to
    pub fn email(&self) -> Option<&str> {
        match &self.stage {
            OtpStage::Otp { email, .. } => Some(email),
            OtpStage::Authenticated(session) => Some(&session.email),
            OtpStage::Email => None,
        }
    }

    /// Validate the email and ask the backend to send a code
    pub async fn request_code(&mut self, email: &str) -> Result<(), AuthError> {
        if !matches!(self.stage, OtpStage::Email) {
            return Err(AuthError::WrongStage("request_code"));
        }
        let email = validate_email(email)?;
        self.send_code(email).await
    }

    async fn send_code(&mut self, email: String) -> Result<(), AuthError> {
        let response = self.api.request_otp(&email, self.language).await?;

        let validity = response
            .expires_in_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.config.code_validity);
        let sent_at = Instant::now();

        tracing::info!(
            email = %email,
            validity_secs = validity.as_secs(),
            "Login code requested"
        );

        self.stage = OtpStage::Otp {
            email,
            sent_at,
            expires_at: sent_at + validity,
        };
        Ok(())
    }

    /// Time left before the current code expires
    pub fn remaining(&self) -> Option<Duration> {
        match &self.stage {
            OtpStage::Otp { expires_at, .. } => {
                Some(expires_at.saturating_duration_since(Instant::now()))
            }
            _ => None,
        }
    }

    pub fn is_code_expired(&self) -> bool {
        self.remaining().map(|d| d.is_zero()).unwrap_or(false)
    }

    /// Time left before another code may be requested
    pub fn resend_available_in(&self) -> Option<Duration> {
        match &self.stage {
            OtpStage::Otp { sent_at, .. } => {
                Some(self.config.resend_cooldown.saturating_sub(sent_at.elapsed()))
            }
            _ => None,
        }
    }

    pub fn can_resend(&self) -> bool {
        self.resend_available_in()
            .map(|d| d.is_zero())
            .unwrap_or(false)
    }

    /// Request a fresh code for the same email once the cooldown has passed
    pub async fn resend(&mut self) -> Result<(), AuthError> {
        let email = match &self.stage {
            OtpStage::Otp { email, .. } => email.clone(),
            _ => return Err(AuthError::WrongStage("resend")),
        };

        if let Some(wait) = self.resend_available_in() {
            if !wait.is_zero() {
                return Err(AuthError::ResendCooldown {
                    seconds: whole_seconds(wait),
                });
            }
        }

        self.send_code(email).await
    }

    /// Check the code with the backend; on success the flow is finished
    pub async fn verify(&mut self, code: &str) -> Result<SimpleAuthSession, AuthError> {
        let email = match &self.stage {
            OtpStage::Otp { email, .. } => email.clone(),
            _ => return Err(AuthError::WrongStage("verify")),
        };

        let code = validate_otp_code(code, self.config.code_length)?;
        if self.is_code_expired() {
            return Err(AuthError::CodeExpired);
        }

        let session = self.api.verify_otp(&email, &code).await?;
        tracing::info!(user_id = session.user_id, "Login verified");

        self.stage = OtpStage::Authenticated(session.clone());
        Ok(session)
    }

    /// Return to the email screen, dropping the pending code
    pub fn back_to_email(&mut self) {
        self.stage = OtpStage::Email;
    }
}
