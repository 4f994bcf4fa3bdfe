//! Authentication
//!
//! Passwordless OTP login, the locally stored session it produces, and the
//! one-shot move of guest results into a new account.

mod error;
mod migration;
mod otp;
mod session;

pub use error::AuthError;
pub use migration::{migrate_guest_data, GuestMigrationApi, MigrationOutcome};
pub use otp::{validate_email, validate_otp_code, OtpApi, OtpConfig, OtpLogin, OtpStage};
pub use session::{AuthStore, SimpleAuthSession};
