//! Backend REST Client
//!
//! Typed access to the Financial Health backend. The backend owns scoring,
//! OTP generation, report rendering and analytics; this client only moves
//! JSON (and PDF bytes) back and forth.
//!
//! Endpoint groups:
//! - `/surveys/*` - questions, submission, history, guest migration, reports
//! - `/auth/otp/*` - passwordless login
//! - `/consent/*` - PDPL consent records
//! - `/localization/*` - translated content (read and admin CRUD)
//! - `/financial-clinic/*` - company-branded assessment
//! - `/admin/*` - admin login and analytics

mod backend;
mod dto;
mod error;

pub use backend::{BackendClient, BackendConfig};
pub use dto::{
    AdminLoginResponse, AdminOverview, AdminSubmissionRow, EmailReportRequest,
    EmailReportResponse, GuestMigrationRequest, GuestMigrationResponse, MessageResponse,
    OtpRequestResponse,
};
pub use error::ClientError;
