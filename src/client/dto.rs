//! Request/response bodies that only exist on the wire
//!
//! Domain types (results, questions, consent records) live in their own
//! modules and are sent as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clinic::{FinancialClinicProfile, FinancialClinicResult};
use crate::localization::Language;
use crate::scoring::ScoreCalculation;

/// Generic `{ "message": ... }` acknowledgement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
}

// ============================================
// Auth DTOs
// ============================================

#[derive(Debug, Serialize)]
pub(crate) struct OtpRequestBody<'a> {
    pub email: &'a str,
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub(crate) struct OtpVerifyBody<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

/// Reply to an OTP request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtpRequestResponse {
    #[serde(default)]
    pub message: String,
    /// Code lifetime chosen by the backend, if it reports one
    #[serde(default)]
    pub expires_in_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OtpVerifyResponse {
    pub user_id: i64,
    pub email: String,
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminLoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Admin login reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

// ============================================
// Survey DTOs
// ============================================

/// Guest data handed over to a newly authenticated account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestMigrationRequest {
    #[serde(default)]
    pub score: Option<ScoreCalculation>,
    #[serde(default)]
    pub financial_clinic_result: Option<FinancialClinicResult>,
    #[serde(default)]
    pub financial_clinic_profile: Option<FinancialClinicProfile>,
}

impl GuestMigrationRequest {
    pub fn is_empty(&self) -> bool {
        self.score.is_none() && self.financial_clinic_result.is_none()
    }
}

/// Reply to a guest migration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestMigrationResponse {
    #[serde(default)]
    pub migrated_results: u32,
    #[serde(default)]
    pub message: String,
}

/// Ask the backend to email a rendered report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailReportRequest {
    pub email: String,
    pub language: Language,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailReportResponse {
    #[serde(default)]
    pub sent: bool,
    #[serde(default)]
    pub message: String,
}

// ============================================
// Admin DTOs
// ============================================

/// Dashboard headline numbers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOverview {
    #[serde(default)]
    pub total_submissions: u64,
    #[serde(default)]
    pub guest_submissions: u64,
    #[serde(default)]
    pub registered_users: u64,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub submissions_last_30_days: u64,
}

/// One submission as listed in the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSubmissionRow {
    pub id: i64,
    #[serde(default)]
    pub user_email: Option<String>,
    pub total_score: f64,
    pub max_possible_score: f64,
    #[serde(default)]
    pub emirate: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub language: Option<Language>,
    pub created_at: DateTime<Utc>,
}
