//! Well-known storage keys
//!
//! Key names match the ones the web client writes, so data moved between
//! the two stays readable.

/// Latest survey result for the current (possibly guest) user
pub const CURRENT_SCORE: &str = "currentScore";

/// Latest Financial Clinic result
pub const FINANCIAL_CLINIC_RESULT: &str = "financialClinicResult";

/// Profile submitted with the latest Financial Clinic assessment
pub const FINANCIAL_CLINIC_PROFILE: &str = "financialClinicProfile";

/// Customer profile collected before the survey
pub const CUSTOMER_PROFILE: &str = "customerProfile";

/// In-progress survey answers
pub const SURVEY_PROGRESS: &str = "surveyProgress";

/// In-progress Financial Clinic answers
pub const CLINIC_PROGRESS: &str = "financialClinicProgress";

/// UI language ("en" or "ar")
pub const PREFERRED_LANGUAGE: &str = "preferred_language";

/// OTP login session
pub const SIMPLE_AUTH_SESSION: &str = "simpleAuthSession";

/// Admin dashboard bearer token
pub const ADMIN_ACCESS_TOKEN: &str = "admin_access_token";

/// Anonymous session used to correlate consent records
pub const CONSENT_SESSION_ID: &str = "consentSessionId";

/// PDPL consent record
pub const USER_CONSENT: &str = "userConsent";

/// Keys holding guest survey data that migration moves to an account
pub const GUEST_DATA_KEYS: &[&str] = &[
    CURRENT_SCORE,
    FINANCIAL_CLINIC_RESULT,
    FINANCIAL_CLINIC_PROFILE,
    SURVEY_PROGRESS,
    CLINIC_PROGRESS,
];
