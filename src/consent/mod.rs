//! PDPL consent tracking
//!
//! Consent is kept locally under `userConsent`, keyed to a random session id
//! under `consentSessionId`, and mirrored to the backend on a best-effort
//! basis. Records older than two years count as no consent.

mod error;
mod manager;

pub use error::ConsentError;
pub use manager::{
    ConsentApi, ConsentData, ConsentManager, ConsentOutcome, ConsentRecordRequest,
    CONSENT_MAX_AGE_DAYS, CONSENT_VERSION,
};
