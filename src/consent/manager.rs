//! Consent records and their local/remote lifecycle

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::ConsentError;
use crate::client::{BackendClient, ClientError, MessageResponse};
use crate::localization::Language;
use crate::storage::{keys, LocalStorage, StorageResult};

/// Age after which a stored consent has to be given again
pub const CONSENT_MAX_AGE_DAYS: i64 = 730;

/// Version of the consent wording the user agreed to
pub const CONSENT_VERSION: &str = "1.0";

/// A consent decision as stored locally
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsentData {
    pub profiling: bool,
    #[serde(alias = "data_processing")]
    pub data_processing: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "session_id")]
    pub session_id: String,
}

impl ConsentData {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.timestamp > Duration::days(CONSENT_MAX_AGE_DAYS)
    }
}

/// Body of `POST /consent/record`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecordRequest {
    pub session_id: String,
    pub profiling_consent: bool,
    pub data_processing_consent: bool,
    pub consent_version: String,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
}

impl ConsentRecordRequest {
    fn from_consent(consent: &ConsentData, language: Language) -> Self {
        Self {
            session_id: consent.session_id.clone(),
            profiling_consent: consent.profiling,
            data_processing_consent: consent.data_processing,
            consent_version: CONSENT_VERSION.to_string(),
            language,
            timestamp: consent.timestamp,
        }
    }
}

/// Backend consent endpoints
#[async_trait]
pub trait ConsentApi: Send + Sync {
    async fn record_consent(
        &self,
        request: &ConsentRecordRequest,
    ) -> Result<MessageResponse, ClientError>;

    async fn consent_status(&self, session_id: &str) -> Result<Option<ConsentData>, ClientError>;

    async fn revoke_consent(&self, session_id: &str) -> Result<MessageResponse, ClientError>;
}

#[async_trait]
impl ConsentApi for BackendClient {
    async fn record_consent(
        &self,
        request: &ConsentRecordRequest,
    ) -> Result<MessageResponse, ClientError> {
        BackendClient::record_consent(self, request).await
    }

    async fn consent_status(&self, session_id: &str) -> Result<Option<ConsentData>, ClientError> {
        BackendClient::consent_status(self, session_id).await
    }

    async fn revoke_consent(&self, session_id: &str) -> Result<MessageResponse, ClientError> {
        BackendClient::revoke_consent(self, session_id).await
    }
}

/// Result of granting consent
#[derive(Debug, Clone)]
pub struct ConsentOutcome {
    pub consent: ConsentData,
    /// Whether the backend acknowledged the record
    pub synced: bool,
}

pub struct ConsentManager {
    storage: LocalStorage,
    api: Arc<dyn ConsentApi>,
}

impl ConsentManager {
    pub fn new(storage: LocalStorage, api: Arc<dyn ConsentApi>) -> Self {
        Self { storage, api }
    }

    /// Consent session id, created on first use
    pub fn session_id(&self) -> StorageResult<String> {
        if let Some(id) = self.storage.get_string(keys::CONSENT_SESSION_ID) {
            if !id.is_empty() {
                return Ok(id);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.storage.set_string(keys::CONSENT_SESSION_ID, &id)?;
        tracing::debug!(session_id = %id, "Created consent session");
        Ok(id)
    }

    /// Stored consent, `None` when missing, unreadable or expired
    pub fn current(&self) -> Option<ConsentData> {
        self.current_at(Utc::now())
    }

    pub fn current_at(&self, now: DateTime<Utc>) -> Option<ConsentData> {
        let consent: ConsentData = self.storage.get_json(keys::USER_CONSENT)?;
        if consent.is_expired(now) {
            tracing::info!(
                given_at = %consent.timestamp,
                "Stored consent expired, asking again"
            );
            return None;
        }
        Some(consent)
    }

    /// Data processing consent is required before a survey can be submitted
    pub fn has_required_consent(&self) -> bool {
        self.current().map(|c| c.data_processing).unwrap_or(false)
    }

    /// Store a consent decision locally and mirror it to the backend
    ///
    /// A backend failure is logged and the local record kept.
    pub async fn grant(
        &self,
        profiling: bool,
        data_processing: bool,
        language: Language,
    ) -> Result<ConsentOutcome, ConsentError> {
        let consent = ConsentData {
            profiling,
            data_processing,
            timestamp: Utc::now(),
            session_id: self.session_id()?,
        };
        self.storage.set_json(keys::USER_CONSENT, &consent)?;

        let request = ConsentRecordRequest::from_consent(&consent, language);
        let synced = match self.api.record_consent(&request).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    session_id = %consent.session_id,
                    "Could not record consent on backend, kept locally"
                );
                false
            }
        };

        tracing::info!(
            profiling,
            data_processing,
            synced,
            "Consent recorded"
        );

        Ok(ConsentOutcome { consent, synced })
    }

    /// Consent as the backend knows it for this session
    pub async fn remote_status(&self) -> Result<Option<ConsentData>, ConsentError> {
        let session_id = self.session_id()?;
        Ok(self.api.consent_status(&session_id).await?)
    }

    /// Withdraw consent; the local record is removed even if the backend call fails
    pub async fn revoke(&self) -> Result<bool, ConsentError> {
        self.storage.remove(keys::USER_CONSENT)?;

        let Some(session_id) = self.storage.get_string(keys::CONSENT_SESSION_ID) else {
            return Ok(true);
        };

        match self.api.revoke_consent(&session_id).await {
            Ok(_) => {
                tracing::info!(session_id = %session_id, "Consent revoked");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not revoke consent on backend");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeConsentApi {
        offline: bool,
        recorded: Mutex<Vec<ConsentRecordRequest>>,
        revoked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ConsentApi for FakeConsentApi {
        async fn record_consent(
            &self,
            request: &ConsentRecordRequest,
        ) -> Result<MessageResponse, ClientError> {
            if self.offline {
                return Err(ClientError::Unavailable);
            }
            self.recorded.lock().unwrap().push(request.clone());
            Ok(MessageResponse::default())
        }

        async fn consent_status(
            &self,
            session_id: &str,
        ) -> Result<Option<ConsentData>, ClientError> {
            let recorded = self.recorded.lock().unwrap();
            Ok(recorded
                .iter()
                .rev()
                .find(|r| r.session_id == session_id)
                .map(|r| ConsentData {
                    profiling: r.profiling_consent,
                    data_processing: r.data_processing_consent,
                    timestamp: r.timestamp,
                    session_id: r.session_id.clone(),
                }))
        }

        async fn revoke_consent(&self, session_id: &str) -> Result<MessageResponse, ClientError> {
            if self.offline {
                return Err(ClientError::Unavailable);
            }
            self.revoked.lock().unwrap().push(session_id.to_string());
            Ok(MessageResponse::default())
        }
    }

    fn manager(api: Arc<FakeConsentApi>) -> (ConsentManager, LocalStorage) {
        let storage = LocalStorage::in_memory();
        (ConsentManager::new(storage.clone(), api), storage)
    }

    #[test]
    fn test_session_id_is_stable() {
        let (manager, storage) = manager(Arc::new(FakeConsentApi::default()));
        let first = manager.session_id().unwrap();
        assert_eq!(manager.session_id().unwrap(), first);
        assert_eq!(
            storage.get_string(keys::CONSENT_SESSION_ID).as_deref(),
            Some(first.as_str())
        );
    }

    #[tokio::test]
    async fn test_grant_records_locally_and_remotely() {
        let api = Arc::new(FakeConsentApi::default());
        let (manager, _) = manager(api.clone());

        let outcome = manager.grant(false, true, Language::Ar).await.unwrap();
        assert!(outcome.synced);
        assert!(manager.has_required_consent());

        let recorded = api.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].data_processing_consent);
        assert!(!recorded[0].profiling_consent);
        assert_eq!(recorded[0].session_id, outcome.consent.session_id);
    }

    #[tokio::test]
    async fn test_remote_status_follows_session() {
        let api = Arc::new(FakeConsentApi::default());
        let (manager, _) = manager(api);

        assert!(manager.remote_status().await.unwrap().is_none());
        manager.grant(true, true, Language::En).await.unwrap();
        let remote = manager.remote_status().await.unwrap().unwrap();
        assert!(remote.profiling);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_local_consent() {
        let api = Arc::new(FakeConsentApi {
            offline: true,
            ..Default::default()
        });
        let (manager, _) = manager(api);

        let outcome = manager.grant(true, true, Language::En).await.unwrap();
        assert!(!outcome.synced);
        assert_eq!(manager.current(), Some(outcome.consent));
    }

    #[test]
    fn test_expired_consent_is_absent() {
        let (manager, storage) = manager(Arc::new(FakeConsentApi::default()));
        let now = Utc::now();
        let old = ConsentData {
            profiling: true,
            data_processing: true,
            timestamp: now - Duration::days(CONSENT_MAX_AGE_DAYS + 1),
            session_id: "s-1".to_string(),
        };
        storage.set_json(keys::USER_CONSENT, &old).unwrap();
        assert!(manager.current_at(now).is_none());

        let recent = ConsentData {
            timestamp: now - Duration::days(CONSENT_MAX_AGE_DAYS - 1),
            ..old
        };
        storage.set_json(keys::USER_CONSENT, &recent).unwrap();
        assert!(manager.current_at(now).is_some());
    }

    #[test]
    fn test_declined_processing_is_not_required_consent() {
        let (manager, storage) = manager(Arc::new(FakeConsentApi::default()));
        storage
            .set_json(
                keys::USER_CONSENT,
                &ConsentData {
                    profiling: true,
                    data_processing: false,
                    timestamp: Utc::now(),
                    session_id: "s".to_string(),
                },
            )
            .unwrap();
        assert!(!manager.has_required_consent());
    }

    #[test]
    fn test_stored_format_is_camel_case() {
        let json = serde_json::json!({
            "profiling": true,
            "dataProcessing": true,
            "timestamp": "2025-01-10T08:00:00Z",
            "sessionId": "abc"
        });
        let consent: ConsentData = serde_json::from_value(json).unwrap();
        assert_eq!(consent.session_id, "abc");
        assert!(consent.data_processing);
    }

    #[tokio::test]
    async fn test_revoke_removes_local_record() {
        let api = Arc::new(FakeConsentApi::default());
        let (manager, _) = manager(api.clone());
        manager.grant(true, true, Language::En).await.unwrap();

        assert!(manager.revoke().await.unwrap());
        assert!(manager.current().is_none());
        assert_eq!(api.revoked.lock().unwrap().len(), 1);
    }
}
