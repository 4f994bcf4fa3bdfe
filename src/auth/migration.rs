//! Moving guest results into a freshly authenticated account

use async_trait::async_trait;

use super::error::AuthError;
use crate::client::{BackendClient, ClientError, GuestMigrationRequest, GuestMigrationResponse};
use crate::storage::{keys, LocalStorage};

/// Backend operation the migration needs
#[async_trait]
pub trait GuestMigrationApi: Send + Sync {
    async fn migrate_guest_data(
        &self,
        request: &GuestMigrationRequest,
    ) -> Result<GuestMigrationResponse, ClientError>;
}

#[async_trait]
impl GuestMigrationApi for BackendClient {
    async fn migrate_guest_data(
        &self,
        request: &GuestMigrationRequest,
    ) -> Result<GuestMigrationResponse, ClientError> {
        BackendClient::migrate_guest_data(self, request).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No guest results were stored
    NothingToMigrate,
    Migrated { results: u32 },
}

/// Send locally stored guest results to the backend, then forget them
///
/// Guest keys are only cleared once the backend accepted the data; any
/// failure leaves local storage as it was so the user can retry.
pub async fn migrate_guest_data(
    api: &dyn GuestMigrationApi,
    storage: &LocalStorage,
) -> Result<MigrationOutcome, AuthError> {
    let request = GuestMigrationRequest {
        score: storage.get_json(keys::CURRENT_SCORE),
        financial_clinic_result: storage.get_json(keys::FINANCIAL_CLINIC_RESULT),
        financial_clinic_profile: storage.get_json(keys::FINANCIAL_CLINIC_PROFILE),
    };

    if request.is_empty() {
        tracing::debug!("No guest data to migrate");
        return Ok(MigrationOutcome::NothingToMigrate);
    }

    let response = match api.migrate_guest_data(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Guest migration failed, keeping local data");
            return Err(e.into());
        }
    };

    storage.remove_all(keys::GUEST_DATA_KEYS)?;

    tracing::info!(
        migrated = response.migrated_results,
        "Guest data migrated to account"
    );

    Ok(MigrationOutcome::Migrated {
        results: response.migrated_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{PillarScore, ScoreCalculation};
    use chrono::Utc;
    use std::sync::Mutex;

    struct FakeMigrationApi {
        fail: bool,
        received: Mutex<Vec<GuestMigrationRequest>>,
    }

    impl FakeMigrationApi {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GuestMigrationApi for FakeMigrationApi {
        async fn migrate_guest_data(
            &self,
            request: &GuestMigrationRequest,
        ) -> Result<GuestMigrationResponse, ClientError> {
            self.received.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ClientError::Unavailable);
            }
            Ok(GuestMigrationResponse {
                migrated_results: 1,
                message: "ok".to_string(),
            })
        }
    }

    fn guest_score() -> ScoreCalculation {
        ScoreCalculation {
            id: 11,
            user_id: None,
            total_score: 60.0,
            max_possible_score: 100.0,
            pillar_scores: vec![PillarScore::new("budgeting", 3.0)],
            advice: vec![],
            created_at: Utc::now(),
            profile: None,
        }
    }

    #[tokio::test]
    async fn test_migrates_and_clears_guest_keys() {
        let storage = LocalStorage::in_memory();
        storage.set_json(keys::CURRENT_SCORE, &guest_score()).unwrap();
        storage.set_string(keys::SURVEY_PROGRESS, "{}").unwrap();
        storage.set_string(keys::CLINIC_PROGRESS, "{}").unwrap();
        storage.set_string(keys::PREFERRED_LANGUAGE, "ar").unwrap();

        let api = FakeMigrationApi::new(false);
        let outcome = migrate_guest_data(&api, &storage).await.unwrap();

        assert_eq!(outcome, MigrationOutcome::Migrated { results: 1 });
        assert!(!storage.contains(keys::CURRENT_SCORE));
        assert!(!storage.contains(keys::SURVEY_PROGRESS));
        assert!(!storage.contains(keys::CLINIC_PROGRESS));
        assert!(storage.contains(keys::PREFERRED_LANGUAGE));

        let received = api.received.lock().unwrap();
        assert_eq!(received[0].score.as_ref().map(|s| s.id), Some(11));
    }

    #[tokio::test]
    async fn test_failure_keeps_local_data() {
        let storage = LocalStorage::in_memory();
        storage.set_json(keys::CURRENT_SCORE, &guest_score()).unwrap();

        let api = FakeMigrationApi::new(true);
        let err = migrate_guest_data(&api, &storage).await.unwrap_err();

        assert!(matches!(err, AuthError::Client(ClientError::Unavailable)));
        assert!(storage.contains(keys::CURRENT_SCORE));
    }

    #[tokio::test]
    async fn test_nothing_to_migrate_skips_backend() {
        let storage = LocalStorage::in_memory();
        let api = FakeMigrationApi::new(false);

        let outcome = migrate_guest_data(&api, &storage).await.unwrap();
        assert_eq!(outcome, MigrationOutcome::NothingToMigrate);
        assert!(api.received.lock().unwrap().is_empty());
    }
}
