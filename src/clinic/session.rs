//! Local persistence of clinic results

use super::types::{FinancialClinicProfile, FinancialClinicResult};
use crate::storage::{keys, LocalStorage, StorageResult};

/// Clinic result and profile as cached for the results page
pub struct FinancialClinicSession {
    storage: LocalStorage,
}

impl FinancialClinicSession {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn save(
        &self,
        result: &FinancialClinicResult,
        profile: &FinancialClinicProfile,
    ) -> StorageResult<()> {
        self.storage.set_json(keys::FINANCIAL_CLINIC_RESULT, result)?;
        self.storage.set_json(keys::FINANCIAL_CLINIC_PROFILE, profile)?;
        Ok(())
    }

    /// Stored result, `None` when missing or unreadable
    pub fn result(&self) -> Option<FinancialClinicResult> {
        self.storage.get_json(keys::FINANCIAL_CLINIC_RESULT)
    }

    pub fn profile(&self) -> Option<FinancialClinicProfile> {
        self.storage.get_json(keys::FINANCIAL_CLINIC_PROFILE)
    }

    /// Result and profile together; the results page needs both
    pub fn load(&self) -> Option<(FinancialClinicResult, FinancialClinicProfile)> {
        let loaded = self.result().zip(self.profile());
        if loaded.is_none() && self.storage.contains(keys::FINANCIAL_CLINIC_RESULT) {
            tracing::warn!("Stored clinic data unusable, assessment must be restarted");
        }
        loaded
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.storage.remove_all(&[
            keys::FINANCIAL_CLINIC_RESULT,
            keys::FINANCIAL_CLINIC_PROFILE,
        ])
    }
}
