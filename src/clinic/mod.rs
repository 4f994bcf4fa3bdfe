//! Financial Clinic
//!
//! The company-branded assessment variant. The backend scores it into
//! category scores and insights; results are cached locally the same way
//! regular survey results are.

mod session;
mod types;

pub use session::FinancialClinicSession;
pub use types::{
    category_as_pillar, CategoryScore, ClinicInsight, ClinicSubmission, FinancialClinicProfile,
    FinancialClinicResult, ProductRecommendation,
};
