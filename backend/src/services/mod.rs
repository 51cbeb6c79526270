//! Business logic services for the Quantity Surveying Platform

pub mod bim;
pub mod boq;
pub mod cost_plan;
pub mod final_account;
pub mod item;
pub mod notification;
pub mod payment_certificate;
pub mod project;
pub mod rate_suggestion;
pub mod reporting;
pub mod settings;
pub mod tender;
pub mod valuation;
pub mod variation_order;

pub use bim::BimService;
pub use boq::BoqService;
pub use cost_plan::CostPlanService;
pub use final_account::FinalAccountService;
pub use item::ItemService;
pub use notification::NotificationService;
pub use payment_certificate::PaymentCertificateService;
pub use project::ProjectService;
pub use rate_suggestion::RateSuggestionService;
pub use reporting::ReportingService;
pub use settings::SettingsService;
pub use tender::TenderService;
pub use valuation::ValuationService;
pub use variation_order::VariationOrderService;

/// Swallow a failure in a secondary effect.
///
/// The primary document operation must not be blocked by notification,
/// ledger or progress-update failures; those are logged and dropped.
/// Missing mandatory data still fails loudly in the validators.
pub fn soft<T, E: std::fmt::Display>(context: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!("{} failed: {}", context, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::soft;
    use crate::error::AppError;

    #[test]
    fn soft_passes_successes_through() {
        let result: Result<i32, AppError> = Ok(7);
        assert_eq!(soft("test effect", result), Some(7));
    }

    #[test]
    fn soft_swallows_failures() {
        // A failed notification or ledger write never propagates to the
        // caller; the submit itself must still succeed
        let result: Result<i32, AppError> =
            Err(AppError::Internal("notification queue down".to_string()));
        assert_eq!(soft("test effect", result), None);
    }
}
