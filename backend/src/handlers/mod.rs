//! HTTP handlers for the Quantity Surveying Platform

mod bim;
mod boq;
mod cost_plan;
mod final_account;
mod health;
mod item;
mod notification;
mod payment_certificate;
mod project;
mod rate_suggestion;
mod reporting;
mod settings;
mod tender;
mod valuation;
mod variation_order;

pub use bim::*;
pub use boq::*;
pub use cost_plan::*;
pub use final_account::*;
pub use health::*;
pub use item::*;
pub use notification::*;
pub use payment_certificate::*;
pub use project::*;
pub use rate_suggestion::*;
pub use reporting::*;
pub use settings::*;
pub use tender::*;
pub use valuation::*;
pub use variation_order::*;
