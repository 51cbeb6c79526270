//! Domain models for the Quantity Surveying Platform

mod bim;
mod boq;
mod cost_plan;
mod final_account;
mod item;
mod notification;
mod payment_certificate;
mod project;
mod rate;
mod reporting;
mod settings;
mod tender;
mod valuation;
mod variation_order;

pub use bim::*;
pub use boq::*;
pub use cost_plan::*;
pub use final_account::*;
pub use item::*;
pub use notification::*;
pub use payment_certificate::*;
pub use project::*;
pub use rate::*;
pub use reporting::*;
pub use settings::*;
pub use tender::*;
pub use valuation::*;
pub use variation_order::*;
