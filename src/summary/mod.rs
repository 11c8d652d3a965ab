//! Aggregate queries over the stored transactions.

mod category;
mod endpoints;
mod monthly;

pub use category::{CategorySummary, get_category_summary};
pub use endpoints::{get_category_summary_endpoint, get_monthly_summary_endpoint};
pub use monthly::{MonthlySummary, get_monthly_summary};
