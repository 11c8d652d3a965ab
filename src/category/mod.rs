//! Category taxonomy for grouping income and expense transactions.

mod create;
mod db;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub(crate) use db::find_category;
pub use db::{
    create_category, create_category_table, get_category, list_categories,
    seed_default_categories,
};
pub use domain::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES};
pub use list::list_categories_endpoint;
