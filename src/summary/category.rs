//! Transaction totals grouped by category.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{Error, Kind};

/// Transaction totals keyed by category name, split by kind.
///
/// Every category is listed, those without matching transactions have a
/// total of zero.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    /// Totals for the income categories.
    pub income: BTreeMap<String, f64>,
    /// Totals for the expense categories.
    pub expense: BTreeMap<String, f64>,
}

impl CategorySummary {
    fn totals_mut(&mut self, kind: Kind) -> &mut BTreeMap<String, f64> {
        match kind {
            Kind::Income => &mut self.income,
            Kind::Expense => &mut self.expense,
        }
    }
}

/// Sum transactions per category, optionally restricted to dates between
/// `start_date` and `end_date` inclusive.
///
/// Categories that share a name and kind are combined into one entry.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_category_summary(
    start_date: Option<Date>,
    end_date: Option<Date>,
    connection: &Connection,
) -> Result<CategorySummary, Error> {
    // The date range is part of the join so that categories without
    // transactions in the range are still listed.
    let mut statement = connection.prepare(
        "SELECT c.name, c.type, COALESCE(SUM(t.amount), 0)
        FROM categories c
        LEFT JOIN transactions t
            ON t.category_id = c.id
            AND (?1 IS NULL OR t.date >= ?1)
            AND (?2 IS NULL OR t.date <= ?2)
        GROUP BY c.id",
    )?;

    let rows = statement.query_map((start_date, end_date), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Kind>(1)?,
            row.get::<_, f64>(2)?,
        ))
    })?;

    let mut summary = CategorySummary::default();

    for row in rows {
        let (name, kind, total) = row?;
        *summary.totals_mut(kind).entry(name).or_insert(0.0) += total;
    }

    Ok(summary)
}
