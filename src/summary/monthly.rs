//! Income and expense totals for a calendar month.

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, Month};

use crate::{Error, Kind};

/// The earliest year accepted for monthly summaries.
pub const MIN_YEAR: i32 = 1900;
/// The latest year accepted for monthly summaries.
pub const MAX_YEAR: i32 = 2100;

/// Income and expense totals for a month.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// The sum of income transactions.
    pub income: f64,
    /// The sum of expense transactions.
    pub expense: f64,
    /// Income minus expense.
    pub balance: f64,
}

/// Get the first day of the month and the first day of the following month.
///
/// # Errors
/// Returns [Error::InvalidYear] or [Error::InvalidMonth] if `year` is outside
/// of [MIN_YEAR] to [MAX_YEAR] or `month` is outside of 1 to 12.
pub fn month_bounds(year: i32, month: u8) -> Result<(Date, Date), Error> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(Error::InvalidYear(year.to_string()));
    }

    let month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month.to_string()))?;

    let start = Date::from_calendar_date(year, month, 1)
        .map_err(|_| Error::InvalidYear(year.to_string()))?;
    let end = match month {
        Month::December => Date::from_calendar_date(year + 1, Month::January, 1),
        month => Date::from_calendar_date(year, month.next(), 1),
    }
    .map_err(|_| Error::InvalidYear(year.to_string()))?;

    Ok((start, end))
}

/// Sum the income and expense transactions dated within `month` of `year`.
///
/// A month without transactions has zero income, expense and balance.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidYear] or [Error::InvalidMonth] for an out of range year or month,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_monthly_summary(
    year: i32,
    month: u8,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    let (start, end) = month_bounds(year, month)?;

    let mut statement = connection.prepare(
        "SELECT type, COALESCE(SUM(amount), 0) FROM transactions
        WHERE date >= ?1 AND date < ?2
        GROUP BY type",
    )?;
    let totals = statement.query_map((start, end), |row| {
        Ok((row.get::<_, Kind>(0)?, row.get::<_, f64>(1)?))
    })?;

    let mut summary = MonthlySummary::default();

    for total in totals {
        match total? {
            (Kind::Income, amount) => summary.income = amount,
            (Kind::Expense, amount) => summary.expense = amount,
        }
    }

    summary.balance = summary.income - summary.expense;

    Ok(summary)
}

#[cfg(test)]
mod monthly_summary_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, Kind,
        db::initialize,
        transaction::{Transaction, create_transaction},
    };

    use super::{MonthlySummary, get_monthly_summary, month_bounds};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[track_caller]
    fn insert(connection: &Connection, kind: Kind, amount: f64, date: time::Date) {
        create_transaction(Transaction::build(kind, amount, date), connection)
            .expect("Could not create transaction");
    }

    #[test]
    fn sums_income_and_expense() {
        let connection = get_test_connection();
        insert(&connection, Kind::Income, 500000.0, date!(2024 - 03 - 15));
        insert(&connection, Kind::Expense, 120000.5, date!(2024 - 03 - 01));
        insert(&connection, Kind::Expense, 30000.0, date!(2024 - 03 - 31));

        let summary = get_monthly_summary(2024, 3, &connection);

        assert_eq!(
            summary,
            Ok(MonthlySummary {
                income: 500000.0,
                expense: 150000.5,
                balance: 349999.5,
            })
        );
    }

    #[test]
    fn excludes_neighbouring_months() {
        let connection = get_test_connection();
        insert(&connection, Kind::Income, 1.0, date!(2024 - 02 - 29));
        insert(&connection, Kind::Income, 2.0, date!(2024 - 03 - 01));
        insert(&connection, Kind::Income, 4.0, date!(2024 - 04 - 01));

        let february = get_monthly_summary(2024, 2, &connection).unwrap();
        let march = get_monthly_summary(2024, 3, &connection).unwrap();

        assert_eq!(february.income, 1.0);
        assert_eq!(march.income, 2.0);
    }

    #[test]
    fn december_includes_new_years_eve_only() {
        let connection = get_test_connection();
        insert(&connection, Kind::Expense, 10.0, date!(2023 - 12 - 31));
        insert(&connection, Kind::Expense, 20.0, date!(2024 - 01 - 01));

        let december = get_monthly_summary(2023, 12, &connection).unwrap();

        assert_eq!(december.expense, 10.0);
        assert_eq!(december.balance, -10.0);
    }

    #[test]
    fn empty_month_is_all_zero() {
        let connection = get_test_connection();

        let summary = get_monthly_summary(2024, 7, &connection);

        assert_eq!(summary, Ok(MonthlySummary::default()));
    }

    #[test]
    fn rejects_out_of_range_month_and_year() {
        let connection = get_test_connection();

        assert_eq!(
            get_monthly_summary(2024, 13, &connection),
            Err(Error::InvalidMonth("13".to_owned()))
        );
        assert_eq!(
            get_monthly_summary(2024, 0, &connection),
            Err(Error::InvalidMonth("0".to_owned()))
        );
        assert_eq!(
            get_monthly_summary(1899, 1, &connection),
            Err(Error::InvalidYear("1899".to_owned()))
        );
    }

    #[test]
    fn month_bounds_roll_over_the_year() {
        assert_eq!(
            month_bounds(2100, 12),
            Ok((date!(2100 - 12 - 01), date!(2101 - 01 - 01)))
        );
    }
}
