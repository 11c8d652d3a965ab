use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    summary::{get_category_summary, get_monthly_summary},
    timezone::local_today,
    validation::parse_optional_date,
};

/// The state needed to compute summaries.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for the monthly summary, both default to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthlySummaryQuery {
    /// The four digit year.
    pub year: Option<String>,
    /// The month from 1 to 12.
    pub month: Option<String>,
}

/// The query parameters for the category summary.
#[derive(Debug, Default, Deserialize)]
pub struct CategorySummaryQuery {
    /// The earliest date to include, YYYY-MM-DD.
    pub start_date: Option<String>,
    /// The latest date to include, YYYY-MM-DD.
    pub end_date: Option<String>,
}

/// A route handler that returns the income, expense and balance for a month.
pub async fn get_monthly_summary_endpoint(
    State(state): State<SummaryState>,
    Query(query): Query<MonthlySummaryQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let year = match query.year.as_deref().map(str::trim) {
        None | Some("") => today.year(),
        Some(year) => year
            .parse()
            .map_err(|_| Error::InvalidYear(year.to_owned()))?,
    };
    let month = match query.month.as_deref().map(str::trim) {
        None | Some("") => u8::from(today.month()),
        Some(month) => month
            .parse()
            .map_err(|_| Error::InvalidMonth(month.to_owned()))?,
    };

    let connection = lock_connection(&state.db_connection)?;
    let summary = get_monthly_summary(year, month, &connection)?;

    Ok(Json(json!({
        "status": "success",
        "year": year,
        "month": month,
        "summary": summary,
    }))
    .into_response())
}

/// A route handler that returns the transaction totals per category.
pub async fn get_category_summary_endpoint(
    State(state): State<SummaryState>,
    Query(query): Query<CategorySummaryQuery>,
) -> Result<Response, Error> {
    let start_date = parse_optional_date(query.start_date.as_deref())?;
    let end_date = parse_optional_date(query.end_date.as_deref())?;

    let connection = lock_connection(&state.db_connection)?;
    let summary = get_category_summary(start_date, end_date, &connection)?;

    Ok(Json(json!({
        "status": "success",
        "summary": summary,
    }))
    .into_response())
}
