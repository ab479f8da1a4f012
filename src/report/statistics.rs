//! Sales totals for a month.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::{Connection, named_params};
use serde::Serialize;

use crate::{Error, db::lock_connection, month::MonthToken};

use super::{MonthQuery, ReportState};

/// The sales totals for one month.
///
/// The counts partition the month's products, so `total_sold_count +
/// total_unsold_count` is the number of products sold in the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStatistics {
    /// The sum of the prices of the sold products. Non-numeric prices count as zero.
    pub total_sale_amount: f64,
    /// The number of sold products.
    pub total_sold_count: u64,
    /// The number of unsold products.
    pub total_unsold_count: u64,
}

/// Get the sales totals for the selected month.
pub async fn get_statistics(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<SalesStatistics>, Error> {
    let month = query.month()?;
    let connection = lock_connection(&state.db_connection)?;

    let statistics = get_sales_statistics(month, &connection)
        .inspect_err(|error| tracing::error!("could not get sales statistics: {error}"))?;

    Ok(Json(statistics))
}

/// Calculate the sales totals for `month`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn get_sales_statistics(
    month: MonthToken,
    connection: &Connection,
) -> Result<SalesStatistics, Error> {
    connection
        .prepare_cached(
            "SELECT
                COALESCE(SUM(CASE WHEN sold = 1 THEN price_value(price) END), 0.0),
                COUNT(CASE WHEN sold = 1 THEN 1 END),
                COUNT(CASE WHEN sold = 0 THEN 1 END)
            FROM product
            WHERE sale_month(date_of_sale) = :month",
        )?
        .query_row(named_params! { ":month": month.as_str() }, |row| {
            Ok(SalesStatistics {
                total_sale_amount: row.get(0)?,
                total_sold_count: row.get(1)?,
                total_unsold_count: row.get(2)?,
            })
        })
        .map_err(Error::from)
}
