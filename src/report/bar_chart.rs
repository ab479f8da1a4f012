//! The number of products sold in a month per price range.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::{Connection, named_params};
use serde::Serialize;

use crate::{Error, db::lock_connection, month::MonthToken};

use super::{MonthQuery, ReportState};

/// An inclusive price range on the bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBucket {
    /// The lowest price in the range.
    pub min: u32,
    /// The highest price in the range.
    pub max: u32,
}

/// The price ranges of the bar chart, in display order.
pub const PRICE_BUCKETS: [PriceBucket; 10] = [
    PriceBucket { min: 0, max: 100 },
    PriceBucket { min: 101, max: 200 },
    PriceBucket { min: 201, max: 300 },
    PriceBucket { min: 301, max: 400 },
    PriceBucket { min: 401, max: 500 },
    PriceBucket { min: 501, max: 600 },
    PriceBucket { min: 601, max: 700 },
    PriceBucket { min: 701, max: 800 },
    PriceBucket { min: 801, max: 900 },
    PriceBucket {
        min: 901,
        max: 10_000,
    },
];

impl PriceBucket {
    /// The label shown on the chart, e.g. "101-200".
    pub fn label(&self) -> String {
        format!("{}-{}", self.min, self.max)
    }
}

/// One bar of the bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChartEntry {
    /// The price range label, e.g. "0-100".
    pub price_range: String,
    /// The number of products in the price range.
    pub total_items: u64,
}

/// The body of the bar chart response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChartResponse {
    /// One entry per price range in [PRICE_BUCKETS] order.
    pub bar_chart_data: Vec<BarChartEntry>,
}

/// Get the number of products per price range for the selected month.
pub async fn get_bar_chart(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<BarChartResponse>, Error> {
    let month = query.month()?;
    let connection = lock_connection(&state.db_connection)?;

    let bar_chart_data = get_bar_chart_data(month, &connection)
        .inspect_err(|error| tracing::error!("could not get bar chart data: {error}"))?;

    Ok(Json(BarChartResponse { bar_chart_data }))
}

/// Count the products from `month` in each price range.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn get_bar_chart_data(
    month: MonthToken,
    connection: &Connection,
) -> Result<Vec<BarChartEntry>, Error> {
    let prices = connection
        .prepare_cached(
            "SELECT price_value(price) FROM product
            WHERE sale_month(date_of_sale) = :month AND price_value(price) IS NOT NULL",
        )?
        .query_map(named_params! { ":month": month.as_str() }, |row| {
            row.get::<_, f64>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let counts = count_by_bucket(&prices);

    Ok(PRICE_BUCKETS
        .iter()
        .zip(counts)
        .map(|(bucket, total_items)| BarChartEntry {
            price_range: bucket.label(),
            total_items,
        })
        .collect())
}

/// Find the index of the bucket in [PRICE_BUCKETS] that `price` belongs to.
///
/// The first bucket holds prices from 0 to 100, every later bucket holds the
/// prices above the previous bucket's maximum up to its own maximum. Prices
/// below zero or above the last maximum are in no bucket.
fn bucket_index(price: f64) -> Option<usize> {
    if price < 0.0 {
        return None;
    }

    PRICE_BUCKETS
        .iter()
        .position(|bucket| price <= f64::from(bucket.max))
}

fn count_by_bucket(prices: &[f64]) -> [u64; PRICE_BUCKETS.len()] {
    let mut counts = [0; PRICE_BUCKETS.len()];

    for index in prices.iter().copied().filter_map(bucket_index) {
        counts[index] += 1;
    }

    counts
}
