//! Month-filtered reports over the product table.
//!
//! This module contains:
//! - The query parameters and state shared by the report handlers
//! - One submodule per report, each with its query and JSON response

mod bar_chart;
mod pie_chart;
mod statistics;
mod transactions;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, month::MonthToken};

pub use bar_chart::{PRICE_BUCKETS, PriceBucket, get_bar_chart};
pub use pie_chart::get_pie_chart;
pub use statistics::{SalesStatistics, get_statistics};
pub use transactions::{TransactionsState, get_transactions};

/// The state needed for the month-filtered report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading products.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters shared by every report.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The month to report on, as a date, month number or month name.
    #[serde(rename = "selectedMonth")]
    pub selected_month: Option<String>,
}

impl MonthQuery {
    /// Read the selected month.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateInput] if the month is missing or cannot be read.
    pub fn month(&self) -> Result<MonthToken, Error> {
        parse_selected_month(self.selected_month.as_deref())
    }
}

/// A missing month is reported the same way as an empty one.
fn parse_selected_month(selected_month: Option<&str>) -> Result<MonthToken, Error> {
    MonthToken::parse(selected_month.unwrap_or_default())
}
