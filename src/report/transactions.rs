//! The paginated, searchable listing of a month's products.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::{Connection, named_params};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    db::lock_connection,
    month::MonthToken,
    pagination::{Pagination, PaginationConfig},
    product::{PRODUCT_COLUMNS, Product, map_product_row},
};

use super::parse_selected_month;

/// Matches a month's products whose title, description or price contains the
/// search pattern.
const SEARCH_FILTER: &str = "sale_month(date_of_sale) = :month \
    AND (title LIKE :pattern ESCAPE '\\' \
    OR description LIKE :pattern ESCAPE '\\' \
    OR price LIKE :pattern ESCAPE '\\')";

/// The state needed for listing products.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading products.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls the default page size.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    /// The month to list products for.
    pub selected_month: Option<String>,
    /// Text to search for in the title, description and price.
    pub search_text: Option<String>,
    /// The maximum number of products to return.
    pub limit: Option<String>,
    /// The number of matching products to skip.
    pub offset: Option<String>,
}

/// One page of the products matching a search.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    /// The products on the requested page, in insertion order.
    pub transactions_data: Vec<Product>,
    /// The number of matching products across all pages.
    pub total_items: u64,
}

/// List the products sold in the selected month, filtered by the search text.
pub async fn get_transactions(
    State(state): State<TransactionsState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, Error> {
    let month = parse_selected_month(query.selected_month.as_deref())?;
    let pagination = Pagination::parse(
        query.limit.as_deref(),
        query.offset.as_deref(),
        &state.pagination_config,
    )?;
    let search_text = query.search_text.as_deref().unwrap_or_default();

    let connection = lock_connection(&state.db_connection)?;

    let response = search_products(month, search_text, pagination, &connection)
        .inspect_err(|error| tracing::error!("could not search products: {error}"))?;

    Ok(Json(response))
}

/// Get a page of the products from `month` that contain `search_text`, and
/// the total number of matches.
///
/// The search is a case-insensitive substring match (ASCII letters only) on
/// the title, description and price text. An empty search matches every
/// product in the month.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn search_products(
    month: MonthToken,
    search_text: &str,
    pagination: Pagination,
    connection: &Connection,
) -> Result<TransactionsResponse, Error> {
    let pattern = format!("%{}%", escape_like(search_text));

    let transactions_data = connection
        .prepare_cached(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE {SEARCH_FILTER} \
            ORDER BY rowid LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            named_params! {
                ":month": month.as_str(),
                ":pattern": pattern,
                ":limit": pagination.limit,
                ":offset": pagination.offset,
            },
            map_product_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let total_items = connection
        .prepare_cached(&format!(
            "SELECT COUNT(*) FROM product WHERE {SEARCH_FILTER}"
        ))?
        .query_row(
            named_params! {
                ":month": month.as_str(),
                ":pattern": pattern,
            },
            |row| row.get(0),
        )?;

    Ok(TransactionsResponse {
        transactions_data,
        total_items,
    })
}

/// Escape the `LIKE` wildcards in `text` so it is matched literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for character in text.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}
