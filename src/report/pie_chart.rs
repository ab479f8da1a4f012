//! The number of products sold in a month per category.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::{Connection, named_params};
use serde::Serialize;

use crate::{Error, db::lock_connection, month::MonthToken};

use super::{MonthQuery, ReportState};

/// One slice of the pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChartEntry {
    /// The product category.
    pub category: String,
    /// The number of products in the category.
    pub items: u64,
}

/// The body of the pie chart response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieChartResponse {
    /// The categories with at least one product, sorted by name.
    pub pie_chart_data: Vec<PieChartEntry>,
}

/// Get the number of products per category for the selected month.
pub async fn get_pie_chart(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<PieChartResponse>, Error> {
    let month = query.month()?;
    let connection = lock_connection(&state.db_connection)?;

    let pie_chart_data = get_category_counts(month, &connection)
        .inspect_err(|error| tracing::error!("could not get pie chart data: {error}"))?;

    Ok(Json(PieChartResponse { pie_chart_data }))
}

/// Count the products from `month` in each category.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn get_category_counts(
    month: MonthToken,
    connection: &Connection,
) -> Result<Vec<PieChartEntry>, Error> {
    connection
        .prepare_cached(
            "SELECT category, COUNT(*) FROM product
            WHERE sale_month(date_of_sale) = :month
            GROUP BY category
            ORDER BY category",
        )?
        .query_map(named_params! { ":month": month.as_str() }, |row| {
            Ok(PieChartEntry {
                category: row.get(0)?,
                items: row.get(1)?,
            })
        })?
        .map(|entry| entry.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        month::MonthToken,
        product::insert_products,
        test_utils::{
            get_test_connection, get_test_server, insert_test_products, product, sample_products,
        },
    };

    use super::{PieChartEntry, get_category_counts};

    fn entry(category: &str, items: u64) -> PieChartEntry {
        PieChartEntry {
            category: category.to_owned(),
            items,
        }
    }

    #[test]
    fn counts_categories_in_alphabetical_order() {
        let connection = get_test_connection();
        let products = vec![
            product(1, "10", true, "2022-03-01", "toys"),
            product(2, "10", false, "2022-03-02", "books"),
            product(3, "10", true, "2022-03-03", "toys"),
            product(4, "10", true, "2022-04-03", "garden"),
            product(4, "10", true, "2022-03-09", "toys"),
        ];
        insert_products(&products, &connection).unwrap();

        let got = get_category_counts(MonthToken::parse("March").unwrap(), &connection);

        assert_eq!(got, Ok(vec![entry("books", 1), entry("toys", 3)]));
    }

    #[test]
    fn counts_add_up_to_month_total() {
        let connection = get_test_connection();
        let categories = ["a", "b", "c", "d"];
        let products: Vec<_> = (1..=30)
            .map(|id| {
                let category = categories[id as usize % categories.len()];
                let date = if id % 5 == 0 { "2022-08-01" } else { "2022-09-01" };
                product(id, "10", true, date, category)
            })
            .collect();
        insert_products(&products, &connection).unwrap();

        let got = get_category_counts(MonthToken::parse("Sep").unwrap(), &connection).unwrap();

        let total: u64 = got.iter().map(|entry| entry.items).sum();
        assert_eq!(total, 24);
    }

    #[test]
    fn empty_month_has_no_categories() {
        let connection = get_test_connection();
        insert_products(&sample_products(), &connection).unwrap();

        let got = get_category_counts(MonthToken::parse("12").unwrap(), &connection);

        assert_eq!(got, Ok(vec![]));
    }

    #[tokio::test]
    async fn endpoint_returns_category_counts() {
        let (server, connection) = get_test_server();
        insert_test_products(&sample_products(), &connection);

        let response = server
            .get(endpoints::PIE_CHART)
            .add_query_param("selectedMonth", "2022-03-01")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({
                "pieChartData": [
                    { "category": "electronics", "items": 1 },
                    { "category": "jewelery", "items": 1 }
                ]
            })
        );
    }
}
