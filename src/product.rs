//! The product table that stores the transactions loaded from the product feed.

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

/// A product sale, as served by the product feed and stored in the product table.
///
/// The `id` comes from the feed and is not guaranteed to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// The feed's identifier for the product.
    pub id: i64,
    /// The product name.
    pub title: String,
    /// The sale price, stored as text.
    ///
    /// The feed sends prices as JSON numbers, but strings are accepted too.
    #[serde(deserialize_with = "price_as_text")]
    pub price: String,
    /// A longer description of the product.
    pub description: String,
    /// The category the product is listed under, e.g. "electronics".
    pub category: String,
    /// The URL of the product image.
    pub image: String,
    /// Whether the product was sold.
    pub sold: bool,
    /// The date of sale, e.g. "2021-11-27T20:29:54+05:30".
    pub date_of_sale: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedPrice {
    Number(serde_json::Number),
    Text(String),
}

fn price_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let price = match FeedPrice::deserialize(deserializer)? {
        FeedPrice::Number(number) => number.to_string(),
        FeedPrice::Text(text) => text,
    };

    Ok(price)
}

/// The columns of the product table in the order [map_product_row] reads them.
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, title, price, description, category, image, sold, date_of_sale";

/// Create the product table.
///
/// The table has no primary key so that duplicate feed IDs can be stored.
/// SQLite's implicit `rowid` keeps the insertion order.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_product_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS product (
            id INTEGER NOT NULL,
            title TEXT NOT NULL,
            price TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            image TEXT NOT NULL,
            sold INTEGER NOT NULL,
            date_of_sale TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Map a row selected with [PRODUCT_COLUMNS] to a [Product].
pub(crate) fn map_product_row(row: &Row) -> Result<Product, rusqlite::Error> {
    Ok(Product {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        image: row.get(5)?,
        sold: row.get(6)?,
        date_of_sale: row.get(7)?,
    })
}

/// Add `products` to the product table, after any existing products.
///
/// The products are written in a single SQL transaction, so either all of
/// them are saved or none are.
///
/// # Errors
/// Returns [Error::IngestionAborted] with the number of products written
/// before the failure if an insert fails, or [Error::SqlError] if the SQL
/// transaction cannot be started or committed.
pub fn insert_products(products: &[Product], connection: &Connection) -> Result<usize, Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let inserted = insert_all(products, &transaction)?;

    transaction.commit()?;

    Ok(inserted)
}

/// Remove all products from the product table and add `products` in their place.
///
/// The delete and inserts happen in a single SQL transaction, so on failure the
/// previous products are kept.
///
/// # Errors
/// Returns the same errors as [insert_products].
pub fn replace_products(products: &[Product], connection: &Connection) -> Result<usize, Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let removed = transaction.execute("DELETE FROM product", ())?;
    tracing::debug!("removed {removed} products before ingestion");

    let inserted = insert_all(products, &transaction)?;

    transaction.commit()?;

    Ok(inserted)
}

fn insert_all(products: &[Product], transaction: &Transaction) -> Result<usize, Error> {
    let abort = |inserted: usize, error: rusqlite::Error| {
        tracing::error!("could not insert product #{inserted}: {error}");
        Error::IngestionAborted {
            inserted,
            total: products.len(),
            reason: error.to_string(),
        }
    };

    let mut statement = transaction
        .prepare_cached(
            "INSERT INTO product (id, title, price, description, category, image, sold, date_of_sale)
            VALUES (:id, :title, :price, :description, :category, :image, :sold, :date_of_sale)",
        )
        .map_err(|error| abort(0, error))?;

    for (inserted, product) in products.iter().enumerate() {
        statement
            .execute(rusqlite::named_params! {
                ":id": product.id,
                ":title": product.title,
                ":price": product.price,
                ":description": product.description,
                ":category": product.category,
                ":image": product.image,
                ":sold": product.sold,
                ":date_of_sale": product.date_of_sale,
            })
            .map_err(|error| abort(inserted, error))?;
    }

    Ok(products.len())
}

/// Get the number of rows in the product table.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn count_products(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM product", [], |row| row.get(0))
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        test_utils::{get_test_connection, product},
    };

    use super::{
        PRODUCT_COLUMNS, Product, count_products, insert_products, map_product_row,
        replace_products,
    };

    fn select_all(connection: &Connection) -> Vec<Product> {
        connection
            .prepare(&format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY rowid"))
            .unwrap()
            .query_map([], map_product_row)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn decodes_feed_records() {
        let json = r#"[
            {
                "id": 1,
                "title": "Fjallraven Backpack",
                "price": 329.85,
                "description": "Your perfect pack for everyday use",
                "category": "men's clothing",
                "image": "https://example.com/1.jpg",
                "sold": false,
                "dateOfSale": "2021-11-27T20:29:54+05:30"
            },
            {
                "id": 2,
                "title": "Mens T-Shirt",
                "price": "22",
                "description": "Slim-fitting style",
                "category": "men's clothing",
                "image": "https://example.com/2.jpg",
                "sold": true,
                "dateOfSale": "2021-10-27T20:29:54+05:30"
            }
        ]"#;

        let got: Vec<Product> = serde_json::from_str(json).unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].price, "329.85");
        assert_eq!(got[0].date_of_sale, "2021-11-27T20:29:54+05:30");
        assert!(!got[0].sold);
        assert_eq!(got[1].price, "22");
        assert!(got[1].sold);
    }

    #[test]
    fn serializes_with_feed_field_names() {
        let json = serde_json::to_value(product(7, "12.5", true, "2022-03-01", "toys")).unwrap();

        assert_eq!(json["dateOfSale"], "2022-03-01");
        assert_eq!(json["sold"], true);
        assert_eq!(json["price"], "12.5");
        assert!(json.get("date_of_sale").is_none());
    }

    #[test]
    fn insert_keeps_order_and_duplicates() {
        let connection = get_test_connection();
        let products = vec![
            product(1, "10", true, "2022-03-01", "toys"),
            product(1, "20", false, "2022-03-02", "toys"),
            product(2, "30", true, "2022-04-01", "books"),
        ];

        let inserted = insert_products(&products, &connection).unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(select_all(&connection), products);
    }

    #[test]
    fn insert_appends_to_existing_products() {
        let connection = get_test_connection();
        let products = vec![product(1, "10", true, "2022-03-01", "toys")];

        insert_products(&products, &connection).unwrap();
        insert_products(&products, &connection).unwrap();

        assert_eq!(count_products(&connection), Ok(2));
    }

    #[test]
    fn replace_removes_existing_products() {
        let connection = get_test_connection();
        let first = vec![
            product(1, "10", true, "2022-03-01", "toys"),
            product(2, "20", true, "2022-03-01", "toys"),
        ];
        let second = vec![product(3, "30", false, "2022-05-01", "books")];

        replace_products(&first, &connection).unwrap();
        replace_products(&second, &connection).unwrap();

        assert_eq!(select_all(&connection), second);
    }

    #[test]
    fn replace_is_idempotent() {
        let connection = get_test_connection();
        let products = vec![
            product(1, "10", true, "2022-03-01", "toys"),
            product(2, "20", true, "2022-03-01", "toys"),
        ];

        replace_products(&products, &connection).unwrap();
        replace_products(&products, &connection).unwrap();

        assert_eq!(count_products(&connection), Ok(2));
    }

    #[test]
    fn failed_insert_rolls_back_and_reports_progress() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        // Reject the third product so the batch fails part way through.
        connection
            .execute(
                "CREATE TRIGGER reject_broken BEFORE INSERT ON product
                WHEN NEW.title = 'broken'
                BEGIN SELECT RAISE(ABORT, 'broken product'); END",
                (),
            )
            .unwrap();
        let mut products = vec![
            product(1, "10", true, "2022-03-01", "toys"),
            product(2, "20", true, "2022-03-01", "toys"),
            product(3, "30", true, "2022-03-01", "toys"),
        ];
        products[2].title = "broken".to_owned();

        let result = insert_products(&products, &connection);

        match result {
            Err(Error::IngestionAborted {
                inserted, total, ..
            }) => {
                assert_eq!(inserted, 2);
                assert_eq!(total, 3);
            }
            other => panic!("expected Error::IngestionAborted, got {other:?}"),
        }
        assert_eq!(count_products(&connection), Ok(0));
    }

    #[test]
    fn failed_replace_keeps_previous_products() {
        let connection = get_test_connection();
        let previous = vec![product(1, "10", true, "2022-03-01", "toys")];
        replace_products(&previous, &connection).unwrap();
        connection
            .execute(
                "CREATE TRIGGER reject_broken BEFORE INSERT ON product
                WHEN NEW.title = 'broken'
                BEGIN SELECT RAISE(ABORT, 'broken product'); END",
                (),
            )
            .unwrap();
        let mut next = vec![product(2, "20", true, "2022-03-01", "toys")];
        next[0].title = "broken".to_owned();

        let result = replace_products(&next, &connection);

        assert!(matches!(result, Err(Error::IngestionAborted { .. })));
        assert_eq!(select_all(&connection), previous);
    }
}
