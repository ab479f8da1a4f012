use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    db::initialize,
    product::{Product, insert_products},
};

#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn product(id: i64, price: &str, sold: bool, date_of_sale: &str, category: &str) -> Product {
    Product {
        id,
        title: format!("product #{id}"),
        price: price.to_owned(),
        description: format!("description of product #{id}"),
        category: category.to_owned(),
        image: format!("https://example.com/images/{id}.jpg"),
        sold,
        date_of_sale: date_of_sale.to_owned(),
    }
}

/// Two products from March and one from April.
pub(crate) fn sample_products() -> Vec<Product> {
    vec![
        product(1, "50", true, "2022-03-01", "electronics"),
        product(2, "150", false, "2022-03-15", "jewelery"),
        product(3, "999", true, "2022-04-01", "electronics"),
    ]
}

#[track_caller]
pub(crate) fn insert_test_products(products: &[Product], connection: &Arc<Mutex<Connection>>) {
    let connection = connection.lock().expect("Could not acquire database lock");
    insert_products(products, &connection).expect("Could not insert test products");
}
