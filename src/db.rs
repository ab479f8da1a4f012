//! Sets up the application's database.
//!
//! Besides creating the tables, [initialize] registers the SQL functions the
//! report queries rely on:
//! - `price_value(price)` reads the price text as a number, or NULL if it is
//!   not numeric.
//! - `sale_month(date_of_sale)` reads the two-digit month of a date of sale,
//!   or NULL if the date cannot be parsed.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{
    Connection, Error, Transaction, TransactionBehavior, functions::FunctionFlags,
    types::ValueRef,
};

use crate::{month::MonthToken, month::parse_date, product::create_product_table};

/// Create the tables and register the SQL functions for `connection`.
///
/// The functions are registered per connection, so this must be called on
/// every connection opened to the database. Creating the tables is a no-op if
/// they already exist.
///
/// # Errors
/// Returns an error if a function cannot be registered or there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    register_functions(connection)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_product_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the shared database connection.
///
/// # Errors
/// Returns [crate::Error::DatabaseLockError] if the lock is poisoned.
pub(crate) fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, crate::Error> {
    connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| crate::Error::DatabaseLockError)
}

fn register_functions(connection: &Connection) -> Result<(), Error> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    connection.create_scalar_function("price_value", 1, flags, |context| {
        Ok(price_value(context.get_raw(0)))
    })?;

    connection.create_scalar_function("sale_month", 1, flags, |context| {
        Ok(sale_month(context.get_raw(0)))
    })?;

    Ok(())
}

/// Read a stored price as a number.
///
/// Returns `None` for text that is not a finite number.
fn price_value(value: ValueRef<'_>) -> Option<f64> {
    let price = match value {
        ValueRef::Integer(integer) => integer as f64,
        ValueRef::Real(real) => real,
        ValueRef::Text(text) => std::str::from_utf8(text).ok()?.trim().parse().ok()?,
        ValueRef::Null | ValueRef::Blob(_) => return None,
    };

    price.is_finite().then_some(price)
}

fn sale_month(value: ValueRef<'_>) -> Option<String> {
    let ValueRef::Text(text) = value else {
        return None;
    };

    let date = parse_date(std::str::from_utf8(text).ok()?)?;

    Some(MonthToken::from(date.month()).as_str().to_owned())
}
