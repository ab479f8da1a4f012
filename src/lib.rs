//! A REST API for month-filtered sales reports over a product catalogue.
//!
//! The product table is loaded from a remote JSON feed, then queried by
//! calendar month to produce:
//! - a searchable, paginated listing of the month's products
//! - the month's sales totals
//! - the number of products per price range
//! - the number of products per category

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod error;
mod ingest;
mod logging;
mod month;
mod pagination;
mod product;
mod report;
mod routing;
#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use ingest::{DEFAULT_FEED_URL, FeedConfig, IngestMode};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::MonthToken;
pub use pagination::PaginationConfig;
pub use product::Product;
pub use report::{PRICE_BUCKETS, PriceBucket, SalesStatistics, TransactionsState};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
