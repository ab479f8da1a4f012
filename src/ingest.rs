//! Loads the product table from the remote product feed.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    db::lock_connection,
    product::{Product, count_products, insert_products, replace_products},
};

/// The product feed the original dataset is published at.
pub const DEFAULT_FEED_URL: &str =
    "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// How fetched products are written to the product table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum IngestMode {
    /// Replace the stored products with the feed, so repeated ingestion is idempotent.
    #[default]
    Replace,
    /// Add the feed to the stored products, so repeated ingestion stores duplicates.
    Append,
}

/// Where and how to fetch the product feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// The URL of the JSON product feed.
    pub url: String,
    /// How fetched products are written to the product table.
    pub mode: IngestMode,
    client: reqwest::Client,
    // Held for the whole fetch and write so that only one ingestion runs at a time.
    ingestion_lock: Arc<tokio::sync::Mutex<()>>,
}

impl FeedConfig {
    /// Create a config for the feed at `url` that replaces the stored products.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: IngestMode::default(),
            client: reqwest::Client::new(),
            ingestion_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Set how fetched products are written to the product table.
    pub fn mode(mut self, mode: IngestMode) -> Self {
        self.mode = mode;
        self
    }
}

/// The state needed for loading the product feed.
#[derive(Debug, Clone)]
pub struct IngestState {
    /// The database connection for writing products.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The product feed to load.
    pub feed_config: FeedConfig,
}

impl FromRef<AppState> for IngestState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            feed_config: state.feed_config.clone(),
        }
    }
}

/// The body of a successful ingestion response.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// A human readable summary.
    pub message: String,
}

/// Fetch the product feed and write it to the product table.
pub async fn initialize_database(
    State(state): State<IngestState>,
) -> Result<Json<IngestResponse>, Error> {
    let feed_config = &state.feed_config;
    let _ingestion_guard = feed_config.ingestion_lock.lock().await;

    tracing::info!("fetching product feed from {}", feed_config.url);
    let products = fetch_products(&feed_config.client, &feed_config.url).await?;
    tracing::info!("fetched {} products", products.len());

    let stored = store_products(&products, feed_config.mode, &state.db_connection)?;
    tracing::info!("stored {stored} products ({:?})", feed_config.mode);

    Ok(Json(IngestResponse {
        message: format!("Data Initialized Successfully, stored {stored} records"),
    }))
}

/// Request `url` and decode the body as a list of products.
///
/// # Errors
/// Returns [Error::UpstreamFetchError] if the request fails, the response
/// status is not a success, or the body is not a list of products.
async fn fetch_products(client: &reqwest::Client, url: &str) -> Result<Vec<Product>, Error> {
    let upstream_error = |error: reqwest::Error| {
        tracing::error!("could not fetch product feed from {url}: {error}");
        Error::UpstreamFetchError(error.to_string())
    };

    client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(upstream_error)?
        .json::<Vec<Product>>()
        .await
        .map_err(upstream_error)
}

fn store_products(
    products: &[Product],
    mode: IngestMode,
    db_connection: &Mutex<Connection>,
) -> Result<usize, Error> {
    let connection = lock_connection(db_connection)?;

    let stored = match mode {
        IngestMode::Replace => replace_products(products, &connection),
        IngestMode::Append => insert_products(products, &connection),
    }?;

    tracing::debug!(
        "product table holds {} products",
        count_products(&connection)?
    );

    Ok(stored)
}
