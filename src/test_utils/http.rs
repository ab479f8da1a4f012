use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;

use crate::{AppState, build_router, ingest::FeedConfig, pagination::PaginationConfig};

use super::db::get_test_connection;

/// A test server for the full router and the connection it reads from.
///
/// The feed URL points at an unroutable address, tests that ingest data should
/// build their own [AppState].
pub(crate) fn get_test_server() -> (TestServer, Arc<Mutex<Connection>>) {
    let state = AppState::new(
        get_test_connection(),
        PaginationConfig::default(),
        FeedConfig::new("http://127.0.0.1:9/feed.json"),
    )
    .expect("Could not create app state");
    let connection = state.db_connection.clone();
    let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

    (server, connection)
}

#[track_caller]
pub(crate) fn assert_content_type(response: &TestResponse, content_type: &str) {
    let content_type_header = response.header("content-type");
    assert_eq!(content_type_header, content_type);
}

#[track_caller]
pub(crate) fn assert_error_kind(response: &TestResponse, status: StatusCode, kind: &str) {
    response.assert_status(status);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["kind"], kind, "got error body {body}");
}
