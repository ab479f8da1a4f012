#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod http;

pub(crate) use db::{get_test_connection, insert_test_products, product, sample_products};
pub(crate) use http::{assert_content_type, assert_error_kind, get_test_server};
