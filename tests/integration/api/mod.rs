//! REST API integration tests

pub mod chat_test;
