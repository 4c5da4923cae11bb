//! Real-time channel integration tests

pub mod broadcast_test;
pub mod lifecycle_test;
