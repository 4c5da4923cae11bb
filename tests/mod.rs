//! Test suite for heyboo
//!
//! This module organizes all tests

pub mod common;
pub mod integration;
