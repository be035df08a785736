//! Test helpers module
//!
//! Utilities shared by the integration tests: a mock platform API with a
//! Stripe stand-in, JSON fixtures and a wired-up test context.

#![allow(dead_code)]

pub mod api_mock;
pub mod test_context;
pub mod test_data;

pub use api_mock::*;
pub use test_context::*;
pub use test_data::*;
