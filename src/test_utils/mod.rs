//! Test utilities shared by unit and HTTP-level tests.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - Repository stubs for exercising error paths
//! - A builder for `AppState` backed by the in-memory store

mod app_state_builder;
mod factories;
mod student_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use student_mocks::*;
