//! End-to-end test support for Refrain
//!
//! - `harness`: isolated databases and orchestrators
//! - `mocks`: lyric fixtures and a store that fails on demand

pub mod harness;
pub mod mocks;

pub use harness::TestDatabaseManager;
pub use mocks::{FailingStore, TestDataFactory};
