#![doc(test(attr(deny(warnings))))]

//! MoneyFlow Core holds the record model, storage adapters and pure finance
//! aggregations behind a personal income and expense tracker.

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

pub use crate::core::app_state::{AppState, Lookup};
pub use crate::errors::{FinanceError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("MoneyFlow Core tracing initialized.");
    });
}
