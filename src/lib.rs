//! First-party analytics for a marketing site: event capture, a logging
//! endpoint backed by DuckDB, admin-gated aggregation, and an embedded
//! dashboard.

pub mod api;
pub mod capture;
pub mod config;
pub mod dashboard;
pub mod event;
pub mod query;
pub mod server;
pub mod storage;
