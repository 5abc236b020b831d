// src/lib.rs

//! monolink blog data layer
//!
//! Content backend reads, engagement data access, media URL handling and the
//! on-demand revalidation endpoint.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
