//! Client for the homework status API.
//!
//! This crate provides:
//! - The `StatusSource` capability consumed by the polling loop
//! - A reqwest-backed implementation talking to the Practicum endpoint

pub mod client;
pub mod error;

pub use client::{ClientConfig, PracticumClient, StatusSource, DEFAULT_ENDPOINT};
pub use error::{ApiError, ApiResult};
