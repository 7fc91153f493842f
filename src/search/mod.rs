//! Vehicle lookup: query normalization and the registry gateway.
//!
//! This module provides:
//! * [`normalize`] / [`SearchKey`] — the query normalizer.
//! * [`VehicleRecord`] — the registry's vehicle document.
//! * [`SearchGateway`] — async trait implemented by lookup backends.
//! * [`HttpSearchGateway`] — the REST implementation.
//! * [`SearchError`] — not-found / transport failures with user-facing text.

pub mod gateway;
pub mod key;
pub mod vehicle;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use gateway::{HttpSearchGateway, SearchError, SearchGateway};
pub use key::{normalize, SearchKey};
pub use vehicle::VehicleRecord;
