//! Thin REST client for the signing platform.
//!
//! Only the endpoints the examples use are modelled. Response types keep any
//! field they do not name in a flattened `extra` map so results render back
//! exactly as the API sent them.

pub mod admin;
pub mod client;
pub mod esign;
pub mod rooms;

pub use client::{ApiClient, ApiError, ErrorBody};
