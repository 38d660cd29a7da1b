//! Example workers.
//!
//! A worker takes a flat argument record, builds one [`ApiClient`] for the
//! call, talks to the platform sequentially, and returns the raw result.
//! Workers know nothing about sessions or HTTP; errors propagate unchanged.
//!
//! [`ApiClient`]: crate::api::ApiClient

pub mod audit_users;
pub mod envelope_docs;
pub mod rooms_with_data;
