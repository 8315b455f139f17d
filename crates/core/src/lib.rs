//! ShopEase Core - Shared types library.
//!
//! This crate provides common types used across all ShopEase components:
//! - `client` - Typed HTTP client for the ShopEase REST API
//! - `cli` - Operator command-line tools built on the client
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Entities returned by the backend live in the client crate; the values here
//! are the ones every layer agrees on (identifiers, emails, prices, role and
//! tier enums, pagination).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses, and pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
