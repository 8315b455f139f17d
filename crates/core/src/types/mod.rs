//! Core types for ShopEase.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use page::{Page, PageError, PageRequest};
pub use price::{Price, PriceError};
pub use status::*;
