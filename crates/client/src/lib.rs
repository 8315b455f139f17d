//! ShopEase client library.
//!
//! Typed access to the ShopEase backend and the pieces a front end needs
//! around it:
//!
//! - [`api`] - REST client, list envelopes, query builder, DTOs
//! - [`session`] - identity session store with subscriptions
//! - [`identity`] - identity provider trait and hosted implementation
//! - [`access`] - role resolution and navigation gates
//! - [`likes`] - like checks with optimistic update and rollback
//! - [`feed`] - infinite-scroll product feed
//! - [`debounce`] - trailing-edge debouncer for search input
//! - [`media`] - image upload
//! - [`checkout`] - membership purchase
//! - [`validation`] - form checks run before submission

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod api;
pub mod checkout;
pub mod config;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod identity;
pub mod likes;
pub mod media;
pub mod session;
pub mod validation;

pub use api::{Auth, ListQuery, ShopClient, SortOrder};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
