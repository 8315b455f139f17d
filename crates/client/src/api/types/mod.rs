//! Domain types for the ShopEase REST API.
//!
//! These mirror the backend's JSON documents (camelCase keys, `_id` string
//! keys). They are pass-through values: the client replaces its copy with
//! the latest server response and never merges.

pub mod common;
pub mod payment;
pub mod product;
pub mod request;
pub mod review;
pub mod user;

pub use common::{MutationAck, parse_timestamp};
pub use payment::{Payment, PaymentIntent};
pub use product::{NewProduct, NewUpcomingProduct, Product, ProductUpdate, UpcomingProduct};
pub use request::{NewProductRequest, ProductRef, ProductRequest};
pub use review::{NewReview, Review};
pub use user::{AdminProfile, User, UserUpsert};
