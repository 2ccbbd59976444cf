//! API handlers for webpay.

pub mod auth;
pub mod health;
pub mod root;
