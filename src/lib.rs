//! Storefront backend for a hand-tools shop: tools, orders, reviews, users and
//! payment intents over a document store, with a bearer-token gate on the
//! identity-scoped endpoints.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
