//! Bazaar API library.
//!
//! JSON CRUD backend for a small shop: categories, products, users, and
//! orders, with order totals computed from catalog prices. The binary in
//! `main.rs` wires configuration, logging, and Sentry around
//! [`app::build_router`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
