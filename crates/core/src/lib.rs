//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `api` - HTTP JSON backend for categories, products, users, and orders
//! - `cli` - Command-line tools for migrations, seeding, and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, order statuses,
//!   and the money arithmetic behind order totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
