//! Business logic that spans more than one repository.
//!
//! # Services
//!
//! - `auth` - Password hashing, registration, login, and bearer tokens

pub mod auth;
