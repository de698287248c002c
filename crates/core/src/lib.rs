//! Heating Oil Tracker Core - Shared domain types.
//!
//! This crate provides the types used by every heating oil tracker component:
//! - `web` - Waitlist, authentication, dashboard and admin site
//! - `cli` - Command-line tools for migrations and inspecting data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Validation lives here so every entry point (forms, CLI, database rows)
//! agrees on what a valid value looks like.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
