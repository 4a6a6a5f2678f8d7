//! Fernway Core - Shared types library.
//!
//! This crate provides common types used across all Fernway components:
//! - `cart` - Client-side cart state and reconciliation subsystem
//! - the storefront views and admin screens that consume it
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the billing cadence

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
