//! Core types for Fernway.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod frequency;
pub mod id;

pub use frequency::Frequency;
pub use id::*;
