//! Shared utilities for the clinic contract suite.
//!
//! This crate provides:
//! - [`validation`]: input checks applied before any mutation (non-empty
//!   text, clinical payload presence, date-range sanity).
//! - [`pagination`]: page/limit clamping shared by every list endpoint, so
//!   no caller can request an unbounded page.

#![no_std]

pub mod pagination;
pub mod validation;

pub use pagination::*;
pub use validation::*;
