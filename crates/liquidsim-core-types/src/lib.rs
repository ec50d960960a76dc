//! Core types shared across liquidsim facilities
//!
//! This crate provides foundational types used by both the error
//! and logging facilities of the simulation engine:
//!
//! - **Correlation types**: RunId identifying one simulation run in logs
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RunId;
