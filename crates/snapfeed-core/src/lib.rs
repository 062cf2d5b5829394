//! # Snapfeed Core
//!
//! The domain layer of the Snapfeed client engine.
//! This crate contains the data model, caption tokenization and the ports the
//! engine talks to. It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
