//! # Newsroom Core
//!
//! The domain layer of the newsroom service.
//! Entities, ports and the publishing workflows live here; storage and
//! transport are supplied by the caller through the port traits.

pub mod domain;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::DomainError;
