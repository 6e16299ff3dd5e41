//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: identifier helpers used when rendering Python

pub mod error;
pub mod string;
