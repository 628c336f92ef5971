//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`] — a validated, non-empty user question
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — UTF-8 safe truncation helpers used to bound prompt text

pub mod error;
pub mod question;
pub mod string;
