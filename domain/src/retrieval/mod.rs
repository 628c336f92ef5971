//! Retrieval domain
//!
//! - [`Passage`] — one retrieved unit of source content with its metadata
//! - [`Context`] — the passages of one question joined into prompt text

mod context;
mod passage;

pub use context::{CONTEXT_SEPARATOR, Context};
pub use passage::{Metadata, Passage};
