//! Retriever adapters.

mod http;

pub use http::{HttpRetriever, parse_search_response};
