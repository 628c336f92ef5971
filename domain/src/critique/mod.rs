//! Critique domain
//!
//! The self-reflection quality gate: a [`Verdict`] on a candidate answer,
//! wrapped in a [`Critique`] that also carries the critic's diagnostic note.

pub mod parsing;
mod verdict;

pub use parsing::{APPROVAL_MARKER, parse_critique_response};
pub use verdict::{Critique, Verdict};
