//! Critic response parsing.
//!
//! The evaluation prompt asks the model to answer with one of:
//!
//! | Response | Verdict |
//! |----------|---------|
//! | `GOOD` | [`Verdict::Approved`] |
//! | `IMPROVE: <reason>` | [`Verdict::NeedsImprovement`] |
//!
//! Only the `GOOD` prefix is matched. Everything else, including an
//! `IMPROVE` reply, free text, or an empty reply, is treated as a request
//! for improvement with the whole response as feedback.

use super::verdict::Critique;

/// Literal prefix that marks an approving response.
pub const APPROVAL_MARKER: &str = "GOOD";

/// Parse a critic response into a [`Critique`].
///
/// The response is trimmed first. Matching is case-sensitive, so a reply
/// starting with "Good" is not an approval.
///
/// # Examples
///
/// ```
/// use ragloop_domain::critique::parse_critique_response;
///
/// assert!(parse_critique_response("GOOD").is_approved());
/// assert!(!parse_critique_response("IMPROVE: cite dosage").is_approved());
/// ```
pub fn parse_critique_response(response: &str) -> Critique {
    let content = response.trim();
    if content.starts_with(APPROVAL_MARKER) {
        Critique::approved()
    } else {
        Critique::needs_improvement(content)
    }
}
