//! Prompt templates for the answer loop

use crate::conversation::Exchange;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Render conversation history, oldest first.
    ///
    /// Returns an empty string when there is no history so that first
    /// questions get a prompt without a dangling header.
    pub fn history(exchanges: &[Exchange]) -> String {
        if exchanges.is_empty() {
            return String::new();
        }

        let mut text = String::from("\n\nPrevious Conversation:\n");
        for exchange in exchanges {
            text.push_str(&format!(
                "Q: {}\nA: {}\n\n",
                exchange.question, exchange.answer
            ));
        }
        text
    }

    /// Prompt for the first answer draft
    pub fn answer_prompt(history: &[Exchange], context: &str, question: &str) -> String {
        format!(
            r#"You are a knowledgeable assistant. Answer the question based on the context.
{}
Context:
{}

Question: {}

Provide a clear, concise answer (3-4 sentences max). If the question refers to previous conversation, use that context."#,
            Self::history(history),
            context,
            question
        )
    }

    /// Prompt for rewriting an answer after critic feedback
    pub fn revision_prompt(
        history: &[Exchange],
        context: &str,
        question: &str,
        previous_answer: &str,
        feedback: &str,
    ) -> String {
        format!(
            r#"{}
Context:
{}

Question: {}

Previous Answer: {}

Feedback: {}

Provide an improved answer addressing the feedback."#,
            Self::history(history),
            context,
            question,
            previous_answer,
            feedback
        )
    }

    /// Prompt asking the critic to grade an answer.
    ///
    /// `context_preview` is expected to be already bounded by the caller.
    pub fn critique_prompt(question: &str, context_preview: &str, answer: &str) -> String {
        format!(
            r#"Question: {}
Context Retrieved: {}...
Generated Answer: {}

Evaluate this answer:
1. Is it accurate based on the context?
2. Is it complete?
3. Does it need improvement?

Respond with:
- "GOOD" if answer is satisfactory
- "IMPROVE: <reason>" if it needs work"#,
            question, context_preview, answer
        )
    }
}
