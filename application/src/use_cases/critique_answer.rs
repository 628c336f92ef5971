//! Answer critique.
//!
//! The critic grades a candidate answer against the question and the
//! retrieved context. It never fails: when the evaluation call breaks, the
//! answer is accepted so that a broken critic cannot block delivery.

use crate::ports::text_generator::TextGenerator;
use async_trait::async_trait;
use ragloop_domain::core::string::prefix_chars;
use ragloop_domain::{Context, Critique, PromptTemplate, parse_critique_response};
use std::sync::Arc;
use tracing::{error, info};

/// Quality gate for candidate answers
#[async_trait]
pub trait Critic: Send + Sync {
    /// Grade `answer`. Infallible: failures degrade to an approval.
    async fn critique(&self, question: &str, context: &Context, answer: &str) -> Critique;
}

/// Critic backed by a [`TextGenerator`] and the `GOOD` / `IMPROVE:` convention
pub struct LlmCritic {
    generator: Arc<dyn TextGenerator>,
    context_preview_chars: usize,
}

impl LlmCritic {
    pub fn new(generator: Arc<dyn TextGenerator>, context_preview_chars: usize) -> Self {
        Self {
            generator,
            context_preview_chars,
        }
    }
}

#[async_trait]
impl Critic for LlmCritic {
    async fn critique(&self, question: &str, context: &Context, answer: &str) -> Critique {
        info!("Evaluating answer for: '{}...'", prefix_chars(question, 50));

        let prompt = PromptTemplate::critique_prompt(
            question,
            context.preview(self.context_preview_chars),
            answer,
        );

        match self.generator.generate(&prompt).await {
            Ok(response) => {
                let critique = parse_critique_response(&response);
                if critique.is_approved() {
                    info!("Critique result: APPROVED");
                } else {
                    info!("Critique result: NEEDS IMPROVEMENT - {}", critique.note);
                }
                critique
            }
            Err(e) => {
                error!("Critique failed: {}", e);
                Critique::degraded()
            }
        }
    }
}
