//! Answer Question use case.
//!
//! Runs one question through the answer loop:
//!
//! ```text
//! Retrieving -> Generating -> Critiquing -> (Revising -> Critiquing)* -> Finalizing
//! ```
//!
//! Retrieval and the first draft are load-bearing and fail the run. The
//! critique loop only refines an answer that already exists, so failures
//! there are absorbed and the best answer so far is returned.

use crate::config::AgentParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::retriever::{RetrievalError, Retriever};
use crate::ports::text_generator::{GenerationError, TextGenerator};
use crate::use_cases::critique_answer::{Critic, LlmCritic};
use ragloop_domain::core::string::truncate_str;
use ragloop_domain::{
    AnswerResult, Context, ConversationMemory, Critique, DomainError, Exchange, PromptTemplate,
    Question, Stage, Termination, Verdict,
};
use serde_json::json;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors that abort a question run.
#[derive(Error, Debug)]
pub enum AnswerQuestionError {
    #[error("{0}")]
    InvalidQuestion(#[from] DomainError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Answer generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Deadline exceeded while {stage}")]
    DeadlineExceeded { stage: Stage },

    #[error("Operation cancelled")]
    Cancelled,
}

impl AnswerQuestionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnswerQuestionError::Cancelled)
    }

    /// Whether the caller sent something unusable (as opposed to a backend failure)
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AnswerQuestionError::InvalidQuestion(e) if e.is_invalid_input())
    }
}

/// Input for the [`AnswerQuestionUseCase`].
#[derive(Debug, Clone)]
pub struct AnswerQuestionInput {
    /// The user's question, validated before any external call.
    pub question: String,
    /// Aborts the run at its next external call when cancelled.
    pub cancellation: Option<CancellationToken>,
}

impl AnswerQuestionInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Why an external call did not produce a value
enum Interrupt {
    DeadlineExceeded,
    Cancelled,
}

impl Interrupt {
    fn into_error(self, stage: Stage) -> AnswerQuestionError {
        match self {
            Interrupt::DeadlineExceeded => AnswerQuestionError::DeadlineExceeded { stage },
            Interrupt::Cancelled => AnswerQuestionError::Cancelled,
        }
    }
}

/// Limits shared by every external call of one run
struct RunBounds<'a> {
    deadline: Option<Instant>,
    cancellation: Option<&'a CancellationToken>,
}

impl RunBounds<'_> {
    async fn call<F: Future>(&self, fut: F) -> Result<F::Output, Interrupt> {
        let timed = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| Interrupt::DeadlineExceeded),
                None => Ok(fut.await),
            }
        };

        match self.cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Interrupt::Cancelled),
                result = timed => result,
            },
            None => timed.await,
        }
    }
}

/// Use case for answering questions with retrieval and self-critique.
///
/// Holds the conversation memory, so one instance is one conversation.
/// Share it behind an `Arc`; concurrent runs only contend on the memory
/// lock, which is never held across an `.await`.
pub struct AnswerQuestionUseCase {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn TextGenerator>,
    critic: Arc<dyn Critic>,
    memory: Mutex<ConversationMemory>,
    params: AgentParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl AnswerQuestionUseCase {
    /// Create a use case whose critic uses the same generator as the answers.
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn TextGenerator>,
        params: AgentParams,
    ) -> Self {
        let critic = Arc::new(LlmCritic::new(
            generator.clone(),
            params.context_preview_chars,
        ));
        Self {
            retriever,
            generator,
            critic,
            memory: Mutex::new(ConversationMemory::new(params.history_capacity)),
            params,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_critic(mut self, critic: Arc<dyn Critic>) -> Self {
        self.critic = critic;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn generator_model(&self) -> &str {
        self.generator.model()
    }

    /// Execute without progress reporting
    pub async fn execute(
        &self,
        input: AnswerQuestionInput,
    ) -> Result<AnswerResult, AnswerQuestionError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: AnswerQuestionInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<AnswerResult, AnswerQuestionError> {
        let question = Question::try_new(input.question)?;
        let bounds = RunBounds {
            deadline: self.params.timeout.map(|timeout| Instant::now() + timeout),
            cancellation: input.cancellation.as_ref(),
        };

        info!(
            "Processing new query: '{}'",
            truncate_str(question.content(), 100)
        );

        let result = self.run(&question, &bounds, progress).await;
        progress.on_finished(result.is_ok());

        match &result {
            Ok(answer) => info!(
                "Query processing completed ({} critique pass(es), {} revision(s), {})",
                answer.critique_passes, answer.revisions, answer.termination
            ),
            Err(e) => error!("Error processing query: {}", e),
        }
        result
    }

    async fn run(
        &self,
        question: &Question,
        bounds: &RunBounds<'_>,
        progress: &dyn ProgressNotifier,
    ) -> Result<AnswerResult, AnswerQuestionError> {
        let query = question.content();

        // ==================== Retrieving ====================
        progress.on_stage_start(Stage::Retrieving, 0);
        let passages = bounds
            .call(self.retriever.retrieve(query))
            .await
            .map_err(|i| i.into_error(Stage::Retrieving))??;
        let context = Context::from_passages(&passages);
        info!(
            "Retrieved {} passage(s), {} bytes of context",
            passages.len(),
            context.len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "retrieval",
            json!({
                "query": query,
                "passages": passages.len(),
                "sources": passages.iter().filter_map(|p| p.source()).collect::<Vec<_>>(),
            }),
        ));

        // ==================== Generating ====================
        let history = self.lock_memory().recent(self.params.history_window);
        debug!("Using {} exchange(s) of history", history.len());

        progress.on_stage_start(Stage::Generating, 0);
        let prompt = PromptTemplate::answer_prompt(&history, context.as_str(), query);
        let draft = bounds
            .call(self.generator.generate(&prompt))
            .await
            .map_err(|i| i.into_error(Stage::Generating))??;
        let mut answer = draft.trim().to_string();
        info!("Generated answer of {} chars", answer.chars().count());
        self.conversation_logger.log(ConversationEvent::new(
            "draft",
            json!({ "answer": answer }),
        ));

        // ==================== Critique loop ====================
        let max_iterations = self.params.effective_max_iterations();
        let mut critique_passes = 0;
        let mut revisions = 0;

        let termination = loop {
            critique_passes += 1;
            info!("Critique iteration {}/{}", critique_passes, max_iterations);

            progress.on_stage_start(Stage::Critiquing, critique_passes);
            let critique = match bounds
                .call(self.critic.critique(query, &context, &answer))
                .await
            {
                Ok(critique) => critique,
                Err(Interrupt::Cancelled) => return Err(AnswerQuestionError::Cancelled),
                Err(Interrupt::DeadlineExceeded) => {
                    warn!("Deadline reached during critique, accepting answer");
                    Critique::degraded()
                }
            };
            progress.on_critique(critique_passes, max_iterations, &critique);
            self.conversation_logger.log(ConversationEvent::new(
                "critique",
                json!({
                    "iteration": critique_passes,
                    "approved": critique.is_approved(),
                    "degraded": critique.degraded,
                    "note": critique.note,
                }),
            ));

            let feedback = match critique.verdict {
                Verdict::Approved => {
                    info!("Answer approved by critic");
                    break if critique.degraded {
                        Termination::CriticUnavailable
                    } else {
                        Termination::Approved
                    };
                }
                Verdict::NeedsImprovement { feedback } => feedback,
            };

            if critique_passes >= max_iterations {
                info!("Iteration budget exhausted, keeping current answer");
                break Termination::BudgetExhausted;
            }

            // ==================== Revising ====================
            info!("Improving answer based on critique");
            progress.on_stage_start(Stage::Revising, critique_passes);
            let prompt = PromptTemplate::revision_prompt(
                &history,
                context.as_str(),
                query,
                &answer,
                &feedback,
            );
            let failure = match bounds.call(self.generator.generate(&prompt)).await {
                Ok(Ok(revised)) => {
                    answer = revised.trim().to_string();
                    revisions += 1;
                    self.conversation_logger.log(ConversationEvent::new(
                        "revision",
                        json!({ "iteration": critique_passes, "answer": answer }),
                    ));
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(Interrupt::Cancelled) => return Err(AnswerQuestionError::Cancelled),
                Err(Interrupt::DeadlineExceeded) => "deadline exceeded".to_string(),
            };

            error!("Error improving answer: {}", failure);
            self.conversation_logger.log(ConversationEvent::new(
                "revision_failed",
                json!({ "iteration": critique_passes, "error": failure }),
            ));
            break Termination::RevisionFailed;
        };

        // ==================== Finalizing ====================
        progress.on_stage_start(Stage::Finalizing, 0);
        self.lock_memory()
            .append(Exchange::new(query, answer.clone()));
        self.conversation_logger.log(ConversationEvent::new(
            "answer",
            json!({
                "question": query,
                "answer": answer,
                "sources": passages.len(),
                "critique_passes": critique_passes,
                "revisions": revisions,
                "termination": termination.as_str(),
            }),
        ));

        Ok(AnswerResult {
            question: query.to_string(),
            answer,
            context: context.into_string(),
            source_count: passages.len(),
            critique_passes,
            revisions,
            termination,
        })
    }

    /// Forget every exchange. Runs already past their history snapshot are unaffected.
    pub fn clear_history(&self) {
        self.lock_memory().clear();
        info!("Conversation history cleared");
        self.conversation_logger
            .log(ConversationEvent::new("history_cleared", json!({})));
    }

    /// Snapshot of the whole conversation memory, oldest first
    pub fn history(&self) -> Vec<Exchange> {
        self.lock_memory().iter().cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.lock_memory().len()
    }

    fn lock_memory(&self) -> MutexGuard<'_, ConversationMemory> {
        // Every memory operation leaves it consistent, so a poisoned lock is still usable.
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragloop_domain::Passage;
    use std::collections::VecDeque;
    use std::time::Duration;

    // ==================== Test Mocks ====================

    struct ScriptedRetriever {
        passages: Result<Vec<Passage>, String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRetriever {
        fn returning(contents: &[&str]) -> Self {
            Self {
                passages: Ok(contents.iter().map(|c| Passage::new(*c)).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                passages: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Retriever for ScriptedRetriever {
        async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
            self.calls.lock().unwrap().push(query.to_string());
            self.passages
                .clone()
                .map_err(RetrievalError::Connection)
        }
    }

    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<&str, &str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| {
                            r.map(str::to_string)
                                .map_err(|e| GenerationError::RequestFailed(e.to_string()))
                        })
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Other("No more responses".to_string())))
        }
    }

    /// Critic replaying a script; keeps asking for improvement once it runs out.
    struct ScriptedCritic {
        critiques: Mutex<VecDeque<Critique>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedCritic {
        fn new(critiques: Vec<Critique>) -> Self {
            Self {
                critiques: Mutex::new(critiques.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn always_unhappy() -> Self {
            Self::new(Vec::new())
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Critic for ScriptedCritic {
        async fn critique(&self, _question: &str, _context: &Context, answer: &str) -> Critique {
            self.calls.lock().unwrap().push(answer.to_string());
            self.critiques
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Critique::needs_improvement("IMPROVE: try again"))
        }
    }

    struct SlowRetriever;

    #[async_trait]
    impl Retriever for SlowRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<Passage>, RetrievalError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    struct SlowCritic;

    #[async_trait]
    impl Critic for SlowCritic {
        async fn critique(&self, _question: &str, _context: &Context, _answer: &str) -> Critique {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Critique::needs_improvement("IMPROVE: never seen")
        }
    }

    /// Drafts `A0` at once, then hangs on every revision.
    struct StallingReviser {
        calls: Mutex<usize>,
        cancel_on_revision: Option<CancellationToken>,
    }

    impl StallingReviser {
        fn new() -> Self {
            Self {
                calls: Mutex::new(0),
                cancel_on_revision: None,
            }
        }

        /// Also cancels `token` once the revision call is in flight.
        fn cancelling(token: CancellationToken) -> Self {
            Self {
                calls: Mutex::new(0),
                cancel_on_revision: Some(token),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StallingReviser {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if call == 1 {
                return Ok("A0".to_string());
            }
            if let Some(token) = &self.cancel_on_revision {
                token.cancel();
            }
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        stages: Mutex<Vec<(Stage, usize)>>,
        finished: Mutex<Option<bool>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_stage_start(&self, stage: Stage, iteration: usize) {
            self.stages.lock().unwrap().push((stage, iteration));
        }

        fn on_finished(&self, success: bool) {
            *self.finished.lock().unwrap() = Some(success);
        }
    }

    fn use_case(
        retriever: Arc<ScriptedRetriever>,
        generator: Arc<ScriptedGenerator>,
        critic: Arc<ScriptedCritic>,
        params: AgentParams,
    ) -> AnswerQuestionUseCase {
        AnswerQuestionUseCase::new(retriever, generator, params).with_critic(critic)
    }

    fn aspirin_passages() -> Arc<ScriptedRetriever> {
        Arc::new(ScriptedRetriever::returning(&[
            "Aspirin is an analgesic.",
            "Aspirin reduces fever.",
            "Aspirin thins the blood.",
        ]))
    }

    // ==================== Scenarios ====================

    #[tokio::test]
    async fn test_first_pass_approval() {
        let retriever = aspirin_passages();
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(
            "  Aspirin relieves pain, reduces fever and inflammation.\n",
        )]));
        let critic = Arc::new(ScriptedCritic::new(vec![Critique::approved()]));
        let uc = use_case(
            retriever.clone(),
            generator.clone(),
            critic.clone(),
            AgentParams::default(),
        );

        let result = uc
            .execute(AnswerQuestionInput::new("What is aspirin used for?"))
            .await
            .unwrap();

        assert_eq!(result.question, "What is aspirin used for?");
        assert_eq!(
            result.answer,
            "Aspirin relieves pain, reduces fever and inflammation."
        );
        assert_eq!(result.source_count, 3);
        assert_eq!(
            result.context,
            "Aspirin is an analgesic.\n\nAspirin reduces fever.\n\nAspirin thins the blood."
        );
        assert_eq!(result.critique_passes, 1);
        assert_eq!(result.revisions, 0);
        assert_eq!(result.termination, Termination::Approved);
        assert_eq!(critic.call_count(), 1);
        assert_eq!(generator.prompts().len(), 1);
        assert_eq!(retriever.call_count(), 1);

        let history = uc.history();
        assert_eq!(
            history,
            vec![Exchange::new(
                "What is aspirin used for?",
                "Aspirin relieves pain, reduces fever and inflammation."
            )]
        );
    }

    #[tokio::test]
    async fn test_budget_exhausted_keeps_last_revision() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("A0"), Ok("A1")]));
        let critic = Arc::new(ScriptedCritic::new(vec![
            Critique::needs_improvement("IMPROVE: too vague"),
            Critique::needs_improvement("IMPROVE: still vague"),
        ]));
        let uc = use_case(
            aspirin_passages(),
            generator.clone(),
            critic.clone(),
            AgentParams::default(),
        );

        let result = uc.execute(AnswerQuestionInput::new("Explain it")).await.unwrap();

        assert_eq!(result.answer, "A1");
        assert_eq!(result.critique_passes, 2);
        assert_eq!(result.revisions, 1);
        assert_eq!(result.termination, Termination::BudgetExhausted);
        assert_eq!(critic.call_count(), 2);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("A0"));
        assert!(prompts[1].contains("IMPROVE: too vague"));
        assert_eq!(uc.history_len(), 1);
    }

    #[tokio::test]
    async fn test_iteration_bounds_hold_for_any_budget() {
        for m in 1..=4 {
            let responses = (0..m).map(|_| Ok("answer")).collect();
            let generator = Arc::new(ScriptedGenerator::new(responses));
            let critic = Arc::new(ScriptedCritic::always_unhappy());
            let uc = use_case(
                aspirin_passages(),
                generator.clone(),
                critic.clone(),
                AgentParams::default().with_max_iterations(m),
            );

            let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

            assert_eq!(critic.call_count(), m, "critiques for m={m}");
            assert_eq!(generator.prompts().len() - 1, m - 1, "revisions for m={m}");
            assert_eq!(result.revisions, m - 1);
            assert_eq!(result.termination, Termination::BudgetExhausted);
        }
    }

    #[tokio::test]
    async fn test_zero_budget_still_runs_one_pass() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("A0")]));
        let critic = Arc::new(ScriptedCritic::always_unhappy());
        let uc = use_case(
            aspirin_passages(),
            generator.clone(),
            critic.clone(),
            AgentParams::default().with_max_iterations(0),
        );

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(critic.call_count(), 1);
        assert_eq!(result.answer, "A0");
        assert_eq!(result.revisions, 0);
    }

    #[tokio::test]
    async fn test_final_answer_is_last_generated() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("A0"),
            Ok("A1"),
            Ok("A2"),
        ]));
        let critic = Arc::new(ScriptedCritic::new(vec![
            Critique::needs_improvement("IMPROVE: x"),
            Critique::needs_improvement("IMPROVE: y"),
            Critique::approved(),
        ]));
        let uc = use_case(
            aspirin_passages(),
            generator,
            critic.clone(),
            AgentParams::default().with_max_iterations(3),
        );

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(result.answer, "A2");
        assert_eq!(result.revisions, 2);
        assert_eq!(result.termination, Termination::Approved);
        // The critic saw each answer in turn
        assert_eq!(*critic.calls.lock().unwrap(), vec!["A0", "A1", "A2"]);
    }

    // ==================== Failure containment ====================

    #[tokio::test]
    async fn test_retrieval_error_propagates_and_memory_unchanged() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("first")]));
        let critic = Arc::new(ScriptedCritic::new(vec![Critique::approved()]));
        let ok = use_case(
            aspirin_passages(),
            generator.clone(),
            critic.clone(),
            AgentParams::default(),
        );
        ok.execute(AnswerQuestionInput::new("warm up")).await.unwrap();
        let before = ok.history();

        // Same memory, broken index
        let broken = AnswerQuestionUseCase {
            retriever: Arc::new(ScriptedRetriever::failing("index unreachable")),
            ..ok
        };
        let err = broken
            .execute(AnswerQuestionInput::new("What is aspirin used for?"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnswerQuestionError::Retrieval(RetrievalError::Connection(ref m)) if m == "index unreachable"
        ));
        assert_eq!(broken.history(), before);
        assert_eq!(generator.prompts().len(), 1);
        assert_eq!(critic.call_count(), 1);
    }

    #[tokio::test]
    async fn test_draft_error_propagates() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Err("model overloaded")]));
        let critic = Arc::new(ScriptedCritic::always_unhappy());
        let uc = use_case(
            aspirin_passages(),
            generator,
            critic.clone(),
            AgentParams::default(),
        );

        let err = uc.execute(AnswerQuestionInput::new("q")).await.unwrap_err();

        assert!(matches!(err, AnswerQuestionError::Generation(_)));
        assert_eq!(critic.call_count(), 0);
        assert_eq!(uc.history_len(), 0);
    }

    #[tokio::test]
    async fn test_revision_error_keeps_previous_answer() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("A0"), Err("rate limited")]));
        let critic = Arc::new(ScriptedCritic::always_unhappy());
        let logger = Arc::new(RecordingLogger::default());
        let uc = use_case(
            aspirin_passages(),
            generator,
            critic.clone(),
            AgentParams::default().with_max_iterations(3),
        )
        .with_conversation_logger(logger.clone());

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(result.answer, "A0");
        assert_eq!(result.revisions, 0);
        assert_eq!(result.termination, Termination::RevisionFailed);
        // No critique after a failed revision
        assert_eq!(critic.call_count(), 1);
        assert_eq!(uc.history(), vec![Exchange::new("q", "A0")]);
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["retrieval", "draft", "critique", "revision_failed", "answer"]
        );
    }

    #[tokio::test]
    async fn test_later_revision_error_keeps_latest_revision() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("A0"),
            Ok("A1"),
            Err("rate limited"),
        ]));
        let critic = Arc::new(ScriptedCritic::always_unhappy());
        let uc = use_case(
            aspirin_passages(),
            generator.clone(),
            critic.clone(),
            AgentParams::default().with_max_iterations(3),
        );

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(result.answer, "A1");
        assert_eq!(result.revisions, 1);
        assert_eq!(result.critique_passes, 2);
        assert_eq!(result.termination, Termination::RevisionFailed);
        assert_eq!(*critic.calls.lock().unwrap(), vec!["A0", "A1"]);
        assert_eq!(generator.prompts().len(), 3);
        assert_eq!(uc.history(), vec![Exchange::new("q", "A1")]);
    }

    #[tokio::test]
    async fn test_degraded_critique_accepts_answer() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("A0")]));
        let critic = Arc::new(ScriptedCritic::new(vec![Critique::degraded()]));
        let uc = use_case(
            aspirin_passages(),
            generator,
            critic,
            AgentParams::default(),
        );

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(result.answer, "A0");
        assert_eq!(result.termination, Termination::CriticUnavailable);
    }

    #[tokio::test]
    async fn test_empty_question_rejected_before_retrieval() {
        let retriever = aspirin_passages();
        let uc = use_case(
            retriever.clone(),
            Arc::new(ScriptedGenerator::new(vec![])),
            Arc::new(ScriptedCritic::always_unhappy()),
            AgentParams::default(),
        );

        let err = uc.execute(AnswerQuestionInput::new("   ")).await.unwrap_err();

        assert!(err.is_invalid_input());
        assert_eq!(retriever.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_retrieval_still_answers() {
        let uc = use_case(
            Arc::new(ScriptedRetriever::returning(&[])),
            Arc::new(ScriptedGenerator::new(vec![Ok("I don't know.")])),
            Arc::new(ScriptedCritic::new(vec![Critique::approved()])),
            AgentParams::default(),
        );

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(result.source_count, 0);
        assert_eq!(result.context, "");
        assert_eq!(result.answer, "I don't know.");
    }

    // ==================== Default critic wiring ====================

    #[tokio::test]
    async fn test_default_critic_shares_generator() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("draft"),
            Ok("IMPROVE: add dosage"),
            Ok("revised"),
            Ok("GOOD"),
        ]));
        let uc = AnswerQuestionUseCase::new(
            aspirin_passages(),
            generator.clone(),
            AgentParams::default(),
        );

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(result.answer, "revised");
        assert_eq!(result.termination, Termination::Approved);
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[1].contains("Generated Answer: draft"));
        assert!(prompts[2].contains("IMPROVE: add dosage"));
    }

    // ==================== Conversation memory ====================

    #[tokio::test]
    async fn test_memory_bounded_by_capacity() {
        let responses = (0..6).map(|_| Ok("answer")).collect();
        let critiques = (0..6).map(|_| Critique::approved()).collect();
        let uc = use_case(
            aspirin_passages(),
            Arc::new(ScriptedGenerator::new(responses)),
            Arc::new(ScriptedCritic::new(critiques)),
            AgentParams::default(),
        );

        for i in 0..6 {
            uc.execute(AnswerQuestionInput::new(format!("question {i}")))
                .await
                .unwrap();
        }

        let history = uc.history();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].question, "question 1");
        assert_eq!(history[4].question, "question 5");
    }

    #[tokio::test]
    async fn test_prompt_uses_recent_window() {
        let responses = (0..5).map(|i| Ok(["a0", "a1", "a2", "a3", "a4"][i])).collect();
        let critiques = (0..5).map(|_| Critique::approved()).collect();
        let generator = Arc::new(ScriptedGenerator::new(responses));
        let uc = use_case(
            aspirin_passages(),
            generator.clone(),
            Arc::new(ScriptedCritic::new(critiques)),
            AgentParams::default(),
        );

        for i in 0..5 {
            uc.execute(AnswerQuestionInput::new(format!("q{i}")))
                .await
                .unwrap();
        }

        let prompts = generator.prompts();
        assert!(!prompts[0].contains("Previous Conversation"));
        let last = &prompts[4];
        assert!(!last.contains("Q: q0"));
        let q1 = last.find("Q: q1\nA: a1").unwrap();
        let q2 = last.find("Q: q2\nA: a2").unwrap();
        let q3 = last.find("Q: q3\nA: a3").unwrap();
        assert!(q1 < q2 && q2 < q3);
    }

    #[tokio::test]
    async fn test_clear_history_affects_next_run() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("a0"), Ok("a1")]));
        let logger = Arc::new(RecordingLogger::default());
        let uc = use_case(
            aspirin_passages(),
            generator.clone(),
            Arc::new(ScriptedCritic::new(vec![
                Critique::approved(),
                Critique::approved(),
            ])),
            AgentParams::default(),
        )
        .with_conversation_logger(logger.clone());

        uc.execute(AnswerQuestionInput::new("q0")).await.unwrap();
        uc.clear_history();
        assert_eq!(uc.history_len(), 0);

        uc.execute(AnswerQuestionInput::new("q1")).await.unwrap();
        assert!(!generator.prompts()[1].contains("Previous Conversation"));
        assert!(
            logger
                .events
                .lock()
                .unwrap()
                .contains(&"history_cleared")
        );
    }

    // ==================== Deadline & cancellation ====================

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_retrieval_is_fatal() {
        let uc = AnswerQuestionUseCase::new(
            Arc::new(SlowRetriever),
            Arc::new(ScriptedGenerator::new(vec![])),
            AgentParams::default().with_timeout(Some(Duration::from_secs(5))),
        );

        let err = uc.execute(AnswerQuestionInput::new("q")).await.unwrap_err();

        assert!(matches!(
            err,
            AnswerQuestionError::DeadlineExceeded {
                stage: Stage::Retrieving
            }
        ));
        assert_eq!(uc.history_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_critique_accepts_answer() {
        let uc = AnswerQuestionUseCase::new(
            aspirin_passages(),
            Arc::new(ScriptedGenerator::new(vec![Ok("A0")])),
            AgentParams::default().with_timeout(Some(Duration::from_secs(5))),
        )
        .with_critic(Arc::new(SlowCritic));

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(result.answer, "A0");
        assert_eq!(result.termination, Termination::CriticUnavailable);
        assert_eq!(uc.history_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_revision_keeps_draft() {
        let logger = Arc::new(RecordingLogger::default());
        let critic = Arc::new(ScriptedCritic::always_unhappy());
        let uc = AnswerQuestionUseCase::new(
            aspirin_passages(),
            Arc::new(StallingReviser::new()),
            AgentParams::default().with_timeout(Some(Duration::from_secs(5))),
        )
        .with_critic(critic.clone())
        .with_conversation_logger(logger.clone());

        let result = uc.execute(AnswerQuestionInput::new("q")).await.unwrap();

        assert_eq!(result.answer, "A0");
        assert_eq!(result.revisions, 0);
        assert_eq!(result.termination, Termination::RevisionFailed);
        assert_eq!(critic.call_count(), 1);
        assert_eq!(uc.history(), vec![Exchange::new("q", "A0")]);
        assert!(
            logger
                .events
                .lock()
                .unwrap()
                .contains(&"revision_failed")
        );
    }

    #[tokio::test]
    async fn test_cancel_during_revision_leaves_memory_untouched() {
        let token = CancellationToken::new();
        let critic = Arc::new(ScriptedCritic::always_unhappy());
        let uc = AnswerQuestionUseCase::new(
            aspirin_passages(),
            Arc::new(StallingReviser::cancelling(token.clone())),
            AgentParams::default(),
        )
        .with_critic(critic.clone());

        let err = uc
            .execute(AnswerQuestionInput::new("q").with_cancellation(token))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        // The draft was critiqued before the revision was interrupted
        assert_eq!(critic.call_count(), 1);
        assert_eq!(uc.history_len(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_run_leaves_memory_untouched() {
        let retriever = aspirin_passages();
        let progress = RecordingProgress::default();
        let uc = use_case(
            retriever,
            Arc::new(ScriptedGenerator::new(vec![Ok("A0")])),
            Arc::new(ScriptedCritic::new(vec![Critique::approved()])),
            AgentParams::default(),
        );
        let token = CancellationToken::new();
        token.cancel();

        let err = uc
            .execute_with_progress(
                AnswerQuestionInput::new("q").with_cancellation(token),
                &progress,
            )
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(uc.history_len(), 0);
        assert_eq!(*progress.finished.lock().unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_progress_sees_every_stage() {
        let progress = RecordingProgress::default();
        let uc = use_case(
            aspirin_passages(),
            Arc::new(ScriptedGenerator::new(vec![Ok("A0"), Ok("A1")])),
            Arc::new(ScriptedCritic::new(vec![
                Critique::needs_improvement("IMPROVE: more"),
                Critique::approved(),
            ])),
            AgentParams::default(),
        );

        uc.execute_with_progress(AnswerQuestionInput::new("q"), &progress)
            .await
            .unwrap();

        assert_eq!(
            *progress.stages.lock().unwrap(),
            vec![
                (Stage::Retrieving, 0),
                (Stage::Generating, 0),
                (Stage::Critiquing, 1),
                (Stage::Revising, 1),
                (Stage::Critiquing, 2),
                (Stage::Finalizing, 0),
            ]
        );
        assert_eq!(*progress.finished.lock().unwrap(), Some(true));
    }

    // ==================== Concurrency ====================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_runs_keep_memory_bounded() {
        const RUNS: usize = 64;
        let responses = (0..RUNS).map(|_| Ok("answer")).collect();
        let critiques = (0..RUNS).map(|_| Critique::approved()).collect();
        let uc = Arc::new(use_case(
            aspirin_passages(),
            Arc::new(ScriptedGenerator::new(responses)),
            Arc::new(ScriptedCritic::new(critiques)),
            AgentParams::default(),
        ));
        let capacity = uc.params().history_capacity;

        let handles: Vec<_> = (0..RUNS)
            .map(|i| {
                let uc = uc.clone();
                tokio::spawn(async move {
                    if i % 8 == 0 {
                        uc.clear_history();
                    }
                    let result = uc
                        .execute(AnswerQuestionInput::new(format!("question {i}")))
                        .await;
                    assert!(uc.history_len() <= capacity);
                    result
                })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.termination, Termination::Approved);
        }

        // Each clear precedes its own run's append, so the last write is an append
        let history = uc.history();
        assert!(!history.is_empty());
        assert!(history.len() <= capacity);
        for exchange in history {
            assert!(exchange.question.starts_with("question "));
            assert_eq!(exchange.answer, "answer");
        }
    }
}
