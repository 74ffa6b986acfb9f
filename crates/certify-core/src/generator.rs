//! Test generation: one LLM attempt, then the static bank.
//!
//! There is no retry policy. Any generation failure is recorded as a notice
//! and the test is drawn from the fallback bank instead.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GenerationError, ProviderError, QuizError};
use crate::model::{QuestionBank, QuestionRecord};
use crate::prompt::{build_generation_prompt, parse_generated_questions};
use crate::selection::{select, SelectionMode};
use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider, TokenUsage};

/// Configuration for the test generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Max tokens for generation.
    pub max_tokens: u32,
    /// Upper bound on the single provider call.
    pub timeout: Duration,
    /// How fallback questions are picked.
    pub selection_mode: SelectionMode,
    /// Seed for fallback sampling; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
    /// Draw from the bank without attempting live generation.
    pub offline: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            max_tokens: 8192,
            timeout: Duration::from_secs(60),
            selection_mode: SelectionMode::RandomSample,
            seed: None,
            system_prompt_override: None,
            offline: false,
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Desired number of questions.
    pub count: usize,
    /// Topic filter.
    pub topics: Vec<String>,
    /// Optional pasted syllabus.
    #[serde(default)]
    pub syllabus: Option<String>,
}

/// Where the questions of a test came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionSource {
    Ai { model: String },
    FallbackBank { bank: String },
}

impl fmt::Display for QuestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionSource::Ai { model } => write!(f, "live AI ({model})"),
            QuestionSource::FallbackBank { bank } => write!(f, "question bank '{bank}'"),
        }
    }
}

/// A recovered condition that the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Notice {
    /// Live generation failed; the fallback bank was used.
    GenerationFailure(String),
    /// The topic filter matched no question.
    EmptySelection,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::GenerationFailure(reason) => write!(
                f,
                "The live AI is unavailable ({reason}). Here is a practice test from the local question bank instead."
            ),
            Notice::EmptySelection => write!(
                f,
                "No questions match the selected topics. Try broadening the topic filter."
            ),
        }
    }
}

/// A finalized test ready to be turned into a session.
#[derive(Debug, Clone)]
pub struct GeneratedTest {
    pub questions: Vec<QuestionRecord>,
    pub source: QuestionSource,
    pub notices: Vec<Notice>,
    /// Every topic of the bank the test was generated against, in order.
    pub topic_universe: Vec<String>,
    /// Token accounting of the live call, when one succeeded.
    pub usage: Option<TokenUsage>,
}

/// Generates tests from an optional LLM provider and a fallback bank.
pub struct TestGenerator {
    provider: Option<Arc<dyn LlmProvider>>,
    bank: QuestionBank,
    config: GeneratorConfig,
}

impl TestGenerator {
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        bank: QuestionBank,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            provider,
            bank,
            config,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Produce a test for `spec`.
    ///
    /// # Errors
    /// Only [`QuizError::InvalidCount`]; generation failures and empty
    /// selections are recovered and reported as notices.
    pub async fn generate(&self, spec: &TestSpec) -> Result<GeneratedTest, QuizError> {
        if spec.count == 0 {
            return Err(QuizError::InvalidCount);
        }

        let mut notices = Vec::new();
        if self.config.offline {
            info!("offline mode, skipping live generation");
        } else {
            let failure = match self.generate_with_ai(spec).await {
                Ok((questions, response)) => {
                    let model = response.model;
                    info!(count = questions.len(), %model, "test generated by live AI");
                    if questions.len() != spec.count {
                        warn!(
                            "requested {} questions, model returned {}",
                            spec.count,
                            questions.len()
                        );
                    }
                    return Ok(GeneratedTest {
                        questions,
                        source: QuestionSource::Ai { model },
                        notices,
                        topic_universe: self.bank.topics(),
                        usage: Some(response.token_usage),
                    });
                }
                Err(e) => e,
            };

            warn!("live generation failed, using fallback bank: {failure}");
            notices.push(Notice::GenerationFailure(failure.to_string()));
        }

        let questions = self.select_fallback(spec)?;
        if questions.is_empty() {
            notices.push(Notice::EmptySelection);
        }
        info!(count = questions.len(), bank = %self.bank.id, "test drawn from fallback bank");

        Ok(GeneratedTest {
            questions,
            source: QuestionSource::FallbackBank {
                bank: self.bank.name.clone(),
            },
            notices,
            topic_universe: self.bank.topics(),
            usage: None,
        })
    }

    async fn generate_with_ai(
        &self,
        spec: &TestSpec,
    ) -> Result<(Vec<QuestionRecord>, GenerateResponse), GenerationError> {
        let provider = self.provider.as_ref().ok_or(GenerationError::NoProvider)?;

        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_generation_prompt(spec.count, &spec.topics, spec.syllabus.as_deref()),
            system_prompt: self.config.system_prompt_override.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = tokio::time::timeout(self.config.timeout, provider.generate(&request))
            .await
            .map_err(|_| GenerationError::Timeout(self.config.timeout))?
            .map_err(|e| {
                let message = format!("{e:#}");
                match e.downcast_ref::<ProviderError>() {
                    Some(p) if p.is_permanent() => GenerationError::Rejected(message),
                    _ => GenerationError::Provider(message),
                }
            })?;

        let usage = &response.token_usage;
        info!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            cost_usd = usage.estimated_cost_usd,
            latency_ms = response.latency_ms,
            "provider responded"
        );

        let questions = parse_generated_questions(&response.content)?;
        Ok((questions, response))
    }

    fn select_fallback(&self, spec: &TestSpec) -> Result<Vec<QuestionRecord>, QuizError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        select(
            &self.bank.questions,
            &spec.topics,
            spec.count,
            self.config.selection_mode,
            &mut rng,
        )
    }
}
