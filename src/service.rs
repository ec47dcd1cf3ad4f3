//! Chatbot service - the facade front ends talk to
//!
//! `generate_response` never fails: every internal error is logged, counted and
//! turned into a [`ResponseResult`] carrying a user-safe answer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use serde_json::Value;

use crate::catalog::CatalogLoader;
use crate::config::ChatbotConfig;
use crate::error::{ChatbotError, Result};
use crate::history::{ChatHistory, ChatMessage, InMemoryChatHistory};
use crate::resolver::IntentResolver;
use crate::scorer::{DomainVocabulary, PatternScorer};
use crate::types::{ErrorKind, Intent, Query, ResponseResult};

/// Logging collaborator receiving every internal failure
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, context: &str, error: &ChatbotError);
}

/// Default logger forwarding to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn log_error(&self, context: &str, error: &ChatbotError) {
        tracing::error!(kind = error.kind(), %error, "{context}");
    }
}

/// Metrics collaborator
pub trait Metrics: Send + Sync {
    fn record_response_time(&self, duration: Duration);
    /// `None` when the query produced no match
    fn record_intent_match(&self, label: Option<&str>);
    fn record_error(&self, kind: &str, message: &str);
}

/// Builder for [`ChatbotService`]; every collaborator is optional
#[derive(Default)]
pub struct ChatbotServiceBuilder {
    catalog: Option<Value>,
    config: Option<ChatbotConfig>,
    logger: Option<Arc<dyn ErrorLogger>>,
    metrics: Option<Arc<dyn Metrics>>,
    history: Option<Arc<dyn ChatHistory>>,
    in_memory_history: bool,
    rng: Option<Box<dyn RngCore + Send>>,
}

impl ChatbotServiceBuilder {
    pub fn catalog(mut self, raw: Value) -> Self {
        self.catalog = Some(raw);
        self
    }

    pub fn config(mut self, config: ChatbotConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn history(mut self, history: Arc<dyn ChatHistory>) -> Self {
        self.history = Some(history);
        self
    }

    /// Keep an in-process transcript bounded by `max_history_entries`
    pub fn in_memory_history(mut self) -> Self {
        self.in_memory_history = true;
        self
    }

    /// Randomness source for response selection
    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Build the service, loading the catalog when one was supplied.
    ///
    /// Catalog load failures are fatal and returned to the caller.
    pub fn build(self) -> Result<ChatbotService> {
        let config = self.config.unwrap_or_default();
        let vocabulary = DomainVocabulary::new(config.domain_keywords.as_slice())?;

        let history = match self.history {
            Some(history) => Some(history),
            None if self.in_memory_history => Some(Arc::new(InMemoryChatHistory::new(
                config.max_history_entries,
            )) as Arc<dyn ChatHistory>),
            None => None,
        };

        let service = ChatbotService {
            resolver: IntentResolver::new(PatternScorer::new(vocabulary)),
            logger: self.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
            metrics: self.metrics,
            history,
            rng: Mutex::new(self.rng.unwrap_or_else(|| Box::new(StdRng::from_entropy()))),
            config,
        };

        if let Some(raw) = self.catalog {
            service.reload_catalog(&raw)?;
        }

        Ok(service)
    }
}

/// Intent engine facade
pub struct ChatbotService {
    resolver: IntentResolver,
    config: ChatbotConfig,
    logger: Arc<dyn ErrorLogger>,
    metrics: Option<Arc<dyn Metrics>>,
    history: Option<Arc<dyn ChatHistory>>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ChatbotService {
    pub fn builder() -> ChatbotServiceBuilder {
        ChatbotServiceBuilder::default()
    }

    /// Validate `raw` and atomically replace the installed catalog.
    ///
    /// On failure the previous catalog stays installed.
    pub fn reload_catalog(&self, raw: &Value) -> Result<()> {
        let loader = CatalogLoader::new(self.logger.as_ref(), self.metrics.as_deref());
        let catalog = loader.load(Some(raw))?;
        self.resolver.install(catalog);
        Ok(())
    }

    /// Number of intents in the installed catalog
    pub fn intent_count(&self) -> usize {
        self.resolver.snapshot().map_or(0, |catalog| catalog.len())
    }

    /// Transcript recorded by [`chat`](Self::chat), oldest first
    pub fn history(&self) -> Result<Vec<ChatMessage>> {
        match &self.history {
            Some(history) => history.messages(),
            None => Ok(Vec::new()),
        }
    }

    pub fn config(&self) -> &ChatbotConfig {
        &self.config
    }

    /// Best intent for `query`, or `None` when nothing clears the threshold
    pub fn find_matching_intent<'q>(
        &self,
        query: impl Into<Query<'q>>,
    ) -> Result<Option<Arc<Intent>>> {
        let result = self.resolver.resolve(query.into())?;
        Ok(result.intent)
    }

    /// Answer a query. Never fails; errors are reported through `error`.
    pub fn generate_response<'q>(&self, query: impl Into<Query<'q>>) -> ResponseResult {
        let started = Instant::now();
        let result = self.respond(query.into());

        if let Some(metrics) = &self.metrics {
            metrics.record_response_time(started.elapsed());
        }

        result
    }

    /// Answer a query and record both sides of the exchange in the history
    pub fn chat(&self, query: &str) -> ResponseResult {
        self.remember(ChatMessage::user(query));
        let result = self.generate_response(query);
        self.remember(ChatMessage::bot(&result.answer, result.intent.clone()));
        result
    }

    fn respond(&self, query: Query<'_>) -> ResponseResult {
        if let Query::NonText(type_name) = query {
            let err = ChatbotError::IntentMatch(format!(
                "Query must be a string, received {type_name}"
            ));
            self.report("Invalid query type", &err);
            return self.failure(ErrorKind::InternalError);
        }

        if query.is_blank() {
            return ResponseResult::failed(&self.config.empty_query_reply, ErrorKind::EmptyQuery);
        }

        let matched = match self.resolver.resolve(query) {
            Ok(matched) => matched,
            Err(err) => {
                let err = err.into_match_error();
                self.report("Error finding matching intent", &err);
                return self.failure(ErrorKind::IntentMatchError);
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_intent_match(matched.label());
        }

        let Some(intent) = matched.intent else {
            return ResponseResult::failed(&self.config.no_match_reply, ErrorKind::NoMatch);
        };

        match self.select_response(&intent) {
            Ok(answer) => ResponseResult::answered(answer, intent.label.as_str()),
            Err(err) => {
                self.report("Error generating response", &err);
                self.failure(ErrorKind::InternalError)
            }
        }
    }

    fn select_response(&self, intent: &Intent) -> Result<String> {
        let responses = intent.valid_responses();
        let mut rng = self.rng.lock();
        responses
            .choose(&mut **rng)
            .map(|answer| answer.to_string())
            .ok_or_else(|| {
                ChatbotError::ResponseGeneration(format!(
                    "Intent {} has no valid responses",
                    intent.label
                ))
            })
    }

    fn failure(&self, kind: ErrorKind) -> ResponseResult {
        ResponseResult::failed(&self.config.internal_error_reply, kind)
    }

    fn report(&self, context: &str, err: &ChatbotError) {
        self.logger.log_error(context, err);
        if let Some(metrics) = &self.metrics {
            metrics.record_error(err.kind(), &err.to_string());
        }
    }

    fn remember(&self, message: ChatMessage) {
        if let Some(history) = &self.history {
            if let Err(err) = history.append(message) {
                self.report("Error saving chat history", &err);
            }
        }
    }
}
