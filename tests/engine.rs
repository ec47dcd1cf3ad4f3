use std::sync::Arc;
use std::time::Duration;

use intent_core::{
    ChatbotConfig, ChatbotError, ChatbotService, ErrorKind, ErrorLogger, JsonFileChatHistory,
    Metrics, Query, Sender,
};
use parking_lot::Mutex;
use rand::rngs::mock::StepRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

const SAMPLE_CATALOG: &str = include_str!("../data/intents.json");

fn sample_catalog() -> Value {
    serde_json::from_str(SAMPLE_CATALOG).unwrap()
}

fn sample_service() -> ChatbotService {
    ChatbotService::builder()
        .catalog(sample_catalog())
        .rng(StepRng::new(0, 0))
        .build()
        .unwrap()
}

#[derive(Default)]
struct RecordingMetrics {
    response_times: Mutex<Vec<Duration>>,
    matches: Mutex<Vec<Option<String>>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl Metrics for RecordingMetrics {
    fn record_response_time(&self, duration: Duration) {
        self.response_times.lock().push(duration);
    }

    fn record_intent_match(&self, label: Option<&str>) {
        self.matches.lock().push(label.map(str::to_string));
    }

    fn record_error(&self, kind: &str, message: &str) {
        self.errors.lock().push((kind.to_string(), message.to_string()));
    }
}

#[derive(Default)]
struct RecordingLogger {
    entries: Mutex<Vec<(String, ChatbotError)>>,
}

impl ErrorLogger for RecordingLogger {
    fn log_error(&self, context: &str, error: &ChatbotError) {
        self.entries.lock().push((context.to_string(), error.clone()));
    }
}

#[test_log::test]
fn test_exact_pattern_answers_with_first_response() {
    let service = sample_service();
    let result = service.generate_response("What to do if Cuts?");

    let catalog = sample_catalog();
    let first = catalog["intents"][0]["responses"][0].as_str().unwrap();
    assert_eq!(result.answer, first);
    assert_eq!(result.intent.as_deref(), Some("Cuts"));
    assert_eq!(result.error, None);
}

#[test]
fn test_case_variation_matches_same_intent() {
    let service = sample_service();
    let intent = service.find_matching_intent("how to cure CUTS?").unwrap().unwrap();
    assert_eq!(intent.label, "Cuts");
}

#[test]
fn test_fuzzy_queries_resolve() {
    let service = sample_service();
    let label = |query: &str| {
        service
            .find_matching_intent(query)
            .unwrap()
            .map(|intent| intent.label.clone())
    };

    assert_eq!(label("what should i do for a headache").as_deref(), Some("Headache"));
    assert_eq!(label("i have a fever").as_deref(), Some("Fever"));
    assert_eq!(label("hello there"), None);
}

#[test]
fn test_unrelated_query_gets_fallback() {
    let service = sample_service();
    let result = service.generate_response("something completely unrelated");
    assert_eq!(result.answer, ChatbotConfig::default().no_match_reply);
    assert_eq!(result.intent, None);
    assert_eq!(result.error, Some(ErrorKind::NoMatch));

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["error"], json!("NO_MATCH"));
    assert_eq!(value["intent"], Value::Null);
}

#[test]
fn test_empty_query_skips_scoring() {
    let metrics = Arc::new(RecordingMetrics::default());
    let service = ChatbotService::builder()
        .catalog(sample_catalog())
        .metrics(metrics.clone())
        .build()
        .unwrap();

    for query in [Query::Absent, Query::Text(""), Query::Text("   ")] {
        let result = service.generate_response(query);
        assert_eq!(result.intent, None);
        assert_eq!(result.error, Some(ErrorKind::EmptyQuery));
        assert_eq!(result.answer, service.config().empty_query_reply);
    }

    assert!(metrics.matches.lock().is_empty());
    assert_eq!(metrics.response_times.lock().len(), 3);
}

#[test]
fn test_metrics_record_matches_and_latency() {
    let metrics = Arc::new(RecordingMetrics::default());
    let service = ChatbotService::builder()
        .catalog(sample_catalog())
        .metrics(metrics.clone())
        .build()
        .unwrap();

    service.generate_response("fever");
    service.generate_response("hello there");

    assert_eq!(
        *metrics.matches.lock(),
        vec![Some("Fever".to_string()), None]
    );
    assert_eq!(metrics.response_times.lock().len(), 2);
    assert!(metrics.errors.lock().is_empty());
}

#[test]
fn test_blank_responses_are_internal_error() {
    let logger = Arc::new(RecordingLogger::default());
    let metrics = Arc::new(RecordingMetrics::default());
    let service = ChatbotService::builder()
        .catalog(json!({ "intents": [
            { "tag": "Burns", "patterns": ["how to treat burns"], "responses": ["", " "] }
        ] }))
        .logger(logger.clone())
        .metrics(metrics.clone())
        .build()
        .unwrap();

    let result = service.generate_response("how to treat burns");
    assert_eq!(result.error, Some(ErrorKind::InternalError));
    assert_eq!(result.intent, None);
    assert_eq!(result.answer, service.config().internal_error_reply);

    let entries = logger.entries.lock();
    assert_eq!(entries.len(), 1);
    assert!(matches!(entries[0].1, ChatbotError::ResponseGeneration(_)));
    assert_eq!(metrics.errors.lock()[0].0, "RESPONSE_GENERATION_ERROR");
}

#[test]
fn test_non_text_query_is_internal_error() {
    let service = sample_service();
    let query = json!(["cuts"]);
    let result = service.generate_response(&query);
    assert_eq!(result.error, Some(ErrorKind::InternalError));

    let err = service.find_matching_intent(&query).unwrap_err();
    assert_eq!(err.to_string(), "Query must be a string");
}

#[test]
fn test_load_failure_is_reported_and_fatal() {
    let logger = Arc::new(RecordingLogger::default());
    let metrics = Arc::new(RecordingMetrics::default());
    let err = ChatbotService::builder()
        .catalog(json!({ "data": [] }))
        .logger(logger.clone())
        .metrics(metrics.clone())
        .build()
        .err()
        .unwrap();

    assert_eq!(
        err,
        ChatbotError::IntentLoad(
            "Invalid intent data structure: missing intents property".to_string()
        )
    );
    assert_eq!(logger.entries.lock()[0].0, "Error loading intents");
    assert_eq!(
        metrics.errors.lock()[0],
        (
            "INTENT_LOAD_ERROR".to_string(),
            "Invalid intent data structure: missing intents property".to_string()
        )
    );
}

#[test]
fn test_seeded_rng_is_reproducible() {
    let answers = |seed: u64| {
        let service = ChatbotService::builder()
            .catalog(sample_catalog())
            .rng(ChaCha8Rng::seed_from_u64(seed))
            .build()
            .unwrap();
        (0..8)
            .map(|_| service.generate_response("cuts").answer)
            .collect::<Vec<_>>()
    };

    let first = answers(42);
    assert_eq!(first, answers(42));

    let catalog = sample_catalog();
    let responses: Vec<&str> = catalog["intents"][0]["responses"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(first.iter().all(|answer| responses.contains(&answer.as_str())));
}

#[test]
fn test_reload_replaces_catalog() {
    let service = sample_service();
    assert_eq!(service.intent_count(), 3);

    service
        .reload_catalog(&json!({ "intents": [
            { "tag": "Sprain", "patterns": ["twisted ankle"], "responses": ["Rest, ice, compress, elevate."] }
        ] }))
        .unwrap();

    assert_eq!(service.intent_count(), 1);
    assert_eq!(service.generate_response("twisted ankle").intent.as_deref(), Some("Sprain"));
    assert_eq!(service.generate_response("cuts").error, Some(ErrorKind::NoMatch));
}

#[test]
fn test_concurrent_readers_share_catalog() {
    let service = Arc::new(sample_service());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                (0..20)
                    .map(|_| service.generate_response("i have a fever").intent)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let labels = handle.join().unwrap();
        assert!(labels.iter().all(|label| label.as_deref() == Some("Fever")));
    }
}

#[test]
fn test_chat_records_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let history = Arc::new(JsonFileChatHistory::new(dir.path().join("history.json"), 50));
    let service = ChatbotService::builder()
        .catalog(sample_catalog())
        .history(history)
        .build()
        .unwrap();

    service.chat("headache");
    service.chat("hello there");

    let messages = service.history().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "headache");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].intent.as_deref(), Some("Headache"));
    assert_eq!(messages[3].intent, None);
}

#[test]
fn test_in_memory_history_respects_config_bound() {
    let config = ChatbotConfig {
        max_history_entries: 3,
        ..ChatbotConfig::default()
    };
    let service = ChatbotService::builder()
        .catalog(sample_catalog())
        .config(config)
        .in_memory_history()
        .build()
        .unwrap();

    service.chat("cuts");
    service.chat("fever");

    let messages = service.history().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].sender, Sender::Bot);
    assert_eq!(messages[2].intent.as_deref(), Some("Fever"));
}
