//! Intent core - pattern-catalog intent resolution
//!
//! Ranks the intents of a fixed catalog against free-text queries by textual
//! similarity and answers with a reply from the best match, or a fallback when
//! nothing clears the acceptance threshold.

pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod resolver;
pub mod scorer;
pub mod service;
pub mod similarity;
pub mod types;

pub use catalog::CatalogLoader;
pub use config::ChatbotConfig;
pub use error::{ChatbotError, Result};
pub use history::{ChatHistory, ChatMessage, InMemoryChatHistory, JsonFileChatHistory, Sender};
pub use resolver::{resolve, IntentResolver, ACCEPTANCE_THRESHOLD};
pub use scorer::{DomainVocabulary, PatternScore, PatternScorer};
pub use service::{ChatbotService, ChatbotServiceBuilder, ErrorLogger, Metrics, TracingLogger};
pub use similarity::{edit_distance, similarity};
pub use types::*;

// Python bindings
#[cfg(feature = "python")]
pub mod py;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn intent_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyChatbot>()?;
    m.add_function(wrap_pyfunction!(py_similarity, m)?)?;
    m.add_function(wrap_pyfunction!(py_edit_distance, m)?)?;
    Ok(())
}
