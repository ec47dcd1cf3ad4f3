//! Python bindings for the intent engine using PyO3

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::error::ChatbotError;
use crate::service::ChatbotService;
use crate::similarity::{edit_distance, similarity};
use crate::types::Query;

fn to_py_err(err: ChatbotError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_json(json: &str) -> PyResult<serde_json::Value> {
    serde_json::from_str(json)
        .map_err(|e| PyValueError::new_err(format!("Failed to parse intent data: {}", e)))
}

/// Normalized similarity between two tokens (Python function)
#[pyfunction]
pub fn py_similarity(a: &str, b: &str) -> f64 {
    similarity(a, b)
}

/// Edit distance between two tokens (Python function)
#[pyfunction]
pub fn py_edit_distance(a: &str, b: &str) -> usize {
    edit_distance(a, b)
}

/// Python wrapper for the chatbot service
#[pyclass]
pub struct PyChatbot {
    service: ChatbotService,
}

#[pymethods]
impl PyChatbot {
    /// Create a chatbot, optionally loading a JSON intent catalog
    #[new]
    #[pyo3(signature = (catalog_json=None))]
    fn new(catalog_json: Option<&str>) -> PyResult<Self> {
        let mut builder = ChatbotService::builder();
        if let Some(json) = catalog_json {
            builder = builder.catalog(parse_json(json)?);
        }
        let service = builder.build().map_err(to_py_err)?;
        Ok(Self { service })
    }

    /// Replace the intent catalog
    fn reload(&self, catalog_json: &str) -> PyResult<()> {
        self.service
            .reload_catalog(&parse_json(catalog_json)?)
            .map_err(to_py_err)
    }

    /// Answer a query; returns `{"answer", "intent", "error"}`
    #[pyo3(signature = (query=None))]
    fn generate_response<'py>(
        &self,
        py: Python<'py>,
        query: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let text: Option<String> = query.and_then(|q| q.extract().ok());
        let type_name = match query {
            Some(q) if !q.is_none() && text.is_none() => Some(q.get_type().name()?.to_string()),
            _ => None,
        };

        let query = match (&text, &type_name) {
            (Some(text), _) => Query::Text(text),
            (None, Some(type_name)) => Query::NonText(type_name),
            (None, None) => Query::Absent,
        };

        let result = self.service.generate_response(query);

        let dict = PyDict::new_bound(py);
        dict.set_item("answer", result.answer)?;
        dict.set_item("intent", result.intent)?;
        dict.set_item("error", result.error.map(|kind| kind.as_str()))?;
        Ok(dict)
    }

    /// Label of the best matching intent, or None
    fn find_matching_intent(&self, query: &str) -> PyResult<Option<String>> {
        let intent = self
            .service
            .find_matching_intent(query)
            .map_err(to_py_err)?;
        Ok(intent.map(|intent| intent.label.clone()))
    }

    /// Number of loaded intents
    fn __len__(&self) -> usize {
        self.service.intent_count()
    }
}
