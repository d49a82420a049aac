//! Python bindings for PageFetch
//!
//! Results are returned as plain dicts with `title`, `metadata`, and
//! `output` keys. Every fetch failure raises `ValueError`.

// Allow false positive clippy warning from pyo3 macro expansion
#![allow(clippy::useless_conversion)]

use pagefetch::{
    timeout_from_signed, ConverterKind, FetchError, FetchRequest, FetchResult, OutputFormat, Tool,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Convert FetchError to PyErr
fn to_py_err(e: FetchError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn to_py_dict<'py>(py: Python<'py>, result: FetchResult) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("title", result.title)?;
    // Always empty; kept as a dict so callers can rely on the key
    dict.set_item("metadata", PyDict::new_bound(py))?;
    dict.set_item("output", result.output)?;
    Ok(dict)
}

/// Timeouts are taken as `i64` so a negative value raises `ValueError`
/// instead of pyo3's `OverflowError`
fn build_request(url: String, format: &str, timeout: Option<i64>) -> PyResult<FetchRequest> {
    let format: OutputFormat = format.parse().map_err(to_py_err)?;
    let mut request = FetchRequest::new(url).format(format);
    if let Some(secs) = timeout_from_signed(timeout).map_err(to_py_err)? {
        request = request.timeout(secs);
    }
    Ok(request)
}

/// Python wrapper for the fetch tool
#[pyclass(name = "WebFetchTool")]
pub struct PyWebFetchTool {
    inner: Tool,
    runtime: tokio::runtime::Runtime,
}

#[pymethods]
impl PyWebFetchTool {
    /// Create a new tool
    #[new]
    #[pyo3(signature = (user_agent=None, max_response_size=None, pattern_only=false))]
    fn new(
        user_agent: Option<String>,
        max_response_size: Option<u64>,
        pattern_only: bool,
    ) -> PyResult<Self> {
        let mut builder = Tool::builder();

        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua);
        }

        if let Some(bytes) = max_response_size {
            builder = builder.max_response_size(bytes);
        }

        if pattern_only {
            builder = builder.converter(ConverterKind::Pattern);
        }

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| PyValueError::new_err(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            inner: builder.build(),
            runtime,
        })
    }

    /// Get tool description
    fn description(&self) -> &'static str {
        self.inner.description()
    }

    /// Get full documentation (llmtxt)
    fn llmtxt(&self) -> &'static str {
        self.inner.llmtxt()
    }

    /// Get input schema as JSON string
    fn input_schema(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.input_schema())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Get output schema as JSON string
    fn output_schema(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.output_schema())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Fetch a URL as "text", "markdown", or "html"
    #[pyo3(signature = (url, format, timeout=None))]
    fn fetch<'py>(
        &self,
        py: Python<'py>,
        url: String,
        format: &str,
        timeout: Option<i64>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let request = build_request(url, format, timeout)?;
        let result = self
            .runtime
            .block_on(self.inner.execute(request))
            .map_err(to_py_err)?;
        to_py_dict(py, result)
    }

    fn __repr__(&self) -> String {
        "WebFetchTool()".to_string()
    }
}

/// Fetch a URL using default options (convenience function)
#[pyfunction]
#[pyo3(signature = (url, format, timeout=None))]
fn fetch<'py>(
    py: Python<'py>,
    url: String,
    format: &str,
    timeout: Option<i64>,
) -> PyResult<Bound<'py, PyDict>> {
    let tool = PyWebFetchTool::new(None, None, false)?;
    tool.fetch(py, url, format, timeout)
}

/// Python module definition
#[pymodule]
fn pagefetch_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyWebFetchTool>()?;
    m.add_function(wrap_pyfunction!(fetch, m)?)?;
    Ok(())
}
