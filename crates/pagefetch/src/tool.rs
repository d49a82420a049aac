//! Tool builder and contract for PageFetch

use crate::client::{fetch_page, fetch_with_options, resolve_timeout, FetchOptions};
use crate::convert::ConverterKind;
use crate::error::FetchError;
use crate::negotiate::candidate_urls;
use crate::types::{FetchRequest, FetchResult};
use crate::{MAX_RESPONSE_SIZE, TOOL_DESCRIPTION, TOOL_LLMTXT};
use schemars::schema_for;
use serde::{Deserialize, Serialize};

/// Status update during tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    /// Current phase: "validate", "fetch", "convert", or "complete"
    pub phase: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Estimated completion percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f32>,
}

impl ToolStatus {
    /// Create a new status with phase
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            message: None,
            percent_complete: None,
        }
    }

    /// Set message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set completion percentage
    pub fn with_percent(mut self, percent: f32) -> Self {
        self.percent_complete = Some(percent);
        self
    }
}

/// Builder for configuring the fetch tool
#[derive(Debug, Clone)]
pub struct ToolBuilder {
    user_agent: Option<String>,
    max_response_size: u64,
    converter: ConverterKind,
}

impl Default for ToolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolBuilder {
    /// Create a builder with the default cap and conversion tier
    pub fn new() -> Self {
        Self {
            user_agent: None,
            max_response_size: MAX_RESPONSE_SIZE,
            converter: ConverterKind::default(),
        }
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the body size cap in bytes
    pub fn max_response_size(mut self, bytes: u64) -> Self {
        self.max_response_size = bytes;
        self
    }

    /// Select the conversion tier
    pub fn converter(mut self, converter: ConverterKind) -> Self {
        self.converter = converter;
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        Tool {
            options: FetchOptions {
                user_agent: self.user_agent,
                max_response_size: self.max_response_size,
                converter: self.converter,
            },
        }
    }
}

/// Configured fetch tool
#[derive(Debug, Clone)]
pub struct Tool {
    options: FetchOptions,
}

impl Default for Tool {
    fn default() -> Self {
        ToolBuilder::new().build()
    }
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get system prompt (empty for this tool)
    pub fn system_prompt(&self) -> &'static str {
        ""
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(FetchRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(FetchResult);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Execute the tool with the given request
    pub async fn execute(&self, req: FetchRequest) -> Result<FetchResult, FetchError> {
        fetch_with_options(req, self.options.clone()).await
    }

    /// Execute the tool with status updates
    pub async fn execute_with_status<F>(
        &self,
        req: FetchRequest,
        mut status_callback: F,
    ) -> Result<FetchResult, FetchError>
    where
        F: FnMut(ToolStatus),
    {
        status_callback(ToolStatus::new("validate").with_percent(0.0));

        candidate_urls(&req.url)?;
        resolve_timeout(req.timeout)?;

        status_callback(ToolStatus::new("fetch").with_percent(10.0));

        let page = fetch_page(&req.url, req.timeout, &self.options).await?;

        status_callback(
            ToolStatus::new("convert")
                .with_message(format!("Converting {} to {}", page.content_type, req.format))
                .with_percent(90.0),
        );

        let result = page.into_result(req.format, self.options.converter);

        status_callback(ToolStatus::new("complete").with_percent(100.0));

        Ok(result)
    }
}
