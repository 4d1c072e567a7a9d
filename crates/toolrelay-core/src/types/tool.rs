//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::{ChatMessage, MessageRole};

/// A tool as advertised by the tool host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name, unique within a catalog
    pub name: String,
    /// Human-readable description (hosts may omit it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the input parameters, kept verbatim
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolSpec {
    /// Create a new tool spec
    pub fn new(name: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The function descriptor the LLM sees for this tool
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            parameters: self.input_schema.clone(),
        }
    }
}

/// LLM-facing function descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Function name
    pub name: String,
    /// Description; empty when the host provided none
    pub description: String,
    /// Parameter schema, the host's input schema verbatim
    pub parameters: Value,
}

/// Tool call requested by the LLM
///
/// `arguments` is the raw payload exactly as the model produced it; it is
/// only parsed right before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique identifier correlating the request with its result
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Raw JSON argument payload
    pub arguments: String,
}

impl ToolCallRequest {
    /// Create a new tool call request
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the raw payload into an argument object
    pub fn parse_arguments(&self) -> Result<Map<String, Value>, String> {
        match serde_json::from_str::<Value>(&self.arguments) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
            Err(e) => Err(e.to_string()),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One content item returned by a tool host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Textual content
    Text { text: String },
    /// Any non-text content (images, audio, resources, ...)
    Other { kind: String },
}

impl ToolContent {
    /// Create a text content item
    pub fn text(text: impl Into<String>) -> Self {
        ToolContent::Text { text: text.into() }
    }

    /// Get the text if this is a text item
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolContent::Text { text } => Some(text),
            ToolContent::Other { .. } => None,
        }
    }
}

/// Raw outcome of a tool invocation on the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the host reported a failure
    #[serde(rename = "isError", default)]
    pub is_error: bool,
    /// Ordered content items
    #[serde(default)]
    pub content: Vec<ToolContent>,
}

impl ToolOutput {
    /// Successful output with the given items
    pub fn success(content: Vec<ToolContent>) -> Self {
        Self {
            is_error: false,
            content,
        }
    }

    /// Host-reported failure
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![ToolContent::text(message)],
        }
    }

    /// Text items in order; other content kinds are dropped
    pub fn texts(&self) -> Vec<String> {
        self.content
            .iter()
            .filter_map(|c| c.as_text().map(str::to_string))
            .collect()
    }
}

/// Result of one executed tool call, ready to be folded into the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// ID of the tool call this is responding to
    pub call_id: String,
    /// Name of the tool that ran
    pub tool_name: String,
    /// Parsed arguments the tool ran with
    pub arguments: Map<String, Value>,
    /// Textual output items in order
    pub texts: Vec<String>,
}

impl ToolResult {
    /// Create a tool result
    pub fn new(
        call: &ToolCallRequest,
        arguments: Map<String, Value>,
        texts: Vec<String>,
    ) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            arguments,
            texts,
        }
    }

    /// Message content: the arguments echoed back with the texts under the tool name
    ///
    /// When an argument shares the tool's name, the result list replaces it.
    pub fn content(&self) -> String {
        let mut body = self.arguments.clone();
        body.insert(
            self.tool_name.clone(),
            Value::Array(self.texts.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(body).to_string()
    }

    /// Convert into the tool-role message answering the call
    pub fn into_message(self) -> ChatMessage {
        let content = self.content();
        ChatMessage::tool(self.call_id, self.tool_name, content)
    }

    /// Read a tool result back out of a tool-role message
    pub fn from_message(message: &ChatMessage) -> Option<Self> {
        if message.role != MessageRole::Tool {
            return None;
        }
        let call_id = message.tool_call_id.clone()?;
        let tool_name = message.name.clone()?;
        let mut body = match serde_json::from_str::<Value>(message.text()?).ok()? {
            Value::Object(map) => map,
            _ => return None,
        };
        let texts = match body.remove(&tool_name)? {
            Value::Array(items) => items
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?,
            _ => return None,
        };
        Some(Self {
            call_id,
            tool_name,
            arguments: body,
            texts,
        })
    }
}

/// Tool choice option for requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to use tools
    #[default]
    Auto,
    /// Don't use tools
    None,
    /// Force tool use
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
            ToolChoice::Required => "required",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_defaults_description() {
        let schema = json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        });
        let spec = ToolSpec::new("query", schema.clone());
        let descriptor = spec.descriptor();

        assert_eq!(descriptor.name, "query");
        assert_eq!(descriptor.description, "");
        assert_eq!(descriptor.parameters, schema);

        let described = spec.with_description("Run a read-only SQL query");
        assert_eq!(described.descriptor().description, "Run a read-only SQL query");
    }

    #[test]
    fn test_parse_arguments() {
        let call = ToolCallRequest::new("1", "query", r#"{"query":"SELECT 1"}"#);
        let args = call.parse_arguments().unwrap();
        assert_eq!(args.get("query"), Some(&json!("SELECT 1")));

        let broken = ToolCallRequest::new("2", "query", r#"{"query":"#);
        assert!(broken.parse_arguments().is_err());

        let not_object = ToolCallRequest::new("3", "query", "[1, 2]");
        let err = not_object.parse_arguments().unwrap_err();
        assert!(err.contains("an array"));
    }

    #[test]
    fn test_output_keeps_only_text() {
        let output = ToolOutput::success(vec![
            ToolContent::text("first"),
            ToolContent::Other { kind: "image".to_string() },
            ToolContent::text("second"),
        ]);
        assert_eq!(output.texts(), vec!["first", "second"]);
        assert!(ToolOutput::default().texts().is_empty());
    }

    #[test]
    fn test_result_content_echoes_arguments() {
        let call = ToolCallRequest::new("1", "query_tool", r#"{"query":"SELECT 1"}"#);
        let result = ToolResult::new(&call, call.parse_arguments().unwrap(), vec!["1".to_string()]);

        let content: Value = serde_json::from_str(&result.content()).unwrap();
        assert_eq!(content, json!({"query": "SELECT 1", "query_tool": ["1"]}));
    }

    #[test]
    fn test_result_list_wins_name_collision() {
        let call = ToolCallRequest::new("1", "query", r#"{"query":"SELECT 1"}"#);
        let result = ToolResult::new(&call, call.parse_arguments().unwrap(), vec!["1".to_string()]);

        let content: Value = serde_json::from_str(&result.content()).unwrap();
        assert_eq!(content, json!({"query": ["1"]}));
    }

    #[test]
    fn test_result_reads_back_from_message() {
        let call = ToolCallRequest::new("7", "run_sql", r#"{"query":"SELECT name FROM t","limit":2}"#);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let result = ToolResult::new(&call, call.parse_arguments().unwrap(), texts.clone());

        let message = result.clone().into_message();
        assert_eq!(message.tool_call_id.as_deref(), Some("7"));

        let read_back = ToolResult::from_message(&message).unwrap();
        assert_eq!(read_back, result);
        assert_eq!(read_back.texts, texts);
    }

    #[test]
    fn test_empty_result_list() {
        let call = ToolCallRequest::new("9", "run_sql", "{}");
        let message = ToolResult::new(&call, Map::new(), Vec::new()).into_message();
        assert_eq!(message.text(), Some(r#"{"run_sql":[]}"#));
    }

    #[test]
    fn test_tool_choice_serialization() {
        assert_eq!(serde_json::to_string(&ToolChoice::Auto).unwrap(), "\"auto\"");
        assert_eq!(ToolChoice::default(), ToolChoice::Auto);
        assert_eq!(ToolChoice::Required.as_str(), "required");
    }
}
