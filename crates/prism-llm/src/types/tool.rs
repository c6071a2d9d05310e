use serde::{Deserialize, Serialize};

/// Specification of a function the model may call
///
/// Declared by the caller and offered to the model for tool-call
/// elicitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the function parameters
    pub parameters: serde_json::Value,
}

impl FunctionDefinition {
    /// Create a function definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}
