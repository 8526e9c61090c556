use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One item of an investigation's event stream, normalised at the runtime boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestigationEvent {
    pub author: String,

    #[serde(default)]
    pub actions: EventActions,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCall>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_responses: Vec<FunctionResponse>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_parts: Vec<String>,

    #[serde(default)]
    pub is_final_response: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventActions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_to_agent: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escalate: bool,

    /// Session state writes carried by this event; applied by the runtime.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub state_delta: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    #[serde(default)]
    pub response: Value,
}

impl InvestigationEvent {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_parts.push(text.into());
        self
    }

    pub fn with_call(mut self, name: impl Into<String>, args: Map<String, Value>) -> Self {
        self.function_calls.push(FunctionCall {
            name: name.into(),
            args,
        });
        self
    }

    pub fn with_response(mut self, name: impl Into<String>, response: Value) -> Self {
        self.function_responses.push(FunctionResponse {
            name: name.into(),
            response,
        });
        self
    }

    pub fn with_transfer(mut self, target: impl Into<String>) -> Self {
        self.actions.transfer_to_agent = Some(target.into());
        self
    }

    pub fn with_escalation(mut self) -> Self {
        self.actions.escalate = true;
        self
    }

    pub fn with_state(mut self, key: impl Into<String>, value: Value) -> Self {
        self.actions.state_delta.insert(key.into(), value);
        self
    }

    pub fn final_response(mut self) -> Self {
        self.is_final_response = true;
        self
    }

    pub fn has_tool_activity(&self) -> bool {
        !self.function_calls.is_empty() || !self.function_responses.is_empty()
    }

    /// Non-empty text parts joined by a single space, if there are any.
    pub fn combined_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .text_parts
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
