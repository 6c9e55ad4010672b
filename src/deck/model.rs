use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::files::FileKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandBody {
    Raw(String),
    Structured(Value),
}

impl CommandBody {
    /// Text sent over the wire; structured bodies are serialized compactly.
    pub fn to_request_body(&self) -> String {
        match self {
            CommandBody::Raw(text) => text.clone(),
            CommandBody::Structured(value) => value.to_string(),
        }
    }

    /// Text shown to a presenter for editing.
    pub fn to_display_string(&self) -> String {
        match self {
            CommandBody::Raw(text) => text.clone(),
            CommandBody::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    pub id: String,
    pub label: String,
    pub description: String,
    pub method: HttpMethod,
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<CommandBody>,
    pub curl_command: String,
    pub requires_file_data: Option<FileKind>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSection {
    pub id: String,
    pub title: String,
    pub commands: Vec<CommandDescriptor>,
    pub notes: Vec<String>,
    pub expected_response: Option<String>,
}
