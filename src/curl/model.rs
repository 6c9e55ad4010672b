use serde::{Serialize, Serializer};

use crate::files::FileKind;

/// Best-effort view of a curl command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCurl {
    pub method: String,
    pub url: String,
    #[serde(serialize_with = "serialize_header_pairs")]
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub is_file_upload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileKind>,
}

impl Default for ParsedCurl {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            url: String::new(),
            headers: Vec::new(),
            body: None,
            is_file_upload: false,
            file_type: None,
        }
    }
}

impl ParsedCurl {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Inserts or replaces a header while keeping the position of the first occurrence.
pub(crate) fn upsert_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(key, _)| *key == name) {
        Some(entry) => entry.1 = value,
        None => headers.push((name, value)),
    }
}

fn serialize_header_pairs<S>(headers: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(headers.iter().map(|(name, value)| (name, value)))
}
