use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::files::FileKind;

use super::model::{upsert_header, ParsedCurl};

const BODY_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

static LINE_CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\r?\n\s*").expect("valid regex"));

static METHOD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-X\s+(\w+)").expect("valid regex"));

/// Tried in order; the first rule that captures a URL wins.
static URL_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?s)curl\b.*?"(https?://[^"]+)""#,
        r"(?s)curl\b.*?'(https?://[^']+)'",
        r"curl\s+(?:-\S+\s+)*(https?://\S+)",
        r#"(https?://[^\s"']+)"#,
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Data arguments are masked before URL rules run, so URLs inside a body
/// never count as the request URL.
static DATA_ARGUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:--data-binary|--data-raw|--data|-d)\s+(?:'[^']*'|"[^"]*"|\S+)"#)
        .expect("valid regex")
});

static HEADER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"-H\s+(?:"([^"]+)"|'([^']+)')"#).expect("valid regex"));

static FALLBACK_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\S+\.(json|csv))").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodySource {
    File,
    Literal,
}

struct BodyRule {
    pattern: Regex,
    source: BodySource,
}

/// Tried in order; the first rule that captures content decides the body.
static BODY_RULES: Lazy<Vec<BodyRule>> = Lazy::new(|| {
    [
        (r"--data-binary\s+@(\S+)", BodySource::File),
        (r"-d\s+@(\S+)", BodySource::File),
        (r#"--data-binary\s+(?:'([^']+)'|"([^"]+)")"#, BodySource::Literal),
        (r#"-d\s+(?:'([^']+)'|"([^"]+)")"#, BodySource::Literal),
        (r"--data-binary\s+'(\{[^']+\})'", BodySource::Literal),
    ]
    .into_iter()
    .map(|(pattern, source)| BodyRule {
        pattern: Regex::new(pattern).expect("valid regex"),
        source,
    })
    .collect()
});

/// Parses a curl command into its method, URL, headers and body.
///
/// Never fails: every field independently falls back to its default
/// (`GET`, empty URL, no headers, no body) when nothing matches.
pub fn parse_curl(command: &str) -> ParsedCurl {
    let normalized = LINE_CONTINUATION.replace_all(command, " ");
    let normalized = normalized.trim();

    let mut parsed = ParsedCurl::default();

    if let Some(method) = extract_method(normalized) {
        parsed.method = method;
    }
    parsed.url = extract_url(normalized).unwrap_or_default();
    parsed.headers = extract_headers(normalized);

    match extract_body(normalized) {
        Some(ExtractedBody::File(kind)) => {
            parsed.is_file_upload = true;
            parsed.file_type = Some(kind);
        }
        Some(ExtractedBody::Inline(body)) => parsed.body = Some(body),
        None => {
            if BODY_METHODS.contains(&parsed.method.as_str()) {
                if let Some(kind) = detect_file_reference(normalized) {
                    parsed.is_file_upload = true;
                    parsed.file_type = Some(kind);
                }
            }
        }
    }

    tracing::debug!(
        method = %parsed.method,
        url = %parsed.url,
        headers = parsed.headers.len(),
        file_upload = parsed.is_file_upload,
        "parsed curl command"
    );

    parsed
}

fn extract_method(text: &str) -> Option<String> {
    METHOD_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_url(text: &str) -> Option<String> {
    let without_data = DATA_ARGUMENT.replace_all(text, " ");
    URL_RULES.iter().find_map(|rule| {
        rule.captures(&without_data)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn extract_headers(text: &str) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for caps in HEADER_PATTERN.captures_iter(text) {
        let Some(raw) = first_group(&caps) else {
            continue;
        };
        let Some((name, value)) = raw.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        upsert_header(&mut headers, name.to_string(), value.trim().to_string());
    }
    headers
}

enum ExtractedBody {
    File(FileKind),
    Inline(String),
}

fn extract_body(text: &str) -> Option<ExtractedBody> {
    BODY_RULES.iter().find_map(|rule| {
        let caps = rule.pattern.captures(text)?;
        let content = first_group(&caps)?;
        if rule.source == BodySource::File || content.starts_with('@') {
            let file_name = content.trim_start_matches('@');
            Some(ExtractedBody::File(FileKind::from_file_name(file_name)))
        } else {
            Some(ExtractedBody::Inline(content.to_string()))
        }
    })
}

fn detect_file_reference(text: &str) -> Option<FileKind> {
    FALLBACK_FILE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|ext| {
            if ext.as_str() == "csv" {
                FileKind::Csv
            } else {
                FileKind::Json
            }
        })
}

fn first_group<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .find(|s| !s.is_empty())
}
