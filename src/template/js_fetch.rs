use crate::curl::{parse_curl, ParsedCurl};

/// Renders the `fetch` call equivalent to a curl command, for display only.
pub fn curl_to_fetch_code(command: &str) -> String {
    render_js_fetch(&parse_curl(command))
}

pub(crate) fn render_js_fetch(parsed: &ParsedCurl) -> String {
    let headers = parsed
        .headers
        .iter()
        .map(|(name, value)| format!("    {}: {}", js_string(name), js_string(value)))
        .collect::<Vec<_>>()
        .join(",\n");

    let mut code = format!(
        "const response = await fetch({}, {{\n  method: {},\n  headers: {{\n{}\n  }}",
        js_string(&parsed.url),
        js_string(&parsed.method),
        headers
    );

    if parsed.is_file_upload {
        let kind = parsed
            .file_type
            .map(|kind| kind.as_str())
            .unwrap_or("unknown");
        code.push_str(&format!(",\n  body: fileData // loaded from {kind} file"));
    } else if let Some(body) = &parsed.body {
        match serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
        {
            Some(pretty) => code.push_str(&format!(
                ",\n  body: JSON.stringify({})",
                pretty.replace('\n', "\n  ")
            )),
            None => code.push_str(&format!(",\n  body: {}", js_string(body))),
        }
    }

    code.push_str("\n});\n\nconst data = await response.json();");
    code
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}
