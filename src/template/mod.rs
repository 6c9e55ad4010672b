use anyhow::{bail, Result};

mod js_fetch;

pub use js_fetch::curl_to_fetch_code;

/// Renders a curl command through the named export template.
pub fn render_export_template(name: &str, curl_command: &str) -> Result<String> {
    match name {
        "js-fetch" => Ok(curl_to_fetch_code(curl_command)),
        other => bail!("Unknown export template: {other}"),
    }
}
