use colored::{Color, Colorize};

use crate::deck::{CommandDescriptor, DemoSection};

use super::models::{ExecutionOutcome, ExecutionResult, ResponsePayload};

pub fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Green,
        "POST" => Color::Blue,
        "PUT" => Color::Yellow,
        "PATCH" => Color::TrueColor {
            r: 251,
            g: 146,
            b: 60,
        },
        "DELETE" => Color::Red,
        _ => Color::White,
    }
}

fn status_color(result: &ExecutionResult) -> Color {
    match result.status() {
        200..=299 => Color::Green,
        300..=399 => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn print_execution_result(
    method: &str,
    endpoint: &str,
    result: &ExecutionResult,
    preview_bytes: Option<usize>,
) {
    println!(
        "{} {}",
        method.color(method_color(method)).bold(),
        endpoint.cyan()
    );
    println!(
        "{} {} {}",
        "Status:".bold(),
        result.status().to_string().color(status_color(result)),
        format!("({} ms)", result.elapsed_ms).dimmed()
    );

    match &result.outcome {
        ExecutionOutcome::Failed { error } => {
            println!("{} {}", "Error:".bold(), error.red());
        }
        ExecutionOutcome::Completed { data, .. } => {
            let rendered = render_payload(data);
            match preview_bytes.filter(|limit| *limit > 0) {
                Some(limit) => println!("{}", create_preview(&rendered, limit)),
                None => println!("{}", rendered),
            }
        }
    }
}

pub fn render_payload(payload: &ResponsePayload) -> String {
    match payload {
        ResponsePayload::Json(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        ResponsePayload::Text(text) => text.clone(),
    }
}

/// Cuts `text` to at most `limit` bytes on a character boundary.
pub fn create_preview(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n{}",
        &text[..end],
        format!("... ({} more bytes)", text.len() - end).dimmed()
    )
}

pub fn print_section(section: &DemoSection) {
    println!("{} {}", section.title.bold(), format!("[{}]", section.id).dimmed());
    for command in &section.commands {
        let method = command.method.as_str();
        println!(
            "  {:<24} {} {}",
            command.id,
            format!("{:<6}", method).color(method_color(method)),
            command.endpoint.cyan()
        );
    }
}

pub fn print_command(command: &CommandDescriptor) {
    println!(
        "{} {}",
        command.label.bold(),
        format!("[{}]", command.id).dimmed()
    );
    println!("{}", command.description);
    println!(
        "{} {}",
        command
            .method
            .as_str()
            .color(method_color(command.method.as_str()))
            .bold(),
        command.endpoint.cyan()
    );
    for (name, value) in &command.headers {
        println!("  {}: {}", name.cyan(), value.dimmed());
    }
    if let Some(kind) = command.requires_file_data {
        println!(
            "{} {}",
            "Body:".bold(),
            format!("pre-loaded {}", kind.default_file_name()).yellow()
        );
    } else if let Some(body) = &command.body {
        println!("{}", "Body".bold());
        println!("{}", body.to_display_string());
    }
    println!("{}", "curl".bold());
    println!("{}", command.curl_command.dimmed());
}
