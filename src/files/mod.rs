//! Upload payloads that file-based demo commands send as their body.
//!
//! The contents are opaque text; nothing here parses or validates them.

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Json,
    Csv,
}

impl FileKind {
    /// `.csv` files are CSV, anything else is treated as JSON.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".csv") {
            FileKind::Csv
        } else {
            FileKind::Json
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Json => "json",
            FileKind::Csv => "csv",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            FileKind::Json => "transactions.json",
            FileKind::Csv => "transactions.csv",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileData {
    pub json: Option<String>,
    pub csv: Option<String>,
    /// Problems encountered while loading, joined with `; `.
    pub error: Option<String>,
}

impl FileData {
    pub fn get(&self, kind: FileKind) -> Option<&str> {
        match kind {
            FileKind::Json => self.json.as_deref(),
            FileKind::Csv => self.csv.as_deref(),
        }
    }
}

/// Reads `transactions.json` and `transactions.csv` from `dir` concurrently.
///
/// A file that cannot be read leaves its slot empty and adds an entry to
/// [`FileData::error`]; loading itself never fails.
pub async fn load_file_data(dir: &Path) -> FileData {
    let json_path = dir.join(FileKind::Json.default_file_name());
    let csv_path = dir.join(FileKind::Csv.default_file_name());

    let (json, csv) = tokio::join!(read_payload(&json_path), read_payload(&csv_path));

    let mut errors = Vec::new();
    let json = json
        .map_err(|err| errors.push(format!("JSON: {err}")))
        .ok();
    let csv = csv.map_err(|err| errors.push(format!("CSV: {err}"))).ok();

    let error = if errors.is_empty() {
        None
    } else {
        let joined = errors.join("; ");
        tracing::warn!(dir = %dir.display(), error = %joined, "failed to load upload payloads");
        Some(joined)
    };

    FileData { json, csv, error }
}

async fn read_payload(path: &Path) -> Result<String, String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| format!("{} ({})", err, path.display()))
}

/// Human readable size, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{:.1} {}", scaled, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_kind_from_extension() {
        assert_eq!(FileKind::from_file_name("transactions.csv"), FileKind::Csv);
        assert_eq!(FileKind::from_file_name("transactions.json"), FileKind::Json);
        assert_eq!(FileKind::from_file_name("payload.txt"), FileKind::Json);
    }

    #[test]
    fn format_file_size_scales_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[tokio::test]
    async fn load_file_data_reads_both_payloads() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("transactions.json"), "[{\"id\":1}]").unwrap();
        std::fs::write(temp.path().join("transactions.csv"), "id\n1\n").unwrap();

        let data = load_file_data(temp.path()).await;
        assert_eq!(data.get(FileKind::Json), Some("[{\"id\":1}]"));
        assert_eq!(data.get(FileKind::Csv), Some("id\n1\n"));
        assert_eq!(data.error, None);
    }

    #[tokio::test]
    async fn load_file_data_reports_missing_files() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("transactions.csv"), "id\n").unwrap();

        let data = load_file_data(temp.path()).await;
        assert_eq!(data.json, None);
        assert_eq!(data.csv.as_deref(), Some("id\n"));
        let error = data.error.expect("error is reported");
        assert!(error.starts_with("JSON: "));
        assert!(!error.contains("; CSV"));
    }
}
