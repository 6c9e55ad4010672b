use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;

use crate::deck::CommandDescriptor;
use crate::executor::{ExecuteOptions, ExecutionResult, Executor};
use crate::files::FileData;

/// Presenter edits applied to a command before it is sent.
#[derive(Debug, Clone, Default)]
pub struct CommandOverrides {
    pub endpoint: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub command_id: String,
    #[serde(flatten)]
    pub result: ExecutionResult,
    pub executed_at: DateTime<Utc>,
}

/// Shared view of the command ids whose requests are still running.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<Mutex<HashMap<String, usize>>>);

impl InFlight {
    pub fn contains(&self, command_id: &str) -> bool {
        self.lock().contains_key(command_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Running ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn begin(&self, command_id: &str) -> InFlightGuard {
        *self.lock().entry(command_id.to_string()).or_default() += 1;
        InFlightGuard {
            in_flight: self.clone(),
            command_id: command_id.to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Removes its id when the request finishes or its future is dropped.
struct InFlightGuard {
    in_flight: InFlight,
    command_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut running = self.in_flight.lock();
        if let Some(count) = running.get_mut(&self.command_id) {
            *count -= 1;
            if *count == 0 {
                running.remove(&self.command_id);
            }
        }
    }
}

/// Runs demo commands and keeps the latest result per command id.
#[derive(Debug)]
pub struct Session {
    executor: Executor,
    results: HashMap<String, CommandResult>,
    in_flight: InFlight,
}

impl Session {
    pub fn new(executor: Executor) -> Self {
        Self {
            executor,
            results: HashMap::new(),
            in_flight: InFlight::default(),
        }
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Handle that stays readable while `execute` holds the session.
    pub fn in_flight(&self) -> InFlight {
        self.in_flight.clone()
    }

    pub async fn execute(
        &mut self,
        command: &CommandDescriptor,
        files: &FileData,
        overrides: &CommandOverrides,
    ) -> &CommandResult {
        let result =
            run_command(&self.executor, &self.in_flight, command, files, overrides).await;
        self.store(result)
    }

    /// Fires all commands at once; results are stored as they complete.
    pub async fn execute_many(
        &mut self,
        commands: &[&CommandDescriptor],
        files: &FileData,
    ) -> Vec<CommandResult> {
        let overrides = CommandOverrides::default();
        let executor = &self.executor;
        let in_flight = &self.in_flight;
        let finished = join_all(
            commands
                .iter()
                .map(|command| run_command(executor, in_flight, command, files, &overrides)),
        )
        .await;

        for result in &finished {
            self.store(result.clone());
        }
        finished
    }

    pub fn result(&self, command_id: &str) -> Option<&CommandResult> {
        self.results.get(command_id)
    }

    pub fn clear_result(&mut self, command_id: &str) -> Option<CommandResult> {
        self.results.remove(command_id)
    }

    pub fn clear_all(&mut self) {
        self.results.clear();
    }

    fn store(&mut self, result: CommandResult) -> &CommandResult {
        let id = result.command_id.clone();
        self.results.insert(id.clone(), result);
        &self.results[&id]
    }
}

async fn run_command(
    executor: &Executor,
    in_flight: &InFlight,
    command: &CommandDescriptor,
    files: &FileData,
    overrides: &CommandOverrides,
) -> CommandResult {
    let options = ExecuteOptions {
        method: command.method.as_str().to_string(),
        endpoint: overrides
            .endpoint
            .clone()
            .unwrap_or_else(|| command.endpoint.clone()),
        headers: command.headers.clone(),
        body: resolve_body(command, files, overrides),
    };

    let guard = in_flight.begin(&command.id);
    let result = executor.execute(options).await;
    drop(guard);
    tracing::debug!(
        command = %command.id,
        status = result.status(),
        success = result.success(),
        "command finished"
    );

    CommandResult {
        command_id: command.id.clone(),
        result,
        executed_at: Utc::now(),
    }
}

/// File-backed commands send the loaded file; others send the edited body,
/// falling back to the authored one.
pub fn resolve_body(
    command: &CommandDescriptor,
    files: &FileData,
    overrides: &CommandOverrides,
) -> Option<String> {
    if let Some(kind) = command.requires_file_data {
        if let Some(content) = files.get(kind).filter(|content| !content.is_empty()) {
            return Some(content.to_string());
        }
        tracing::warn!(command = %command.id, %kind, "file data not loaded");
    } else if let Some(body) = overrides.body.as_ref().filter(|body| !body.is_empty()) {
        return Some(body.clone());
    }

    command.body.as_ref().map(|body| body.to_request_body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::find_command;

    fn files() -> FileData {
        FileData {
            json: Some("[{\"id\":1}]".to_string()),
            csv: Some("id\n1\n".to_string()),
            error: None,
        }
    }

    #[test]
    fn file_commands_send_loaded_content() {
        let command = find_command("index-csv").unwrap();
        let body = resolve_body(command, &files(), &CommandOverrides::default());
        assert_eq!(body.as_deref(), Some("id\n1\n"));
    }

    #[test]
    fn file_commands_ignore_body_edits() {
        let command = find_command("index-json").unwrap();
        let overrides = CommandOverrides {
            body: Some("edited".to_string()),
            ..CommandOverrides::default()
        };
        assert_eq!(
            resolve_body(command, &files(), &overrides).as_deref(),
            Some("[{\"id\":1}]")
        );
        assert_eq!(resolve_body(command, &FileData::default(), &overrides), None);
    }

    #[test]
    fn edited_body_wins_over_authored_body() {
        let command = find_command("facet-distributions").unwrap();
        let overrides = CommandOverrides {
            body: Some("{\"q\":\"x\"}".to_string()),
            ..CommandOverrides::default()
        };
        assert_eq!(
            resolve_body(command, &files(), &overrides).as_deref(),
            Some("{\"q\":\"x\"}")
        );

        let authored = resolve_body(command, &files(), &CommandOverrides::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&authored).unwrap();
        assert_eq!(value["q"], "");
    }

    #[tokio::test]
    async fn in_flight_tracks_running_commands() {
        use httpmock::prelude::*;
        use std::time::Duration;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/indexes/transactions_json/search");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("{\"hits\":[]}")
                    .delay(Duration::from_millis(400));
            })
            .await;

        let mut session = Session::new(Executor::new(server.base_url(), "k"));
        let in_flight = session.in_flight();
        assert!(in_flight.is_empty());

        let command = find_command("search-payment").unwrap();
        let overrides = CommandOverrides::default();
        let files = FileData::default();
        let (stored, seen) = tokio::join!(
            async { session.execute(command, &files, &overrides).await.clone() },
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                in_flight.ids()
            }
        );

        assert!(stored.result.success());
        assert_eq!(seen, vec!["search-payment".to_string()]);
        assert!(!in_flight.contains("search-payment"));
        assert!(in_flight.is_empty());
    }

    #[test]
    fn search_commands_have_no_body() {
        let command = find_command("search-typo").unwrap();
        assert_eq!(
            resolve_body(command, &files(), &CommandOverrides::default()),
            None
        );
    }
}
