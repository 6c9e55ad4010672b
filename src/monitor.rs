//! Periodic health probing with an explicit start/shutdown lifecycle.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{oneshot, watch, Notify},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::executor::Executor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub is_connected: bool,
    pub is_checking: bool,
    pub last_checked: Option<DateTime<Utc>>,
}

/// Probes the health endpoint right away and then on every interval tick.
///
/// Dropping the monitor also stops the background task.
pub struct ConnectionMonitor {
    state: watch::Receiver<ConnectionState>,
    refresh: Arc<Notify>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ConnectionMonitor {
    pub fn spawn(executor: Executor, interval: Duration) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState {
            is_checking: true,
            ..ConnectionState::default()
        });
        let refresh = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_probes(
            executor,
            interval,
            state_tx,
            Arc::clone(&refresh),
            shutdown_rx,
        ));

        Self {
            state: state_rx,
            refresh,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Requests an immediate probe outside the regular cadence.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(err) = (&mut self.task).await {
            tracing::warn!(error = %err, "connection monitor task ended abnormally");
        }
    }
}

async fn run_probes(
    executor: Executor,
    interval: Duration,
    state: watch::Sender<ConnectionState>,
    refresh: Arc<Notify>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
        }

        state.send_modify(|current| current.is_checking = true);
        let connected = tokio::select! {
            _ = &mut shutdown => break,
            connected = executor.check_connection() => connected,
        };
        tracing::debug!(connected, base_url = executor.base_url(), "health probe");

        state.send_modify(|current| {
            current.is_connected = connected;
            current.is_checking = false;
            current.last_checked = Some(Utc::now());
        });
    }
}
