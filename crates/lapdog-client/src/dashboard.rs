// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dashboard view-model.
//!
//! The status and workspace fetches run as two independent tasks. Each one
//! reports through a [`DashboardEvent`] as soon as it completes, and the
//! [`Dashboard`] folds those events into what a renderer displays.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::aggregate::{aggregate, StatusView};
use crate::client::StatusClient;
use crate::error::ClientError;
use crate::model::Workspace;

const MAX_DIAGNOSTICS: usize = 50;

/// Result of one of the two dashboard fetches.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    StatusLoaded(StatusView),
    StatusFailed(ClientError),
    WorkspacesLoaded(Vec<Workspace>),
    WorkspacesFailed(ClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Diagnostic message with timestamp
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

/// Spawn the status and workspace fetches for one dashboard cycle.
///
/// Events are sent in completion order. The status task awaits the client's
/// cached query, so repeated cycles only ever hit `/status` once.
pub fn spawn_refresh(
    client: &Arc<StatusClient>,
    tx: &mpsc::Sender<DashboardEvent>,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let status_task = {
        let query = client.get_status();
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = match query.await {
                Ok(report) => DashboardEvent::StatusLoaded(aggregate(&report)),
                Err(e) => DashboardEvent::StatusFailed(e),
            };
            let _ = tx.send(event).await;
        })
    };

    let workspace_task = {
        let client = Arc::clone(client);
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = match client.get_workspaces().await {
                Ok(workspaces) => DashboardEvent::WorkspacesLoaded(workspaces),
                Err(e) => DashboardEvent::WorkspacesFailed(e),
            };
            let _ = tx.send(event).await;
        })
    };

    (status_task, workspace_task)
}

/// State rendered by the dashboard view.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub status: Option<StatusView>,
    pub status_error: Option<String>,
    pub workspaces: Option<Vec<Workspace>>,
    pub workspaces_error: Option<String>,
    pub diagnostics: VecDeque<DiagnosticMessage>,
    status_reported: bool,
    workspaces_reported: bool,
}

impl Dashboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new refresh cycle. Previously loaded data stays visible
    /// until a new event replaces it.
    pub fn begin_cycle(&mut self) {
        self.status_reported = false;
        self.workspaces_reported = false;
    }

    /// Whether both fetches have reported since the last [`Self::begin_cycle`].
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status_reported && self.workspaces_reported
    }

    /// Whether either fetch failed in the current cycle.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.status_error.is_some() || self.workspaces_error.is_some()
    }

    /// Fold one event into the dashboard state.
    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::StatusLoaded(view) => {
                info!(
                    "Status loaded: {}/{} subsystems operational, overall {}",
                    view.operational_count(),
                    view.systems.len(),
                    if view.overall { "healthy" } else { "failed" }
                );
                self.add_diagnostic(
                    DiagnosticLevel::Info,
                    format!("Status loaded for {} subsystems", view.systems.len()),
                );
                self.status = Some(view);
                self.status_error = None;
                self.status_reported = true;
            }
            DashboardEvent::StatusFailed(e) => {
                warn!("Status unavailable: {e}");
                self.add_diagnostic(DiagnosticLevel::Error, format!("Status unavailable: {e}"));
                self.status = None;
                self.status_error = Some(e.to_string());
                self.status_reported = true;
            }
            DashboardEvent::WorkspacesLoaded(workspaces) => {
                info!("Loaded {} workspaces", workspaces.len());
                self.add_diagnostic(
                    DiagnosticLevel::Info,
                    format!("Loaded {} workspaces", workspaces.len()),
                );
                self.workspaces = Some(workspaces);
                self.workspaces_error = None;
                self.workspaces_reported = true;
            }
            DashboardEvent::WorkspacesFailed(e) => {
                warn!("Workspace listing failed: {e}");
                self.add_diagnostic(
                    DiagnosticLevel::Warning,
                    format!("Workspace listing failed: {e}"),
                );
                self.workspaces = None;
                self.workspaces_error = Some(e.to_string());
                self.workspaces_reported = true;
            }
        }
    }

    /// Add a diagnostic message
    pub fn add_diagnostic(&mut self, level: DiagnosticLevel, message: String) {
        self.diagnostics.push_back(DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message,
        });

        // Keep only the last N messages
        while self.diagnostics.len() > MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
    }
}

/// Run one full refresh cycle and wait until both fetches have reported.
pub async fn refresh(client: &Arc<StatusClient>, dashboard: &mut Dashboard) {
    let (tx, mut rx) = mpsc::channel(2);
    dashboard.begin_cycle();
    let _handles = spawn_refresh(client, &tx);
    drop(tx);

    while let Some(event) = rx.recv().await {
        dashboard.apply(event);
        if dashboard.is_complete() {
            break;
        }
    }
}
