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

//! Terminal rendering of the dashboard.

use std::fmt::Write as _;

use lapdog_client::{Dashboard, StatusView, Workspace};
use serde::Serialize;

#[derive(Serialize)]
struct Snapshot<'a> {
    status: Option<&'a StatusView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_error: Option<&'a str>,
    workspaces: Option<&'a [Workspace]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    workspaces_error: Option<&'a str>,
}

/// Render the dashboard as a JSON document.
pub fn render_json(dashboard: &Dashboard) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Snapshot {
        status: dashboard.status.as_ref(),
        status_error: dashboard.status_error.as_deref(),
        workspaces: dashboard.workspaces.as_deref(),
        workspaces_error: dashboard.workspaces_error.as_deref(),
    })
}

/// Render the dashboard as plain text.
pub fn render_text(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    out.push_str("Subsystem Status\n");
    match (&dashboard.status, &dashboard.status_error) {
        (Some(view), _) => {
            let _ = writeln!(
                out,
                "  Overall: {}",
                if view.overall { "OK" } else { "FAILED" }
            );
            for status in &view.systems {
                let _ = writeln!(
                    out,
                    "  [{}] {}",
                    if status.status { " up " } else { "down" },
                    status.system
                );
            }
        }
        (None, Some(error)) => {
            let _ = writeln!(out, "  unavailable: {error}");
        }
        (None, None) => out.push_str("  loading...\n"),
    }

    out.push_str("\nWorkspaces\n");
    match (&dashboard.workspaces, &dashboard.workspaces_error) {
        (Some(workspaces), _) if workspaces.is_empty() => out.push_str("  (none)\n"),
        (Some(workspaces), _) => {
            for workspace in workspaces {
                let _ = writeln!(out, "  {}", describe(workspace));
            }
        }
        (None, Some(error)) => {
            let _ = writeln!(out, "  unavailable: {error}");
        }
        (None, None) => out.push_str("  loading...\n"),
    }

    out
}

fn describe(workspace: &Workspace) -> String {
    let mut line = workspace
        .qualified_name()
        .unwrap_or_else(|| workspace.as_value().to_string());

    if let Some(level) = workspace.access_level() {
        let _ = write!(line, " ({level})");
    }
    if workspace.is_public() == Some(true) {
        line.push_str(" [public]");
    }
    line
}
