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

//! Turns a status report into view-ready data.

use serde::Serialize;

use crate::model::StatusReport;

/// One named subsystem and whether it is operational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub system: String,
    pub status: bool,
}

impl Status {
    #[must_use]
    pub fn new(system: impl Into<String>, status: bool) -> Self {
        Self {
            system: system.into(),
            status,
        }
    }
}

/// Statuses in arrival order plus the overall health flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub systems: Vec<Status>,
    pub overall: bool,
}

impl StatusView {
    /// Number of subsystems reporting operational.
    #[must_use]
    pub fn operational_count(&self) -> usize {
        self.systems.iter().filter(|s| s.status).count()
    }

    /// Subsystems reporting not operational.
    pub fn degraded(&self) -> impl Iterator<Item = &Status> + '_ {
        self.systems.iter().filter(|s| !s.status)
    }
}

/// Build the view for one status report.
///
/// `overall` mirrors the gateway's own `failed` flag. It is not derived from
/// the per-subsystem flags: a report with `failed: false` is healthy overall
/// even when individual subsystems are down.
#[must_use]
pub fn aggregate(report: &StatusReport) -> StatusView {
    StatusView {
        systems: report
            .systems
            .iter()
            .map(|(system, status)| Status::new(system, status))
            .collect(),
        overall: !report.failed,
    }
}
