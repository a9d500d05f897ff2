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

//! Client library for the Lapdog API gateway dashboard.
//!
//! The library covers the data side of the dashboard:
//!
//! - **Client layer**: [`StatusClient`] fetches subsystem health once per
//!   instance and shares the outcome with every caller, and lists workspaces
//!   on demand
//! - **Aggregation layer**: [`aggregate`] turns a health report into ordered
//!   [`Status`] entries plus the overall health flag
//! - **Dashboard layer**: [`Dashboard`] folds the two independent results
//!   into the state a renderer displays
//!
//! # Quick Start
//!
//! ```no_run
//! use lapdog_client::{aggregate, ClientConfig, StatusClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lapdog_client::ClientError> {
//!     let client = StatusClient::new(ClientConfig::default())?;
//!
//!     let report = client.get_status().await?;
//!     let view = aggregate(&report);
//!     for status in &view.systems {
//!         println!("{}: {}", status.system, if status.status { "up" } else { "down" });
//!     }
//!
//!     for workspace in client.get_workspaces().await? {
//!         println!("{:?}", workspace.qualified_name());
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod transport;

pub use aggregate::{aggregate, Status, StatusView};
pub use client::{ClientConfig, StatusClient, StatusOutcome, StatusQuery, DEFAULT_BASE_URL};
pub use dashboard::{refresh, spawn_refresh, Dashboard, DashboardEvent, DiagnosticLevel};
pub use error::ClientError;
pub use model::{StatusReport, SubsystemHealth, Workspace};
pub use transport::{HttpTransport, Transport};
