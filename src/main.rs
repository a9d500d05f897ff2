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

mod config;
mod render;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use lapdog_client::{refresh, Dashboard, StatusClient};
use log::{error, info};
use tokio_util::sync::CancellationToken;

use config::AppConfig;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Subsystem health and workspace dashboard for the Lapdog API gateway.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Gateway base URL (overrides LAPDOG_API_URL and the config file)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Print the dashboard as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Keep refreshing the dashboard until interrupted
    #[arg(short, long)]
    watch: bool,

    /// Seconds between refreshes in watch mode (overrides the config file)
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Store the resolved gateway URL in the config file
    #[arg(long)]
    save_url: bool,

    /// Print the config file location and exit
    #[arg(long)]
    show_config_path: bool,

    /// Enable debug logging (including raw gateway responses)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if args.show_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut app_config = AppConfig::load()?;
    if let Some(secs) = args.interval {
        app_config.refresh_interval_secs = secs;
    }

    let client_config = app_config.client_config(args.api_url.as_deref());
    if args.save_url {
        app_config.api_url.clone_from(&client_config.base_url);
        app_config.save()?;
        info!("Saved gateway URL {} to config", app_config.api_url);
    }

    info!("Using gateway at {}", client_config.base_url);
    let client = Arc::new(StatusClient::new(client_config)?);
    let mut dashboard = Dashboard::new();

    if args.watch {
        watch(&client, &mut dashboard, app_config.refresh_interval(), args.json).await?;
        return Ok(ExitCode::SUCCESS);
    }

    refresh(&client, &mut dashboard).await;
    print_dashboard(&dashboard, args.json)?;

    if !dashboard_succeeded(&dashboard) {
        error!("Dashboard incomplete: one or more gateway requests failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Both fetches reported this cycle and neither failed.
fn dashboard_succeeded(dashboard: &Dashboard) -> bool {
    dashboard.is_complete() && !dashboard.has_errors()
}

/// Refresh on an interval until Ctrl-C. Status stays cached for the
/// lifetime of `client`; workspaces are re-listed every cycle.
async fn watch(
    client: &Arc<StatusClient>,
    dashboard: &mut Dashboard,
    period: Duration,
    json: bool,
) -> Result<(), serde_json::Error> {
    let cancel_token = CancellationToken::new();

    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping dashboard");
            signal_token.cancel();
        }
    });

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            () = cancel_token.cancelled() => return Ok(()),
        }

        tokio::select! {
            () = refresh(client, dashboard) => {}
            () = cancel_token.cancelled() => return Ok(()),
        }

        print_dashboard(dashboard, json)?;
    }
}

fn print_dashboard(dashboard: &Dashboard, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", render::render_json(dashboard)?);
    } else {
        print!("{}", render::render_text(dashboard));
    }
    Ok(())
}
