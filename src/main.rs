// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use olmctl::cli::Cli;
use olmctl::config::Config;
use olmctl::lifecycle::OpContext;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries command output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let action = cli.command.action();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(?config, "Configuration loaded");

    let root = OpContext::background();
    let interrupt = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let ctx = cli.op_context(&root);
    match cli.run(&ctx, &config).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to {}: {}", action, e);
            ExitCode::FAILURE
        }
    }
}
