/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod config;
mod error;
mod fixtures;
mod sink;

use cega_relay::{channel_source, QueueSink, RelayEngine, RelayReport};
use clap::Parser;
use config::{Config, Overrides};
use error::AppError;
use sink::JsonLinesSink;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "mock-cega")]
#[command(about = "Replays Local EGA queue traffic through a mock Central EGA relay")]
struct Cli {
    /// json5 config file
    #[arg(long, env = "MOCK_CEGA_CONFIG")]
    config: Option<PathBuf>,

    /// JSON-lines traffic to replay, overrides `fixtures` from the config
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Envelope output file, overrides `output` from the config
    #[arg(long)]
    output: Option<PathBuf>,

    /// Completed messages per dataset release, overrides the config value
    #[arg(long)]
    release_threshold: Option<usize>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            fixtures: self.fixtures.clone(),
            output: self.output.clone(),
            release_threshold: self.release_threshold,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // envelopes go to stdout
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<RelayReport, AppError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply(cli.overrides());

    let fixtures_path = config.fixtures.clone().ok_or(AppError::NoFixtures)?;
    let records = fixtures::load(&fixtures_path)?;

    let sink: Arc<dyn QueueSink> = match &config.output {
        Some(path) => Arc::new(JsonLinesSink::create(path).await?),
        None => Arc::new(JsonLinesSink::stdout()),
    };

    let mut engine = RelayEngine::new(config.relay_config()?);
    let mut senders = BTreeMap::new();
    for origin in &config.origins {
        let (sender, source) = channel_source(config.queue_capacity);
        engine.add_origin(*origin, source)?;
        senders.insert(*origin, sender);
    }

    let shutdown = engine.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping consumption");
            shutdown.shutdown();
        }
    });

    let feeder = tokio::spawn(fixtures::replay(records, senders));
    let report = engine.run(sink).await?;

    match feeder.await {
        Ok(sent) => debug!(sent, "fixture replay finished"),
        Err(err) => warn!(err = %err, "fixture replay did not finish"),
    }
    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            for (origin, stats) in &report.per_origin {
                info!(
                    origin = %origin,
                    received = stats.received,
                    published = stats.published,
                    "origin summary"
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(err = %err, "mock-cega failed");
            ExitCode::FAILURE
        }
    }
}
