//! `StudyMate` CLI - question answering over local study documents
use std::io;

use anyhow::Result;
use clap::Parser as _;
use studymate_cli::{Cli, run};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    run(Cli::parse()).await
}
