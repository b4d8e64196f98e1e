mod agent;
mod apply;
mod backend;
mod cli;
mod config;
mod context;
mod extract;
mod model;
mod pipeline;
mod tools;
mod tracker;

use std::process;

use tracing_subscriber::{EnvFilter, filter::LevelFilter};

fn main() {
    init_tracing();

    if let Err(e) = cli::run() {
        tracing::error!("{e}");
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays clean for command output.
///
/// `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
