pub mod changelog;
pub mod cli;
pub mod columns;
pub mod compare;
pub mod data;
pub mod dataset;
pub mod error;
pub mod io_utils;
pub mod mapping;
pub mod matcher;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod schema;
pub mod table;
pub mod workbook;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("substation_recon", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command: {:?}", cli.command);
    match cli.command {
        Commands::Run(args) => pipeline::execute(&args),
        Commands::Columns(args) => columns::execute(&args),
        Commands::Mapping(args) => mapping::execute(&args),
    }
}
