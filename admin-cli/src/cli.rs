use std::path::PathBuf;

use clap::{Parser, Subcommand};
use landcover_core::types::DEFAULT_PREDICT_URL;
use url::Url;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
    /// Prediction endpoint images are submitted to
    #[arg(env = "PREDICT_URL", long, short, default_value = DEFAULT_PREDICT_URL)]
    pub endpoint: Url,
    /// Base URL of the landcover server
    #[arg(env = "LANDCOVER_URL", long, short, default_value = "http://localhost:3000/")]
    pub server: Url,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify image files [alias: p]
    #[command(alias = "p")]
    Predict {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check that the server is up
    Health,
}
