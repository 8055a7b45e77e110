use crate::config::{ClientConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
use crate::services::views::tabs::Tab;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// One day; longer waits are almost certainly a typo.
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

#[derive(Debug, Parser)]
#[command(name = "mri-lense", version, about = "Brain MRI tumor classification client")]
pub struct Cli {
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL, help = "Classification service base URL")]
    pub base_url: String,

    #[arg(
        long,
        global = true,
        default_value_t = 180,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS),
        help = "Abort the request after this many seconds"
    )]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload an MRI image and show the analysis
    Analyze(AnalyzeArgs),
    /// Probe the service's health endpoint
    Health,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[arg(long, help = "JPG or PNG image to analyze")]
    pub file: PathBuf,

    #[arg(long, default_value = "gradcam", help = "Tab to show: gradcam|quantum|features|confidence|clinical")]
    pub tab: Tab,

    #[arg(long, default_value_t = false, help = "Ask the service for activation maps")]
    pub gradcam: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, help = "Write decoded activation maps into this directory")]
    pub maps_dir: Option<PathBuf>,
}

impl Cli {
    pub fn client_config(&self, gradcam: bool) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            gradcam,
        }
    }
}
