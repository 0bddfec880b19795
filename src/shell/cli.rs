//! Command-line arguments

use ai_cartoonizer::Style;
use ai_cartoonizer::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// Turn a photo into a cartoon using a stylization service
#[derive(Debug, Parser)]
#[command(name = "ai-cartoonizer", version, about, long_about = None)]
pub struct Args {
    /// Image to cartoonize (omit to start the interactive shell)
    pub image: Option<PathBuf>,

    /// Style to apply: whitebox, sketch or oilpaint
    #[arg(short, long)]
    pub style: Option<Style>,

    /// Directory to save the result into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Base URL of the stylization service
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Start the interactive shell even when an image is given
    #[arg(short, long)]
    pub interactive: bool,

    /// Log to stderr instead of the rotating log file
    #[arg(long)]
    pub no_log_file: bool,

    /// Persist --endpoint and --output-dir to the configuration file
    #[arg(long)]
    pub save_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.service.base_url.clone_from(endpoint);
        }
        if let Some(dir) = &self.output_dir {
            config.preferences.download_dir.clone_from(dir);
        }
        if self.no_log_file {
            config.preferences.log_to_file = false;
        }
    }

    /// Whether the interactive shell should run
    pub fn wants_shell(&self) -> bool {
        self.interactive || self.image.is_none()
    }
}
