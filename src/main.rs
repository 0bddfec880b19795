//! `ai-cartoonizer` - Turn photos into cartoons through a stylization service
//!
//! Runs either a one-shot conversion (`ai-cartoonizer photo.jpg --style sketch`)
//! or an interactive shell that drives a single session step by step.

// Terminal front end is only in the binary, not the library
mod shell;

use ai_cartoonizer::{
    SessionController, SourceFile,
    config::{AppConfig, ConfigManager},
    error::{CartoonizerError, get_user_friendly_error},
    service::HttpStyleService,
    utils::{self, LogTarget},
};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use shell::Args;
use std::path::Path;
use std::sync::{Arc, mpsc};
use tracing::{debug, error, info, warn};

/// Capacity of the snapshot channel between controller and shell renderer
const VIEW_QUEUE_CAPACITY: usize = 32;

/// Main entry point for the application
///
/// Loads configuration, applies command-line overrides, initializes logging,
/// and hands a fresh session to either the one-shot runner or the shell.
fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = ConfigManager::load().context("Failed to load application configuration")?;
    let mut config = loaded.config;
    args.apply_overrides(&mut config);

    let log_target = if config.preferences.log_to_file {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    utils::init_logging(log_target).context("Failed to initialize logging system")?;

    // Config fallbacks happened before a subscriber existed
    for warning in &loaded.warnings {
        warn!("{}", warning);
        if log_target == LogTarget::File {
            eprintln!("Warning: {warning}");
        }
    }

    info!(
        "Using service {} and download directory {}",
        config.service.base_url,
        config.preferences.download_dir.display()
    );

    if args.save_config {
        ConfigManager::save(&config).context("Failed to save configuration")?;
        println!("Configuration saved to {}", ConfigManager::get_config_path().display());
    }

    ai_cartoonizer::artifact::ensure_writable_dir(&config.preferences.download_dir)
        .map_err(|e| user_error(&e))?;

    let service = HttpStyleService::new(&config.service.base_url)
        .context("Failed to create stylization service client")?;

    if args.wants_shell() {
        run_shell(&args, &config, service)
    } else {
        run_once(&args, &config, service)
    }
}

fn run_shell(args: &Args, config: &AppConfig, service: HttpStyleService) -> Result<()> {
    let (view_tx, view_rx) = mpsc::sync_channel(VIEW_QUEUE_CAPACITY);
    let controller = Arc::new(SessionController::new(Arc::new(service)).with_view_sender(view_tx));

    if let Some(style) = args.style {
        // Rejections show up in the first snapshot
        if let Err(e) = controller.select_style(style) {
            debug!("Initial style not applied: {}", e);
        }
    }
    if let Some(image) = &args.image {
        preload(&controller, image);
    }

    shell::repl::run(controller, view_rx, &config.preferences.download_dir)
}

fn preload(controller: &SessionController, image: &Path) {
    match SourceFile::from_path(image) {
        Ok(file) => {
            // Rejections show up in the first snapshot
            if let Err(e) = controller.submit_file(file) {
                debug!("Initial image not accepted: {}", e);
            }
        }
        Err(e) => println!("{}: {}", image.display(), get_user_friendly_error(&e)),
    }
}

fn run_once(args: &Args, config: &AppConfig, service: HttpStyleService) -> Result<()> {
    let image = args.image.as_deref().context("No image given")?;
    let style = args.style.unwrap_or_default();

    let controller = SessionController::new(Arc::new(service));

    let file = SourceFile::from_path(image)
        .map_err(|e| user_error(&e))
        .with_context(|| format!("Failed to read {}", image.display()))?;
    controller.drop_files(vec![file]).map_err(|e| user_error(&e))?;
    controller.select_style(style).map_err(|e| user_error(&e))?;

    println!("Cartoonizing {} with style {}...", image.display(), style.label());
    controller.generate().map_err(|e| {
        error!("Generation failed: {}", e);
        user_error(&e)
    })?;

    let artifact = controller
        .download()
        .context("Service reply did not produce a result")?;
    let path = artifact
        .save_to(&config.preferences.download_dir)
        .map_err(|e| user_error(&e))?;

    println!("Saved {}", path.display());
    Ok(())
}

fn user_error(error: &CartoonizerError) -> anyhow::Error {
    anyhow!(get_user_friendly_error(error))
}
