//! Interactive shell
//!
//! Each line is one trigger on the session controller. Generation runs on a
//! worker thread so the shell stays responsive; state changes are printed by
//! a renderer thread fed from the controller's view channel.

use super::view::{help_text, render_snapshot};
use ai_cartoonizer::SessionController;
use ai_cartoonizer::SessionSnapshot;
use ai_cartoonizer::error::get_user_friendly_error;
use ai_cartoonizer::media::SourceFile;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drop one or more files
    Drop(Vec<PathBuf>),
    /// Select a style by name
    Style(String),
    /// Start generation
    Generate,
    /// Save the result
    Download,
    /// Start over
    Reset,
    /// Print the current snapshot
    Status,
    /// Print help
    Help,
    /// Leave the shell
    Quit,
}

/// Parse one input line; `Ok(None)` for blank lines
pub fn parse_command(line: &str) -> std::result::Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "drop" | "open" => {
            let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err("usage: drop <path>...".to_string());
            }
            Command::Drop(paths)
        }
        "style" => match words.next() {
            Some(name) => Command::Style(name.to_string()),
            None => return Err("usage: style <whitebox|sketch|oilpaint>".to_string()),
        },
        "generate" | "go" => Command::Generate,
        "download" | "save" => Command::Download,
        "reset" | "new" => Command::Reset,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}', type 'help'")),
    };
    Ok(Some(command))
}

/// Run the shell until `quit` or end of input
pub fn run(
    controller: Arc<SessionController>,
    updates: Receiver<SessionSnapshot>,
    download_dir: &Path,
) -> Result<()> {
    let renderer = std::thread::spawn(move || {
        for snapshot in updates {
            print!("{}", render_snapshot(&snapshot));
            let _ = std::io::stdout().flush();
        }
    });

    println!("{}", help_text());
    print!("{}", render_snapshot(&controller.snapshot()));

    let mut workers: Vec<JoinHandle<()>> = Vec::new();
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        debug!("Shell command: {:?}", command);
        match command {
            Command::Drop(paths) => drop_paths(&controller, &paths),
            Command::Style(name) => {
                // Rejections show up in the next snapshot
                let _ = controller.select_style_named(&name);
            }
            Command::Generate => {
                // A second request while one is in flight is rejected as busy
                workers.retain(|handle| !handle.is_finished());
                workers.push(spawn_generate(&controller));
            }
            Command::Download => match controller.download() {
                Some(artifact) => match artifact.save_to(download_dir) {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(e) => println!("{}", get_user_friendly_error(&e)),
                },
                None => println!("Nothing to download yet"),
            },
            Command::Reset => controller.reset(),
            Command::Status => print!("{}", render_snapshot(&controller.snapshot())),
            Command::Help => println!("{}", help_text()),
            Command::Quit => break,
        }
    }

    let idle = workers.iter().all(JoinHandle::is_finished);
    if !idle {
        warn!("Leaving shell with a request still in flight");
    }
    info!("Shell closed");

    // The renderer ends once the last controller reference (and its sender) is gone
    drop(controller);
    if idle {
        let _ = renderer.join();
    }
    Ok(())
}

fn drop_paths(controller: &SessionController, paths: &[PathBuf]) {
    controller.drag_enter();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match SourceFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(e) => println!("{}: {}", path.display(), get_user_friendly_error(&e)),
        }
    }

    let accepted = !files.is_empty() && controller.drop_files(files).is_ok();
    if !accepted {
        controller.drag_leave();
    }
}

fn spawn_generate(controller: &Arc<SessionController>) -> JoinHandle<()> {
    let controller = Arc::clone(controller);
    std::thread::spawn(move || {
        // Outcome is reported through the view channel
        if let Err(e) = controller.generate() {
            debug!("Generate finished with error: {}", e);
        }
    })
}
