//! Text rendering of session snapshots

use ai_cartoonizer::{ProcessingState, SessionSnapshot, Style};
use std::fmt::Write;

/// Render a snapshot as a short multi-line status block
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    let _ = write!(out, "[{}] style: {}", snapshot.state, snapshot.selected_style.label());
    if !snapshot.style_editable() {
        out.push_str(" (locked)");
    }
    out.push('\n');

    match (&snapshot.source_name, snapshot.source_len) {
        (Some(name), Some(len)) => {
            let media_type = snapshot.source_media_type.as_deref().unwrap_or("?");
            let _ = writeln!(out, "  source: {name} ({media_type}, {})", human_size(len));
        }
        _ => out.push_str("  source: none, drop an image to begin\n"),
    }

    match snapshot.state {
        ProcessingState::Processing => out.push_str("  generating your cartoon...\n"),
        _ if snapshot.request_in_flight => {
            out.push_str("  an earlier request is still finishing, generate is paused\n");
        }
        ProcessingState::Completed => {
            if let Some(len) = snapshot.result_len {
                let _ = writeln!(out, "  result: {} ready to download", human_size(len));
            }
        }
        _ => {}
    }

    if let Some(error) = &snapshot.last_error {
        for line in error.lines().filter(|l| !l.is_empty()) {
            let _ = writeln!(out, "  ! {line}");
        }
    }

    out
}

/// Help text for the interactive shell
pub fn help_text() -> String {
    let styles: Vec<&str> = Style::ALL.iter().map(|s| s.wire_name()).collect();
    format!(
        "Commands:\n\
         \x20 drop <path>...   select an image (only the first path is used)\n\
         \x20 style <name>     choose a style ({})\n\
         \x20 generate         send the image to the service\n\
         \x20 download         save the result\n\
         \x20 reset            start over\n\
         \x20 status           show the current state\n\
         \x20 help             show this help\n\
         \x20 quit             exit",
        styles.join(", ")
    )
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Display-only rounding of byte counts"
)]
fn human_size(len: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let bytes = len as f64;
    if bytes < KB {
        format!("{len} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.2} MB", bytes / MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn snapshot(state: ProcessingState) -> SessionSnapshot {
        SessionSnapshot {
            session_id: Uuid::nil(),
            state,
            selected_style: Style::Sketch,
            source_name: Some("cat.png".to_string()),
            source_media_type: Some("image/png".to_string()),
            source_len: Some(2048),
            result_len: None,
            request_in_flight: false,
            last_error: None,
        }
    }

    #[test]
    fn renders_source_and_style() {
        let text = render_snapshot(&snapshot(ProcessingState::Ready));
        assert!(text.starts_with("[ready] style: Sketch"));
        assert!(text.contains("cat.png (image/png, 2.0 KB)"));
    }

    #[test]
    fn processing_locks_style() {
        let text = render_snapshot(&snapshot(ProcessingState::Processing));
        assert!(text.contains("(locked)"));
        assert!(text.contains("generating"));
    }

    #[test]
    fn abandoned_request_is_mentioned() {
        let mut ready = snapshot(ProcessingState::Ready);
        ready.request_in_flight = true;
        assert!(render_snapshot(&ready).contains("earlier request is still finishing"));
    }

    #[test]
    fn errors_are_rendered_line_by_line() {
        let mut failed = snapshot(ProcessingState::Failed);
        failed.last_error = Some("Failed to generate.\n\nService returned status 500: oom".to_string());
        let text = render_snapshot(&failed);
        assert!(text.contains("  ! Failed to generate."));
        assert!(text.contains("  ! Service returned status 500: oom"));
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(12), "12 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.00 MB");
    }
}
