// Terminal rendering of the popup

use std::io::{self, BufRead, Write};
use verse_core::{PopupView, ViewState};

const PROGRESS_WIDTH: usize = 40;

pub struct TerminalView {
    /// Answer every confirmation with yes
    assume_yes: bool,
}

impl TerminalView {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl PopupView for TerminalView {
    fn update(&self, state: &ViewState) {
        tracing::debug!(
            loading = state.loading,
            error = state.error.as_deref(),
            "Popup state changed"
        );
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

pub fn render_state(state: &ViewState) -> String {
    let mut out = String::new();

    if let Some(error) = &state.error {
        out.push_str(&format!("! {}\n", error));
    }
    if let Some(notice) = &state.notice {
        out.push_str(&format!("* {}\n", notice));
    }

    if let Some(verse) = &state.verse {
        out.push_str(&format!("{}\n{}\n\n", verse.chapter_title, verse.revelation));
        if state.bismillah {
            out.push_str("بِسْمِ ٱللَّهِ ٱلرَّحْمَـٰنِ ٱلرَّحِيمِ\n\n");
        }
        if state.sajda_warning {
            out.push_str("(This verse contains a sajda - prostration)\n\n");
        }
        out.push_str(&format!("{}\n\n{}\n\n{}\n", verse.arabic, verse.translation, verse.meta));
    }

    out.push_str(&format!("{} {:.2}%\n", progress_bar(state.progress), state.progress));
    out
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use verse_core::VerseDisplay;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(40)));
        assert_eq!(progress_bar(100.0), format!("[{}]", "#".repeat(40)));
        assert_eq!(progress_bar(250.0), format!("[{}]", "#".repeat(40)));
    }

    #[test]
    fn test_render_verse() {
        let state = ViewState {
            bismillah: true,
            verse: Some(VerseDisplay {
                arabic: "arabic".to_string(),
                translation: "translation".to_string(),
                chapter_title: "title".to_string(),
                revelation: "Revealed in Mecca".to_string(),
                meta: "Juz 1 | Page 2 | Line 3".to_string(),
            }),
            progress: 50.0,
            ..ViewState::default()
        };
        let text = render_state(&state);
        assert!(text.starts_with("title\nRevealed in Mecca\n"));
        assert!(text.contains("بِسْمِ"));
        assert!(text.contains("Juz 1 | Page 2 | Line 3"));
        assert!(text.ends_with("50.00%\n"));
    }

    #[test]
    fn test_render_error_only() {
        let state = ViewState {
            error: Some("Failed to load verse.".to_string()),
            ..ViewState::default()
        };
        let text = render_state(&state);
        assert!(text.starts_with("! Failed to load verse.\n"));
        assert!(!text.contains("Juz"));
    }
}
