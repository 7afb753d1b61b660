//! Text shown by the CLI.

use keepawake_core::{FAKE_SUCCESS_ENV, KEEP_PRESENTING};

const BOX_WIDTH: usize = 54;

/// What the banner shows about the running session.
#[derive(Debug, Clone)]
pub struct Session {
    pub mode_name: String,
    pub method_name: String,
    pub fake_success: bool,
    pub started: chrono::DateTime<chrono::Local>,
}

fn boxed_line(content: &str) -> String {
    let width = content.chars().count();
    let padding = BOX_WIDTH.saturating_sub(width);
    format!(" ┃{content}{}┃", " ".repeat(padding))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    } else {
        text.to_string()
    }
}

/// Info box describing the active mode.
pub fn banner(session: &Session) -> String {
    let presenting = session.mode_name == KEEP_PRESENTING;
    let mark = |on: bool| if on { "x" } else { " " };

    let title = format!(" Mode: {} ", truncate(&session.mode_name, 43));
    let title_bars = BOX_WIDTH.saturating_sub(title.chars().count() + 2);

    let mut lines = vec![
        format!(" ┏━━{title}{}┓", "━".repeat(title_bars)),
        boxed_line(""),
        boxed_line(&format!("  [{}] Programs keep running", mark(true))),
        boxed_line(&format!(
            "  [{}] Display kept on, screenlock disabled",
            mark(presenting)
        )),
        boxed_line(""),
        boxed_line(&format!("   Method: {}", truncate(&session.method_name, 42))),
        boxed_line(&format!(
            "   Started: {}",
            session.started.format("%Y-%m-%d %H:%M:%S")
        )),
        format!(" ┗{}┛", "━".repeat(BOX_WIDTH)),
    ];

    if session.fake_success {
        lines.push(String::new());
        lines.push(format!(
            "WARNING: You are using the {FAKE_SUCCESS_ENV}. The system is NOT kept awake."
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(mode: &str, fake_success: bool) -> Session {
        Session {
            mode_name: mode.to_string(),
            method_name: "systemd-inhibit".to_string(),
            fake_success,
            started: chrono::Local::now(),
        }
    }

    #[test]
    fn test_banner_lines_have_equal_width() {
        let text = banner(&session("keep.running", false));
        let widths: Vec<usize> = text.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}");
        assert!(text.contains("[x] Programs keep running"));
        assert!(text.contains("[ ] Display kept on"));
        assert!(text.contains("Method: systemd-inhibit"));
    }

    #[test]
    fn test_presenting_marks_display() {
        let text = banner(&session("keep.presenting", false));
        assert!(text.contains("[x] Display kept on"));
    }

    #[test]
    fn test_fake_success_warning() {
        let text = banner(&session("keep.running", true));
        assert!(text.contains("NOT kept awake"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 5), "ab...");
        assert_eq!(truncate("abc", 5), "abc");
    }
}
