//! Terminal styling for the `wtr` binary.
//!
//! Messages use `color_print::cformat!` with HTML-like tags; the constants
//! here cover the cases where a style is chosen at runtime (list columns).
//!
//! ```
//! use color_print::cformat;
//! use wtr::styling::SUCCESS_EMOJI;
//!
//! let branch = "feature";
//! let msg = cformat!("{SUCCESS_EMOJI} <green>Created worktree <bold>{branch}</></>");
//! ```

use anstyle::{AnsiColor, Color, Style};

/// Auto-detecting output that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::{eprintln, println};

/// Active checkout in listings (magenta + bold)
pub const CURRENT: Style = Style::new()
    .bold()
    .fg_color(Some(Color::Ansi(AnsiColor::Magenta)));

/// Uncommitted changes marker
pub const DIRTY: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Commits ahead of upstream
pub const AHEAD: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));

/// Commits behind upstream
pub const BEHIND: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

/// Secondary columns (paths, times)
pub const DIM: Style = Style::new().dimmed();

pub const PROGRESS_EMOJI: &str = "🔄";
pub const SUCCESS_EMOJI: &str = "✅";
pub const ERROR_EMOJI: &str = "❌";
pub const WARNING_EMOJI: &str = "🟡";
pub const HINT_EMOJI: &str = "💡";
pub const INFO_EMOJI: &str = "⚪";
pub const PROMPT_EMOJI: &str = "❓";

/// Wrap `text` in `style`, or return it unchanged when `style` is `None`.
pub fn paint(text: &str, style: Option<Style>) -> String {
    match style {
        Some(style) => format!("{style}{text}{style:#}"),
        None => text.to_string(),
    }
}
