//! Character display collaborator.
//!
//! The protocol core never depends on display geometry: it hands plain text
//! plus a wrap-mode hint to a [`Panel`] and moves on. Rendering is
//! best-effort. The panel has two areas, a one-line status strip for
//! connection-state summaries and a larger text area for notifications.

use tracing::debug;

/// Rendering policy for long text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Fixed-width chunking, no word-boundary awareness.
    Hard,
    /// Break at whitespace; a single token wider than the display is
    /// hard-split.
    Word,
    /// Verbatim - the caller supplied its own line breaks.
    Pre,
}

/// A dual-area display surface consumed by the core.
pub trait Panel {
    /// Render notification text into the main area.
    fn render(&mut self, text: &str, mode: WrapMode);

    /// Update the one-line connection-status strip.
    fn set_status(&mut self, text: &str);
}

/// Panel backed by the local terminal.
pub struct ConsolePanel {
    width: usize,
}

impl ConsolePanel {
    /// Create a console panel wrapping at `width` columns.
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Panel for ConsolePanel {
    fn render(&mut self, text: &str, mode: WrapMode) {
        debug!(?mode, raw = %text, "render");
        let wrapped = match mode {
            WrapMode::Hard => hard_wrap(text, self.width),
            WrapMode::Word => word_wrap(text, self.width),
            WrapMode::Pre => text.to_owned(),
        };
        println!("{wrapped}");
    }

    fn set_status(&mut self, text: &str) {
        println!("* {text}");
    }
}

/// Chunk `text` into `width`-character lines with no word-boundary awareness.
pub fn hard_wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_owned();
    }
    let mut out = String::new();
    for (i, c) in text.chars().enumerate() {
        if i > 0 && i % width == 0 {
            out.push('\n');
        }
        out.push(c);
    }
    out
}

/// Wrap `text` at whitespace boundaries so no line exceeds `width`
/// characters, unless a single token is wider than `width`, in which case
/// that token is hard-split.
///
/// Every break consumes exactly one separating space; any further spaces in
/// a run stay in the output, so rejoining the lines with single spaces
/// reconstructs the input (hard splits excepted).
pub fn word_wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_owned();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;
    // Empty tokens stand for the extra spaces in a run, so the line holding
    // the first token is distinct from no line at all.
    let mut fresh = true;

    for word in text.split(' ') {
        let word_len = word.chars().count();

        if word_len > width {
            if !fresh {
                lines.push(std::mem::take(&mut line));
            }
            let mut rest = word;
            while rest.chars().count() > width {
                let split = rest
                    .char_indices()
                    .nth(width)
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                lines.push(rest[..split].to_owned());
                rest = &rest[split..];
            }
            line = rest.to_owned();
            line_len = line.chars().count();
            fresh = false;
            continue;
        }

        if fresh {
            line.push_str(word);
            line_len = word_len;
            fresh = false;
        } else if line_len + 1 + word_len <= width {
            line.push(' ');
            line.push_str(word);
            line_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_len = word_len;
        }
    }

    if !fresh {
        lines.push(line);
    }
    lines.join("\n")
}
