use colored::{ColoredString, Colorize};

/// Active inline formatting at a point in a paragraph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub link: bool,
}

/// Terminal palette for rendered documents.
///
/// A disabled scheme returns every string untouched, so rendering without
/// colour yields plain text.
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    enabled: bool,
}

impl ColorScheme {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, text: &str, style: impl FnOnce(ColoredString) -> ColoredString) -> String {
        if self.enabled {
            style(text.normal()).to_string()
        } else {
            text.to_string()
        }
    }

    /// Heading text; weight and colour fade with depth
    pub fn heading(&self, level: usize, text: &str) -> String {
        match level {
            1 => self.paint(text, |s| s.bright_cyan().bold().underline()),
            2 => self.paint(text, |s| s.cyan().bold()),
            _ => self.paint(text, |s| s.blue().bold()),
        }
    }

    pub fn inline(&self, text: &str, style: InlineStyle) -> String {
        self.paint(text, |mut s| {
            if style.bold {
                s = s.bold();
            }
            if style.italic {
                s = s.italic();
            }
            if style.strike {
                s = s.strikethrough();
            }
            if style.link {
                s = s.blue().underline();
            }
            s
        })
    }

    /// Inline code span (yellow)
    pub fn code(&self, text: &str) -> String {
        self.paint(text, |s| s.yellow())
    }

    /// Body of a code block (green)
    pub fn code_block(&self, text: &str) -> String {
        self.paint(text, |s| s.green())
    }

    /// Muted text (bright black/gray)
    pub fn muted(&self, text: &str) -> String {
        self.paint(text, |s| s.bright_black())
    }

    /// List bullet or number
    pub fn marker(&self, text: &str) -> String {
        self.paint(text, |s| s.magenta())
    }

    /// Print an error indicator
    pub fn print_error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning indicator
    pub fn print_warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }
}
