//! Classification of raw pollen severity codes into display categories.

/// Suffix that resets every terminal color set by [`Color::prefix`].
pub const RESET: &str = "\x1b[0m";

/// Terminal colors used to highlight severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Green,
    Orange,
    Red,
}

impl Color {
    /// ANSI escape sequence that switches to this color.
    pub fn prefix(&self) -> &'static str {
        match self {
            Color::Green => "\x1b[92m",
            Color::Orange => "\x1b[93m",
            Color::Red => "\x1b[91m",
        }
    }

    /// Wrap `text` in this color's prefix and the reset suffix.
    pub fn paint(&self, text: &str) -> String {
        format!("{}{text}{RESET}", self.prefix())
    }
}

/// Semantic bucket of a severity code.
///
/// `LowA` and `LowB` share a color but stay distinct, since the service
/// reports them as different levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityCategory {
    None,
    LowA,
    LowB,
    High,
}

impl SeverityCategory {
    /// Map a raw code (`"0"`..`"3"`) to its category. Anything else is unclassified.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(SeverityCategory::None),
            "1" => Some(SeverityCategory::LowA),
            "2" => Some(SeverityCategory::LowB),
            "3" => Some(SeverityCategory::High),
            _ => None,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            SeverityCategory::None => Color::Green,
            SeverityCategory::LowA | SeverityCategory::LowB => Color::Orange,
            SeverityCategory::High => Color::Red,
        }
    }
}

/// Classify a raw code into its category and display color.
///
/// Returns `None` for unrecognized codes; those are rendered as plain text.
pub fn classify(code: &str) -> Option<(SeverityCategory, Color)> {
    SeverityCategory::from_code(code).map(|category| (category, category.color()))
}

/// Decorate `text` with the color of `category`, or return it unchanged when
/// there is no category.
pub fn format(text: &str, category: Option<SeverityCategory>) -> String {
    match category {
        Some(category) => category.color().paint(text),
        None => text.to_string(),
    }
}

/// Format a raw code with its own color.
pub fn format_code(code: &str) -> String {
    format(code, SeverityCategory::from_code(code))
}
