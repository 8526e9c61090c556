use std::collections::BTreeMap;

use super::sink::TraceTag;

/// An ANSI SGR sequence, e.g. `"\x1b[96m"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style(pub String);

impl Style {
    pub const RESET: &'static str = "\x1b[0m";

    pub fn new(code: &str) -> Self {
        Self(code.to_string())
    }

    pub fn cyan() -> Self {
        Self::new("\x1b[96m")
    }
    pub fn green() -> Self {
        Self::new("\x1b[92m")
    }
    pub fn yellow() -> Self {
        Self::new("\x1b[93m")
    }
    pub fn red() -> Self {
        Self::new("\x1b[91m")
    }
    pub fn magenta() -> Self {
        Self::new("\x1b[95m")
    }
    pub fn bold() -> Self {
        Self::new("\x1b[1m")
    }
    pub fn dim() -> Self {
        Self::new("\x1b[2m")
    }
}

/// Colouring applied by the trace emitter. Disabled palettes render plain text.
#[derive(Debug, Clone)]
pub struct TracePalette {
    pub enabled: bool,
    pub styles: BTreeMap<TraceTag, Style>,
}

impl TracePalette {
    pub fn plain() -> Self {
        Self {
            enabled: false,
            styles: BTreeMap::new(),
        }
    }

    pub fn ansi() -> Self {
        let styles = BTreeMap::from([
            (TraceTag::Event, Style::dim()),
            (TraceTag::Start, Style::bold()),
            (TraceTag::Agent, Style::cyan()),
            (TraceTag::ToolCall, Style::yellow()),
            (TraceTag::ToolResult, Style::green()),
            (TraceTag::A2aTransfer, Style::magenta()),
            (TraceTag::Escalate, Style::red()),
            (TraceTag::FinalResponse, Style::green()),
            (TraceTag::Reasoning, Style::dim()),
            (TraceTag::Done, Style::bold()),
            (TraceTag::State, Style::dim()),
            (TraceTag::Report, Style::green()),
        ]);
        Self {
            enabled: true,
            styles,
        }
    }

    pub fn with_enabled(enabled: bool) -> Self {
        if enabled {
            Self::ansi()
        } else {
            Self::plain()
        }
    }

    /// Wraps `text` in the style registered for `tag`.
    pub fn paint(&self, tag: TraceTag, text: &str) -> String {
        match self.styles.get(&tag) {
            Some(style) if self.enabled => format!("{}{}{}", style.0, text, Style::RESET),
            _ => text.to_string(),
        }
    }

    /// Bold highlight for agent names inside a line.
    pub fn emphasis(&self, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", Style::bold().0, text, Style::RESET)
        } else {
            text.to_string()
        }
    }

    pub fn red(&self, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", Style::red().0, text, Style::RESET)
        } else {
            text.to_string()
        }
    }
}

impl Default for TracePalette {
    fn default() -> Self {
        Self::plain()
    }
}
