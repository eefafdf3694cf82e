//! Terminal emitter.
//!
//! Human-readable diagnostic output with optional ANSI color. When
//! source text is provided, renders source snippets with underlines;
//! falls back to byte-offset output otherwise.

use std::io::Write;

use crate::{Diagnostic, LineOffsetTable, Severity};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m";
    pub const RESET: &str = "\x1b[0m";
}

/// Color output mode for the terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Use colors when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Writes diagnostics to a terminal-style sink.
pub struct TerminalEmitter<W: Write> {
    out: W,
    colors: bool,
    source: Option<String>,
    file_path: Option<String>,
    line_table: Option<LineOffsetTable>,
    error_count: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(out: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            out,
            colors: mode.should_use_colors(is_tty),
            source: None,
            file_path: None,
            line_table: None,
            error_count: 0,
        }
    }

    /// Provide source text for snippet rendering.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.line_table = Some(LineOffsetTable::new(source));
        self.source = Some(source.to_owned());
        self
    }

    /// Provide the file path shown in the location line.
    #[must_use]
    pub fn with_file_path(mut self, path: &str) -> Self {
        self.file_path = Some(path.to_owned());
        self
    }

    fn severity_color(&self, severity: Severity) -> &'static str {
        if !self.colors {
            return "";
        }
        match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        }
    }

    fn reset(&self) -> &'static str {
        if self.colors {
            colors::RESET
        } else {
            ""
        }
    }

    fn bold(&self) -> &'static str {
        if self.colors {
            colors::BOLD
        } else {
            ""
        }
    }

    fn secondary(&self) -> &'static str {
        if self.colors {
            colors::SECONDARY
        } else {
            ""
        }
    }

    /// Emit one diagnostic.
    pub fn emit(&mut self, diag: &Diagnostic) {
        if diag.is_error() {
            self.error_count += 1;
        }
        // Header: error[E2001]: message
        let _ = writeln!(
            self.out,
            "{}{}[{}]{}{}: {}{}",
            self.severity_color(diag.severity),
            diag.severity.label(),
            diag.code,
            self.reset(),
            self.bold(),
            diag.message,
            self.reset(),
        );

        if let Some(span) = diag.span {
            self.emit_snippet(span);
        }

        for note in &diag.notes {
            let _ = writeln!(
                self.out,
                "  {}={} note: {}",
                self.secondary(),
                self.reset(),
                note
            );
        }
    }

    fn emit_snippet(&mut self, span: moose_ir::Span) {
        let (Some(source), Some(table)) = (&self.source, &self.line_table) else {
            let _ = writeln!(self.out, "  at byte offset {span}");
            return;
        };

        let (line, col) = table.line_col(source, span.start);
        let path = self.file_path.as_deref().unwrap_or("<input>");
        let _ = writeln!(
            self.out,
            "  {}-->{} {path}:{line}:{col}",
            self.secondary(),
            self.reset()
        );

        let Some(text) = table.line_text(source, line) else {
            return;
        };
        let gutter_width = line.to_string().len();
        let _ = writeln!(self.out, "{:width$} |", "", width = gutter_width);
        let _ = writeln!(self.out, "{line} | {text}");

        // Underline: clamp to the line the span starts on.
        let underline_len = (span.len().max(1) as usize).min(text.len().saturating_sub(col as usize - 1).max(1));
        let _ = writeln!(
            self.out,
            "{:width$} | {:pad$}{}{}{}",
            "",
            "",
            self.severity_color(Severity::Error),
            "^".repeat(underline_len),
            self.reset(),
            width = gutter_width,
            pad = col as usize - 1,
        );
    }

    /// Print the closing error-count summary.
    pub fn finish(&mut self) {
        if self.error_count > 0 {
            let plural = if self.error_count == 1 { "" } else { "s" };
            let _ = writeln!(
                self.out,
                "{}error{}: {} error{plural} emitted",
                self.severity_color(Severity::Error),
                self.reset(),
                self.error_count,
            );
        }
        let _ = self.out.flush();
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use moose_ir::Span;

    fn render(diag: &Diagnostic, source: Option<&str>) -> String {
        let mut buf = Vec::new();
        {
            let mut emitter = TerminalEmitter::new(&mut buf, ColorMode::Never, false);
            if let Some(src) = source {
                emitter = emitter.with_source(src).with_file_path("test.moose");
            }
            emitter.emit(diag);
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn renders_header_without_source() {
        let diag = Diagnostic::error(ErrorCode::E2002, "unknown name `x`");
        let out = render(&diag, None);
        assert!(out.starts_with("error[E2002]: unknown name `x`"));
    }

    #[test]
    fn renders_snippet_with_caret() {
        let src = "a = 1\nb = c + 1\n";
        let diag =
            Diagnostic::error(ErrorCode::E2002, "unknown name `c`").with_span(Span::new(10, 11));
        let out = render(&diag, Some(src));
        assert!(out.contains("test.moose:2:5"), "{out}");
        assert!(out.contains("b = c + 1"), "{out}");
        assert!(out.contains("    ^"), "{out}");
    }

    #[test]
    fn notes_are_listed() {
        let diag = Diagnostic::error(ErrorCode::E2001, "mismatch").with_note("expected Int");
        let out = render(&diag, None);
        assert!(out.contains("note: expected Int"));
    }
}
