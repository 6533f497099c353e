//! Owned parse diagnostics and their `ariadne` rendering.

use super::parser::ParseError;
use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};
use std::fmt;
use std::ops::Range;

/// A parse error detached from the source it was produced from.
///
/// `span` is a byte range into that source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Range<usize>,
    pub message: String,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(span: Range<usize>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            span,
            reason: message.clone(),
            message,
        }
    }

    pub fn from_rich<T: fmt::Display>(error: &ParseError<'_, T>) -> Self {
        Self {
            span: error.span().into_range(),
            message: error.to_string(),
            reason: error.reason().to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

/// Renders `diagnostics` against `source_code` as plain-text reports.
pub fn render(diagnostics: &[Diagnostic], filename: &str, source_code: &str) -> String {
    let mut report_bytes = Vec::new();
    for diagnostic in diagnostics {
        let written = Report::build(ReportKind::Error, (filename, diagnostic.span.clone()))
            .with_config(
                Config::default()
                    .with_color(false)
                    .with_index_type(IndexType::Byte),
            )
            .with_message(&diagnostic.message)
            .with_label(Label::new((filename, diagnostic.span.clone())).with_message(&diagnostic.reason))
            .finish()
            .write((filename, Source::from(source_code)), &mut report_bytes);
        if let Err(error) = written {
            log::warn!("Failed to render diagnostic '{}': {error}", diagnostic.message);
        }
    }
    String::from_utf8_lossy(&report_bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::parse;

    #[test]
    fn report_names_file_and_reason() {
        let source = "dup\nfrobnicate";
        let diagnostics = parse(source).unwrap_err();
        let report = render(&diagnostics, "broken.kl", source);
        assert!(report.contains("broken.kl"));
        assert!(report.contains("frobnicate"));
    }

    #[test]
    fn display_includes_span() {
        let diagnostic = Diagnostic::new(3..5, "Unexpected");
        assert_eq!(diagnostic.to_string(), "Unexpected at 3..5");
    }
}
