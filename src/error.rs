//! Error and diagnostic types

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::context::ContextError;
use crate::generator::{ConfigError, GenerationError};
use crate::parser::ast::Span;

/// A problem in a template that rendering silently works around
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("unclosed block at {span:?}: `{marker}` has no matching end marker")]
    UnclosedBlock { span: Span, marker: String },

    #[error("stray end marker at {span:?}: `{marker}` closes nothing")]
    StrayClose { span: Span, marker: String },

    #[error("unknown marker at {span:?}: `{marker}`")]
    UnknownMarker { span: Span, marker: String },

    #[error("`{marker}` at {span:?} is outside any repeated block")]
    OutsideEach { span: Span, marker: String },

    #[error("block at {span:?} is nested too deeply: `{marker}`")]
    NestingTooDeep { span: Span, marker: String },
}

impl Diagnostic {
    pub fn span(&self) -> &Span {
        match self {
            Diagnostic::UnclosedBlock { span, .. }
            | Diagnostic::StrayClose { span, .. }
            | Diagnostic::UnknownMarker { span, .. }
            | Diagnostic::OutsideEach { span, .. }
            | Diagnostic::NestingTooDeep { span, .. } => span,
        }
    }

    fn help(&self) -> &'static str {
        match self {
            Diagnostic::UnclosedBlock { .. } => "the marker is copied to the output as-is",
            Diagnostic::StrayClose { .. } => "remove it, or add the matching opener",
            Diagnostic::UnknownMarker { .. } => {
                "supported markers: {{name}}, {{this}}, {{#each key}}, {{#if key}}, {{#if (eq this \"value\")}}"
            }
            Diagnostic::OutsideEach { .. } => "only a repeated block has a current item",
            Diagnostic::NestingTooDeep { .. } => {
                "the block and its end marker are copied to the output as-is"
            }
        }
    }

    /// Format the diagnostic with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let span = self.span().clone();

        let result = Report::build(ReportKind::Warning, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(self.help())
                    .with_color(Color::Yellow),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match result {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("{}: {}", filename, self),
        }
    }
}

/// Errors that end a CLI invocation
///
/// Each category maps to its own exit code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Configuration(#[from] ConfigError),

    #[error("missing API key: pass --api-key or set ANTHROPIC_API_KEY")]
    MissingApiKey,

    #[error("cannot read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("input file {} is empty", path.display())]
    EmptyInput { path: PathBuf },

    #[error("cannot load context {}: {source}", path.display())]
    Context {
        path: PathBuf,
        source: ContextError,
    },

    #[error("question generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AppError {
    /// Process exit code for this failure category
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Configuration(_) | AppError::MissingApiKey => 2,
            AppError::Input { .. } | AppError::EmptyInput { .. } | AppError::Context { .. } => 3,
            AppError::Generation(_) => 4,
            AppError::Output { .. } => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_includes_marker_and_filename() {
        let source = "Salut {{#if x}} toi";
        let diag = Diagnostic::UnclosedBlock {
            span: 6..15,
            marker: "{{#if x}}".to_string(),
        };
        let report = diag.format(source, "prompt.hbs");
        assert!(report.contains("prompt.hbs"));
        assert!(report.contains("{{#if x}}"));
        assert!(report.contains("copied to the output"));
    }

    #[test]
    fn test_exit_codes_are_distinct_per_category() {
        let io = || std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let codes = [
            AppError::MissingApiKey.exit_code(),
            AppError::Input {
                path: "in.txt".into(),
                source: io(),
            }
            .exit_code(),
            AppError::Generation(GenerationError::UnexpectedResponse("tool_use".into()))
                .exit_code(),
            AppError::Output {
                path: "out.yaml".into(),
                source: io(),
            }
            .exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_input_message() {
        let err = AppError::EmptyInput {
            path: "texte.txt".into(),
        };
        assert_eq!(err.to_string(), "input file texte.txt is empty");
    }
}
