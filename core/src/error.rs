//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Resolution itself only ever fails with `UnsupportedExpressionKind`; the
/// other variants belong to the textual front end and manifest loading.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// The classifier met an expression shape it cannot describe.
    /// Carries the textual rendering of the expression.
    #[from(ignore)]
    #[display("Unsupported expression kind: {_0}")]
    UnsupportedExpressionKind(String),

    /// A type expression could not be parsed from text.
    #[from(ignore)]
    #[display("Parse Error at offset {offset}: {message}")]
    Parse {
        /// Byte offset into the source text.
        offset: usize,
        /// What was expected.
        message: String,
    },

    /// The registry manifest is malformed.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        // String defaults to General, never to the resolution error
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_unsupported_display_embeds_expression() {
        let err = AppError::UnsupportedExpressionKind("func(int) error".into());
        assert_eq!(
            err.to_string(),
            "Unsupported expression kind: func(int) error"
        );
    }

    #[test]
    fn test_parse_display() {
        let err = AppError::Parse {
            offset: 3,
            message: "expected ']'".into(),
        };
        assert_eq!(err.to_string(), "Parse Error at offset 3: expected ']'");
    }
}
