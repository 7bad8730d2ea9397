//! # Error Handling
//!
//! Provides the `AppError` enum for the failures that abort a whole file.
//! Per-directive problems are not errors; they are recorded in the
//! [`Report`](crate::report::Report) instead.

use derive_more::{Display, From};

/// The fatal error kinds of a single-file transformation.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// The input bytes are not UTF-8 and cannot be parsed as Go source.
    #[display("Source Parse Error: input is not valid UTF-8 ({_0})")]
    Utf8(std::str::Utf8Error),

    /// The input text could not be parsed into a structural model.
    #[from(ignore)]
    #[display("Source Parse Error: {_0}")]
    SourceParse(String),

    /// The mutated model could not be turned back into valid source.
    #[from(ignore)]
    #[display("Output Serialize Error: {_0}")]
    OutputSerialize(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_conversion() {
        let bytes = [0x66, 0xff, 0x6f];
        let err: AppError = std::str::from_utf8(&bytes).unwrap_err().into();
        assert!(matches!(err, AppError::Utf8(_)));
        assert!(err.to_string().starts_with("Source Parse Error"));
    }

    #[test]
    fn test_display_variants() {
        let err = AppError::SourceParse("syntax error at line 3, column 1".into());
        assert_eq!(
            err.to_string(),
            "Source Parse Error: syntax error at line 3, column 1"
        );

        let err = AppError::OutputSerialize("overlapping edits".into());
        assert_eq!(err.to_string(), "Output Serialize Error: overlapping edits");
    }
}
