//! Error and warning types for table extraction.
//!
//! Provides [`ExtractError`] for fatal errors that stop processing of a page
//! or document, and [`ExtractWarning`] for non-fatal issues where extraction
//! continues best-effort.

use std::fmt;

/// Fatal error types for content stream processing.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Error parsing the surrounding PDF document structure.
    ParseError(String),
    /// I/O error reading input data.
    IoError(String),
    /// The content stream is malformed: an unterminated literal string,
    /// hex string, or array was encountered by the lexer.
    MalformedStream(String),
    /// A caller-supplied resource limit was exceeded.
    LimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_tokens").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::ParseError(msg) => write!(f, "parse error: {msg}"),
            ExtractError::IoError(msg) => write!(f, "I/O error: {msg}"),
            ExtractError::MalformedStream(msg) => write!(f, "malformed content stream: {msg}"),
            ExtractError::LimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
            ),
            ExtractError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::IoError(err.to_string())
    }
}

/// Machine-readable warning code for categorizing extraction issues.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    /// A state operator received fewer arguments than its arity requires.
    InvalidOperand,
    /// A font resource name could not be resolved to width metrics;
    /// the approximate metric was used instead.
    MissingFont,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl ExtractWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            ExtractWarningCode::InvalidOperand => "INVALID_OPERAND",
            ExtractWarningCode::MissingFont => "MISSING_FONT",
            ExtractWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal warning encountered during extraction.
///
/// Warnings allow best-effort continuation: a skipped operator or a missing
/// font never aborts a page. They carry a structured code, a human-readable
/// description, and optional source context.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    /// Machine-readable warning code.
    pub code: ExtractWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Page number where the warning occurred (1-based), if applicable.
    pub page: Option<usize>,
    /// Index of the operator in the content stream, if applicable.
    pub operator_index: Option<usize>,
}

impl ExtractWarning {
    /// Create a warning with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        let desc = description.into();
        Self {
            code: ExtractWarningCode::Other(desc.clone()),
            description: desc,
            page: None,
            operator_index: None,
        }
    }

    /// Create a warning with a specific code and description.
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            operator_index: None,
        }
    }

    /// Attach the operator index, returning the modified warning.
    pub fn at_operator(mut self, index: usize) -> Self {
        self.operator_index = Some(index);
        self
    }

    /// Attach the page number, returning the modified warning.
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        if let Some(index) = self.operator_index {
            write!(f, " [operator #{index}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- ExtractError ---

    #[test]
    fn malformed_stream_display() {
        let err = ExtractError::MalformedStream("unterminated literal string".to_string());
        assert_eq!(
            err.to_string(),
            "malformed content stream: unterminated literal string"
        );
    }

    #[test]
    fn limit_exceeded_display() {
        let err = ExtractError::LimitExceeded {
            limit_name: "max_tokens".to_string(),
            limit_value: 1000,
            actual_value: 1001,
        };
        assert_eq!(
            err.to_string(),
            "limit exceeded: max_tokens (limit: 1000, actual: 1001)"
        );
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: ExtractError = io_err.into();
        assert!(matches!(err, ExtractError::IoError(_)));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn error_implements_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(ExtractError::ParseError("bad xref".to_string()));
        assert!(err.to_string().contains("bad xref"));
    }

    // --- ExtractWarning ---

    #[test]
    fn warning_code_tags() {
        assert_eq!(ExtractWarningCode::InvalidOperand.as_str(), "INVALID_OPERAND");
        assert_eq!(ExtractWarningCode::MissingFont.as_str(), "MISSING_FONT");
        assert_eq!(
            ExtractWarningCode::Other("custom".to_string()).as_str(),
            "OTHER"
        );
    }

    #[test]
    fn warning_display_with_context() {
        let w = ExtractWarning::with_code(ExtractWarningCode::InvalidOperand, "Tf with 1 operand")
            .at_operator(7)
            .on_page(3);
        let s = w.to_string();
        assert!(s.contains("INVALID_OPERAND"));
        assert!(s.contains("Tf with 1 operand"));
        assert!(s.contains("(page 3)"));
        assert!(s.contains("[operator #7]"));
    }

    #[test]
    fn warning_new_uses_other_code() {
        let w = ExtractWarning::new("something odd");
        assert!(matches!(w.code, ExtractWarningCode::Other(_)));
        assert!(w.page.is_none());
        assert!(w.operator_index.is_none());
    }
}
