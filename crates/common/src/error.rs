//! Error types shared across StoryReel crates.

use std::path::PathBuf;

/// Top-level error type for StoryReel operations.
#[derive(Debug, thiserror::Error)]
pub enum StoryreelError {
    /// An out-of-range or malformed parameter, rejected before any subprocess spawns.
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Tool unavailable: {tool}: {message}")]
    ToolUnavailable { tool: String, message: String },

    /// The external binary exited with a non-zero status.
    #[error("Subprocess error: {message}: {diagnostics}")]
    Subprocess { message: String, diagnostics: String },

    /// The external binary exceeded its time budget and was killed.
    #[error("Subprocess timed out after {secs}s: {operation}")]
    Timeout { operation: String, secs: u64 },

    #[error("Unknown backend '{id}', available: [{}]", available.join(", "))]
    UnknownBackend { id: String, available: Vec<String> },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StoryreelError.
pub type StoryreelResult<T> = Result<T, StoryreelError>;

/// Coarse classification surfaced to callers alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    ToolUnavailable,
    Subprocess,
    UnknownBackend,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::ToolUnavailable => "tool_unavailable",
            ErrorKind::Subprocess => "subprocess",
            ErrorKind::UnknownBackend => "unknown_backend",
            ErrorKind::Internal => "internal",
        }
    }
}

impl StoryreelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn tool_unavailable(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    pub fn subprocess(msg: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Self::Subprocess {
            message: msg.into(),
            diagnostics: diagnostics.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            secs,
        }
    }

    pub fn unknown_backend(id: impl Into<String>, mut available: Vec<String>) -> Self {
        available.sort();
        Self::UnknownBackend {
            id: id.into(),
            available,
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Which of the caller-facing failure classes this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::ToolUnavailable { .. } => ErrorKind::ToolUnavailable,
            Self::Subprocess { .. } | Self::Timeout { .. } => ErrorKind::Subprocess,
            Self::UnknownBackend { .. } => ErrorKind::UnknownBackend,
            _ => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_backend_lists_sorted_ids() {
        let err = StoryreelError::unknown_backend(
            "gpu",
            vec!["ffmpeg".to_string(), "composition".to_string()],
        );
        assert_eq!(
            err.to_string(),
            "Unknown backend 'gpu', available: [composition, ffmpeg]"
        );
        assert_eq!(err.kind(), ErrorKind::UnknownBackend);
    }

    #[test]
    fn test_timeout_is_a_subprocess_failure() {
        let err = StoryreelError::timeout("assemble project", 600);
        assert_eq!(err.kind(), ErrorKind::Subprocess);
        assert!(err.to_string().contains("600s"));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            StoryreelError::validation("width out of range").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            StoryreelError::tool_unavailable("ffmpeg", "not on PATH").kind(),
            ErrorKind::ToolUnavailable
        );
        assert_eq!(
            StoryreelError::subprocess("ffmpeg failed", "boom").kind(),
            ErrorKind::Subprocess
        );
        assert_eq!(StoryreelError::render("x").kind(), ErrorKind::Internal);
        assert_eq!(ErrorKind::ToolUnavailable.as_str(), "tool_unavailable");
    }
}
