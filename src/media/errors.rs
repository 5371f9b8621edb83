// Failures that are reported to the user instead of propagated

use std::fmt;

/// Input rejected locally; no external tool was launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// "Last N episodes" needs a non-negative whole number
    InvalidEpisodeCount(String),

    /// Specific-episode downloads need a non-empty range
    EmptyEpisodeRange,

    /// Video download was requested without a chosen format
    MissingFormat,

    /// Batch file path was not given or does not exist
    MissingBatchFile(String),

    /// Batch file had no usable lines
    EmptyBatchFile(String),
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEpisodeCount(count) => {
                write!(f, "Invalid number specified: '{}'", count)
            }
            Self::EmptyEpisodeRange => write!(f, "No episodes specified"),
            Self::MissingFormat => write!(f, "No video format selected"),
            Self::MissingBatchFile(path) if path.is_empty() => write!(f, "No link file given"),
            Self::MissingBatchFile(path) => write!(f, "File not found: {}", path),
            Self::EmptyBatchFile(path) => write!(f, "No valid links found in file: {}", path),
        }
    }
}

impl std::error::Error for ValidationFailure {}

/// A metadata query that could not produce usable information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataFailure {
    /// The query tool could not be started at all
    Spawn { command: String, reason: String },

    /// The query tool ran but exited non-zero
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The query tool's stdout was not the expected JSON
    Unparsable { command: String, reason: String },
}

impl MetadataFailure {
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. }
            | Self::NonZeroExit { command, .. }
            | Self::Unparsable { command, .. } => command,
        }
    }
}

impl fmt::Display for MetadataFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { reason, .. } => {
                write!(f, "Could not retrieve information for the URL: {}", reason)
            }
            Self::NonZeroExit { .. } => write!(f, "Could not retrieve information for the URL."),
            Self::Unparsable { .. } => write!(f, "Could not parse video information."),
        }
    }
}

impl std::error::Error for MetadataFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationFailure::InvalidEpisodeCount("abc".into()).to_string(),
            "Invalid number specified: 'abc'"
        );
        assert_eq!(
            ValidationFailure::MissingBatchFile(String::new()).to_string(),
            "No link file given"
        );
        assert_eq!(
            ValidationFailure::MissingBatchFile("links.txt".into()).to_string(),
            "File not found: links.txt"
        );
    }

    #[test]
    fn test_metadata_failure_command() {
        let failure = MetadataFailure::NonZeroExit {
            command: "yt-dlp -J x".into(),
            code: Some(1),
            stderr: "ERROR".into(),
        };
        assert_eq!(failure.command(), "yt-dlp -J x");
        assert_eq!(
            failure.to_string(),
            "Could not retrieve information for the URL."
        );
    }
}
