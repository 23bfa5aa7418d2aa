use std::fmt;

/// The three fatal error classes of the engine. None of them is locally
/// recoverable: any of them aborts the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupertreeError {
    /// Malformed Newick/NEXUS input.
    ParseError {
        message: String,
        line: usize,
        column: usize,
        snippet: String,
    },
    /// Malformed command-line usage.
    UsageError { flag: String, usage: String },
    /// A precondition inside the algorithm failed on input that should
    /// never produce this (empty component, cluster disagreement,
    /// min-cut requested on an empty graph).
    InvariantViolation {
        level: usize,
        component_count: usize,
        message: String,
    },
}

impl fmt::Display for SupertreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupertreeError::ParseError {
                message,
                line,
                column,
                snippet,
            } => write!(
                f,
                "parse error at line {}, column {}: {}\n    {}",
                line, column, message, snippet
            ),
            SupertreeError::UsageError { flag, usage } => {
                write!(f, "usage error for '{}': {}", flag, usage)
            }
            SupertreeError::InvariantViolation {
                level,
                component_count,
                message,
            } => write!(
                f,
                "invariant violation at recursion level {} ({} component(s)): {}",
                level, component_count, message
            ),
        }
    }
}

impl std::error::Error for SupertreeError {}

impl SupertreeError {
    pub fn invariant(level: usize, component_count: usize, message: impl Into<String>) -> Self {
        SupertreeError::InvariantViolation {
            level,
            component_count,
            message: message.into(),
        }
    }

    pub fn usage(flag: impl Into<String>, usage: impl Into<String>) -> Self {
        SupertreeError::UsageError {
            flag: flag.into(),
            usage: usage.into(),
        }
    }
}
