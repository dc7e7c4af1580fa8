use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an argument handed to a model operation was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgumentIssue {
    /// The value is absent, e.g. a handle that does not name a live element
    Missing,
    /// The value is present but empty, e.g. no children or an empty name
    Empty,
}

impl fmt::Display for ArgumentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentIssue::Missing => write!(f, "value is missing"),
            ArgumentIssue::Empty => write!(f, "value is empty"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid argument `{argument}`: {issue}")]
    InvalidArgument {
        argument: &'static str,
        issue: ArgumentIssue,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),
}

impl CoreError {
    pub fn missing(argument: &'static str) -> Self {
        CoreError::InvalidArgument {
            argument,
            issue: ArgumentIssue::Missing,
        }
    }

    pub fn empty(argument: &'static str) -> Self {
        CoreError::InvalidArgument {
            argument,
            issue: ArgumentIssue::Empty,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CoreError::InvalidArgument { .. })
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, CoreError::InvalidOperation(_))
    }

    /// The argument issue, when this is an `InvalidArgument` error
    pub fn argument_issue(&self) -> Option<ArgumentIssue> {
        match self {
            CoreError::InvalidArgument { issue, .. } => Some(*issue),
            _ => None,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
