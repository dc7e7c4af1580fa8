use codedom_core::CoreError;
use thiserror::Error;

use crate::config::GenerationLanguage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefinerError {
    #[error("{language} refiner pass `{pass}` failed: {source}")]
    PassFailed {
        language: GenerationLanguage,
        pass: &'static str,
        source: CoreError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl RefinerError {
    /// The model error behind this failure, if any
    pub fn core_error(&self) -> Option<&CoreError> {
        match self {
            RefinerError::PassFailed { source, .. } => Some(source),
            RefinerError::Core(error) => Some(error),
            RefinerError::Config(_) => None,
        }
    }
}

pub type RefinerResult<T> = Result<T, RefinerError>;
