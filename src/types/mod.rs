//! Shared crate-wide types

pub mod error;

pub use error::{
    ErrorCategory, ErrorClassifier, LlmError, PromptError, Result, ResultExt, ValidationError,
    ValidationErrorKind,
};
