//! Unified Error Type System
//!
//! Centralized error types for the whole crate.
//! Provider failures are classified so callers can tell a user-actionable
//! problem (missing key, bad request) from an upstream outage.
//!
//! ## Error Categories
//!
//! - **RateLimit**: API rate limiting
//! - **TokenLimit**: Context too large for the model
//! - **Auth**: Rejected or missing API key
//! - **Network**: Connectivity issues
//! - **Unavailable**: Provider unavailable
//! - **ParseError**: Response was not the structured data we asked for

use std::time::Duration;
use thiserror::Error;

use crate::ai::provider::ProviderKind;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Parsing the LLM response failed
    ParseError,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Whether the user can fix this by changing settings (keys, model, inputs)
    pub fn is_user_actionable(&self) -> bool {
        matches!(self, Self::Auth | Self::BadRequest | Self::TokenLimit)
    }

    /// What to change before retrying, for user-actionable categories
    pub fn hint(&self) -> Option<&'static str> {
        if !self.is_user_actionable() {
            return None;
        }
        Some(match self {
            Self::Auth => {
                "Set the provider's API key (e.g. GROQ_API_KEY) or enable credentials.use_custom_keys in the config"
            }
            Self::TokenLimit => "Lower max_tokens or shorten the context",
            _ => "Check the model name and sampling parameters",
        })
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Provider error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<ProviderKind>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: ProviderKind,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider failures onto an [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: ProviderKind) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("context too long")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("auth")
            || lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("invalid key")
            || lower.contains("unauthorized")
            || lower.contains("permission denied")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("503")
            || lower.contains("502")
            || lower.contains("service unavailable")
            || lower.contains("server error")
            || lower.contains("500")
            || lower.contains("internal error")
            || lower.contains("not found")
        {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        if lower.contains("400")
            || lower.contains("bad request")
            || lower.contains("invalid")
            || lower.contains("malformed")
        {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        if lower.contains("parse")
            || lower.contains("json")
            || lower.contains("syntax")
            || lower.contains("unexpected token")
        {
            return LlmError::with_provider(ErrorCategory::ParseError, message, provider);
        }

        if lower.contains("retry") || lower.contains("temporary") || lower.contains("overloaded")
        {
            return LlmError::with_provider(ErrorCategory::Transient, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: ProviderKind) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 422 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            413 => LlmError::with_provider(ErrorCategory::TokenLimit, message, provider),
            500 | 502 | 503 | 504 | 529 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Structured validation error with context
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// What validation failed
    pub kind: ValidationErrorKind,
    /// Field or component that failed validation
    pub field: Option<String>,
    /// Detailed message
    pub message: String,
    /// Expected value or format
    pub expected: Option<String>,
    /// Actual value received
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "Validation failed for '{}': {}", field, self.message)
        } else {
            write!(f, "Validation failed: {}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Add field context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add expected/actual values
    pub fn with_comparison(
        mut self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Shorthand for an out-of-range numeric field
    pub fn range(field: &str, expected: &str, actual: impl std::fmt::Display) -> Self {
        Self::new(
            ValidationErrorKind::Range,
            format!("must be {}, got {}", expected, actual),
        )
        .with_field(field)
        .with_comparison(expected, actual.to_string())
    }
}

/// Validation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Required field missing or empty
    MissingField,
    /// Invalid format
    Format,
    /// Value out of range
    Range,
    /// Collection capacity exceeded
    Capacity,
    /// Consistency check failed
    Consistency,
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PromptError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // LLM Errors
    // -------------------------------------------------------------------------
    /// Structured provider error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Transport-level failure talking to a provider
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// The credential a provider needs is absent
    #[error(
        "{} API key is required for {operation}. Add it to your credentials settings.",
        .provider.display_name()
    )]
    MissingCredential {
        provider: ProviderKind,
        operation: String,
    },

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Validation(ValidationError),

    #[error("Unknown {kind} '{id}'")]
    NotFound { kind: String, id: String },

    /// A chain step failed; `completed` holds the outputs produced before it
    #[error("Chain aborted at step {step} ({step_name}): {source}")]
    ChainAborted {
        step: usize,
        step_name: String,
        completed: Vec<String>,
        source: Box<PromptError>,
    },

    #[error("Another generation is already in progress")]
    Busy,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<LlmError> for PromptError {
    fn from(err: LlmError) -> Self {
        PromptError::Llm(err)
    }
}

impl From<ValidationError> for PromptError {
    fn from(err: ValidationError) -> Self {
        PromptError::Validation(err)
    }
}

pub type Result<T> = std::result::Result<T, PromptError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl PromptError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a not-found error for a catalog dimension or stored record
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a missing-credential error
    pub fn missing_credential(provider: ProviderKind, operation: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider,
            operation: operation.into(),
        }
    }

    /// Error category, when this error came from a provider
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Llm(e) => Some(e.category),
            Self::MissingCredential { .. } => Some(ErrorCategory::Auth),
            Self::Timeout { .. } => Some(ErrorCategory::Network),
            Self::ChainAborted { source, .. } => source.category(),
            _ => None,
        }
    }

    /// Validation failures are raised before any external call is made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::MissingCredential { .. } | Self::NotFound { .. }
        )
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| PromptError::Storage(format!("{}: {}", context.into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================
