//! AI Integration Layer
//!
//! Provider clients, credential resolution and helpers for reading
//! structured answers out of model responses.

pub mod credentials;
pub mod json;
pub mod provider;
pub mod timeout;

pub use credentials::{CredentialSource, Credentials};
pub use json::extract_json_from_response;
pub use provider::{
    Completion, CompletionRequest, CompletionService, HttpCompletionService, ProviderKind,
    ResponseMetadata, ResponseTiming, SharedCompletionService, TokenUsage,
};
pub use timeout::with_timeout;
