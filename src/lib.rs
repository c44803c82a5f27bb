//! A provider-agnostic gateway for chat-style prompts.
//!
//! This library sends an ordered conversation to OpenAI-compatible,
//! Anthropic-compatible or offline mock backends, returning either a
//! normalized [`ModelResponse`] or a stream of text fragments.

pub mod error;
pub mod gateway;
pub mod line_stream;
pub mod provider;
pub mod providers;
pub mod response;
pub mod router;
pub mod streaming;
pub mod transport;
pub mod types;

// Re-export core types for easy usage
pub use error::{Error, TransportError};
pub use gateway::Gateway;
pub use provider::ModelProvider;
pub use providers::*;
pub use response::ModelResponse;
pub use router::ModelRouter;
pub use streaming::FragmentStream;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::*;
