//! Provider implementations for different LLM services.

pub mod anthropic;
pub mod mock;
pub mod openai;
pub(crate) mod shared;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use openai::OpenAIProvider;
