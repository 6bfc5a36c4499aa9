mod gateway;
mod openai;
mod provider;

pub use gateway::EmbeddingGateway;
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
