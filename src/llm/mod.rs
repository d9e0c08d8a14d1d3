// LLM abstraction layer

pub mod anthropic;
pub mod prompts;
pub mod provider;

pub use provider::*;
