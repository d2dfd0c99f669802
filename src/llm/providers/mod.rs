//! LLM provider implementations.

pub mod dummy;
pub mod gemini;
