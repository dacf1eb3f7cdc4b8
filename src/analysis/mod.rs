//! Written spending analysis generated by a language model.
//!
//! The user's transactions are embedded in a prompt and sent to a
//! [TextGenerator]. The production generator, [ChatCompletionsClient], talks
//! to an OpenAI compatible chat completions API.

mod endpoint;
mod generator;
mod prompt;

pub use endpoint::{AnalysisState, get_analysis_endpoint};
pub use generator::{
    AnalysisConfig, ChatCompletionsClient, DEFAULT_ANALYSIS_MODEL, DEFAULT_ANALYSIS_URL,
    TextGenerator,
};
pub use prompt::{SYSTEM_INSTRUCTION, build_prompt};
