// Candidate screening: skill map, prompt contracts, reply interpretation and
// the sequential batch pipeline. All model calls go through llm_client.

pub mod handlers;
pub mod interpreter;
pub mod pipeline;
pub mod prompts;
pub mod skills;
