// Question generation: sanitize → detect language → prompt → model call →
// validate. All model calls go through llm_client; demo mode never touches it.

pub mod backend;
pub mod demo;
pub mod generator;
pub mod handlers;
pub mod language;
pub mod prompts;
pub mod sanitize;
pub mod schema;
