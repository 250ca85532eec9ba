// Cover letters: prompt assembly, the generation pipeline, and stored-letter management.
// All generation goes through llm_client::TextGenerator; ranking through ranking::rank.

pub mod assembly;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod repository;
