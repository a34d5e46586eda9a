//! Showdown LLM Agent - LLM-picked moves with a heuristic safety net

pub mod battle;
pub mod core;
pub mod llm;
