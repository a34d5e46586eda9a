pub mod client;
pub mod parser;

pub use client::LlmClient;
pub use parser::extract_json;
