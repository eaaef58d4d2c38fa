//! Oracle transports.

pub mod openai;

pub use openai::OpenAiOracle;
