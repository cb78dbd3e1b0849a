pub mod assistant;
pub mod bridge;
pub mod config;
pub mod detection;
pub mod error;
pub mod input;
pub mod llm;
pub mod prompt;
pub mod server;

pub use error::{Error, Result};
