pub mod chat;
pub mod error;

pub use error::LlmError;
