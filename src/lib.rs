// Public API for integration tests and potential library usage

pub mod api;
pub mod config;
pub mod history;
pub mod llm;
pub mod protocol;
pub mod roles;
pub mod state;
pub mod types;
pub mod words;
pub mod ws;
