pub mod analyzer;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod text;
pub mod transcribe;
pub mod web;
