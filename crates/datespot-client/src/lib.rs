//! Datespot Client - HTTP clients for external APIs
//!
//! This crate provides HTTP clients for interacting with:
//!
//! - [`openai`] - OpenAI chat completions API
//!
//! # Overview
//!
//! The clients handle authentication, request building, response parsing,
//! and error handling for their respective APIs.

pub mod openai;

// Re-export main client types
pub use openai::OpenAIClient;
