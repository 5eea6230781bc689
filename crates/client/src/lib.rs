//! HTTP clients for tastemaker.
//!
//! This crate provides the Tavily search/crawl client and an
//! OpenAI-compatible chat client, implementing the collaborator traits the
//! core pipeline is written against.

pub mod openai;
pub mod tavily;

pub use openai::{OpenAiClient, OpenAiConfig, OpenAiError};
pub use tavily::{TavilyClient, TavilyConfig, TavilyError};
