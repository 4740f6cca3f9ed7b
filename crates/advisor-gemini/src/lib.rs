//! Remote job client for the Gemini API.
//!
//! This crate defines the [`RemoteJobClient`] contract used by the review
//! orchestrator (submit an asset, poll its status, run inference, delete it)
//! and a [`GeminiClient`] implementation over the Gemini REST endpoints.
//! Any service with the same four operations can stand in for it.

pub mod client;
pub mod config;
pub mod error;
pub mod remote;
pub mod types;

pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use error::{ClientError, ClientResult};
pub use remote::RemoteJobClient;
