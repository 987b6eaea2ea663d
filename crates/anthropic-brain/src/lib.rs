//! Anthropic-backed brain implementation.
//!
//! This crate provides a [`Brain`] that sends a followup transcript to the
//! Anthropic Messages API and returns the generated reply.
//!
//! # Features
//!
//! - Stateless: every call carries the full (windowed) transcript
//! - System turns are lifted into the request's `system` field
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use anthropic_brain::{AnthropicBrain, Brain, ChatTurn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = AnthropicBrain::from_env()?;
//!     let reply = brain
//!         .generate(vec![ChatTurn::system("You confirm shifts."), ChatTurn::user("hi")])
//!         .await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::AnthropicBrain;
pub use config::AnthropicBrainConfig;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, ChatTurn, Role};
