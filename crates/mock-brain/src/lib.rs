//! Mock brain implementations for AutoFollow.
//!
//! This crate provides mock implementations of the `Brain` trait for tests
//! and local runs without a model key:
//! - `EchoBrain` - Echoes the latest client message
//! - `ScriptedBrain` - Replays queued replies and records what it was sent
//! - `DelayedBrain` - Wraps another brain with artificial delay
//!
//! For production replies, use the `anthropic-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, ChatTurn, EchoBrain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = EchoBrain::new();
//!
//!     let reply = brain
//!         .generate(vec![ChatTurn::system("prompt"), ChatTurn::user("Hello!")])
//!         .await?;
//!     println!("Reply: {}", reply);
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod scripted;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, ChatTurn, Role};

pub use delayed::DelayedBrain;
pub use echo::EchoBrain;
pub use scripted::ScriptedBrain;
