//! Core trait and types for reply generation.
//!
//! This crate provides the shared interface between the followup engine and
//! whatever produces assistant replies. It defines:
//!
//! - [`Brain`] - The trait that all brain implementations must implement
//! - [`ChatTurn`] / [`Role`] - The ordered role/content turns a brain consumes
//! - [`ContextWindow`] - How much of a transcript is sent
//! - [`BrainError`] - Error types for brain operations
//!
//! # Example
//!
//! ```rust
//! use brain_core::{Brain, BrainError, ChatTurn};
//! use async_trait::async_trait;
//!
//! struct PoliteBrain;
//!
//! #[async_trait]
//! impl Brain for PoliteBrain {
//!     async fn generate(&self, _turns: Vec<ChatTurn>) -> Result<String, BrainError> {
//!         Ok("Thank you!".to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "PoliteBrain"
//!     }
//! }
//! ```

mod error;
mod trait_def;
mod turn;
mod window;

pub use error::BrainError;
pub use trait_def::Brain;
pub use turn::{ChatTurn, Role};
pub use window::ContextWindow;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
