//! Followup lifecycle and conversation engine for AutoFollow.
//!
//! This crate ties the store, the reply brain, the relay bridge and the
//! realtime notifier together:
//!
//! - Followup state machine (`create_followup`, `start`, `restart`,
//!   `complete`)
//! - Conversation orchestration (`generate_next_message`)
//! - Inbound relay processing (`handle_relay_payload`, `handle_inbound`)
//! - WhatsApp session events per company
//! - Playground chats against an agent (`playground_reply`)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use database::Database;
//! use followup_engine::{EngineConfig, FollowupEngine, LoggingNotifier};
//! use mock_brain::EchoBrain;
//! use relay_bridge::{MemoryBus, Relay};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::in_memory().await?;
//! let engine = FollowupEngine::new(
//!     db,
//!     Arc::new(EchoBrain::new()),
//!     Relay::new(Arc::new(MemoryBus::new())),
//!     Arc::new(LoggingNotifier),
//!     EngineConfig::default(),
//! );
//!
//! engine.start("followup-id").await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod conversation;
mod engine;
mod error;
mod inbound;
mod lifecycle;
mod locks;
mod notifier;
mod prompt;
mod session;

pub use config::{EngineConfig, DEFAULT_REPLY_TIMEOUT};
pub use engine::FollowupEngine;
pub use error::{EngineError, Result};
pub use inbound::InboundOutcome;
pub use lifecycle::CreateFollowup;
pub use locks::{KeyedGuard, KeyedLocks};
pub use notifier::{
    LoggingNotifier, Notifier, RealtimeEvent, RecordingNotifier, Topic,
    TRANSCRIPT_EVENT,
};
pub use prompt::{greeting, render_playground_prompt, render_system_prompt};
pub use session::SessionStatus;
