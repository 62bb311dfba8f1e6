//! Client core for the business/freelancer lead chat
//!
//! - [`composer`]: `@` mention composer and lead picker
//! - [`websocket`]: live chat session over a WebSocket with bounded reconnect
//! - [`services`]: REST history and shared-lead lookup
//!
//! The `@[leadId:leadName]` wire format itself lives in `mention-protocol`.

pub mod composer;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod websocket;

pub use error::{ChatError, ChatResult};
