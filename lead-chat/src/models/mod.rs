pub mod conversation;
pub mod lead;
pub mod message;

pub use conversation::{ConversationKey, Role};
pub use lead::{CandidateLead, LeadStatus};
pub use message::{ChatMessage, MessageId, SenderType};
