use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;

/// Which side of the conversation the local user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Business,
    Freelancer,
}

impl Role {
    /// Path segment used by every role-scoped endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            Role::Business => "business",
            Role::Freelancer => "freelancer",
        }
    }

    pub fn counterpart(&self) -> Role {
        match self {
            Role::Business => Role::Freelancer,
            Role::Freelancer => Role::Business,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for Role {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Role::Business),
            "freelancer" => Ok(Role::Freelancer),
            other => Err(ChatError::Config(format!("unknown role: {other}"))),
        }
    }
}

/// Identifies one conversation: the local role plus the other participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationKey {
    pub role: Role,
    pub counterpart_id: String,
}

impl ConversationKey {
    pub fn new(role: Role, counterpart_id: impl Into<String>) -> Self {
        Self {
            role,
            counterpart_id: counterpart_id.into(),
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.counterpart_id)
    }
}
