use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opening delimiter of an encoded mention
pub const TOKEN_PREFIX: &str = "@[";
/// Closing delimiter of an encoded mention
pub const TOKEN_SUFFIX: char = ']';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MentionError {
    #[error("lead name must not be empty")]
    EmptyName,

    #[error("lead name contains forbidden character {0:?}")]
    ForbiddenCharacter(char),

    #[error("not a mention token: {0}")]
    Malformed(String),
}

/// Reference to a lead embedded in a chat body.
///
/// Names are validated on construction so that `parse(token.to_string())`
/// always yields the same id and name back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawMentionToken")]
pub struct MentionToken {
    lead_id: u64,
    lead_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMentionToken {
    lead_id: u64,
    lead_name: String,
}

impl TryFrom<RawMentionToken> for MentionToken {
    type Error = MentionError;

    fn try_from(raw: RawMentionToken) -> Result<Self, Self::Error> {
        MentionToken::new(raw.lead_id, raw.lead_name)
    }
}

impl MentionToken {
    /// Build a token, rejecting names the grammar cannot carry.
    pub fn new(lead_id: u64, lead_name: impl Into<String>) -> Result<Self, MentionError> {
        let lead_name = lead_name.into();
        if lead_name.is_empty() {
            return Err(MentionError::EmptyName);
        }
        if let Some(ch) = lead_name.chars().find(|c| is_forbidden(*c)) {
            return Err(MentionError::ForbiddenCharacter(ch));
        }
        Ok(Self { lead_id, lead_name })
    }

    /// Build a token from an arbitrary display name.
    ///
    /// `]` becomes `)` and line breaks become spaces; a name that ends up
    /// blank falls back to `Lead <id>`.
    pub fn sanitized(lead_id: u64, lead_name: &str) -> Self {
        let cleaned: String = lead_name
            .chars()
            .map(|c| match c {
                ']' => ')',
                '\n' | '\r' => ' ',
                other => other,
            })
            .collect();
        let lead_name = if cleaned.trim().is_empty() {
            format!("Lead {lead_id}")
        } else {
            cleaned
        };
        Self { lead_id, lead_name }
    }

    pub fn lead_id(&self) -> u64 {
        self.lead_id
    }

    pub fn lead_name(&self) -> &str {
        &self.lead_name
    }

    /// Canonical wire encoding, `@[id:name]`.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

fn is_forbidden(c: char) -> bool {
    c == TOKEN_SUFFIX || c == '\n'
}

impl fmt::Display for MentionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            TOKEN_PREFIX, self.lead_id, self.lead_name, TOKEN_SUFFIX
        )
    }
}

impl FromStr for MentionToken {
    type Err = MentionError;

    /// Parse a string that must consist of exactly one token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::parser::match_token(s) {
            Some((lead_id, lead_name, raw)) if raw.len() == s.len() => {
                Ok(Self {
                    lead_id,
                    lead_name: lead_name.to_string(),
                })
            }
            _ => Err(MentionError::Malformed(s.to_string())),
        }
    }
}
